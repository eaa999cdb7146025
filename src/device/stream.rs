//! Ordered, asynchronous execution stream
//!
//! Work queued on a stream runs on a dedicated worker thread in submission
//! order. The submitting thread never waits for a kernel to finish; failures
//! inside a kernel are recorded and reported by the next `synchronize`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::error::{Result, SparseError};

/// Grid geometry of a kernel launch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Number of blocks
    pub grid_dim: usize,
    /// Threads per block
    pub block_dim: usize,
}

impl LaunchConfig {
    pub fn new(grid_dim: usize, block_dim: usize) -> Self {
        Self {
            grid_dim,
            block_dim,
        }
    }

    /// One thread per item, items split into blocks of `block_dim` threads
    pub fn for_items(items: usize, block_dim: usize) -> Self {
        Self::new(items.div_ceil(block_dim.max(1)), block_dim)
    }

    pub fn total_threads(&self) -> usize {
        self.grid_dim * self.block_dim
    }
}

type Job = Box<dyn FnOnce() + Send + 'static>;

enum Command {
    Launch { kernel: &'static str, job: Job },
    Barrier(mpsc::Sender<()>),
}

/// A single in-order queue of device work
pub struct Stream {
    sender: Option<mpsc::Sender<Command>>,
    worker: Option<thread::JoinHandle<()>>,
    fault: Arc<Mutex<Option<SparseError>>>,
}

impl Stream {
    pub(crate) fn new() -> Result<Self> {
        let (sender, receiver) = mpsc::channel();
        let fault = Arc::new(Mutex::new(None));
        let worker_fault = Arc::clone(&fault);

        let worker = thread::Builder::new()
            .name("hybmv-stream".to_string())
            .spawn(move || run_stream(receiver, worker_fault))
            .map_err(|e| SparseError::Internal(format!("failed to start stream worker: {}", e)))?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            fault,
        })
    }

    /// Queues a job behind all previously queued work
    pub(crate) fn enqueue<F>(&self, kernel: &'static str, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.send(Command::Launch {
            kernel,
            job: Box::new(job),
        })
    }

    /// Blocks until all queued work has run, then reports the first fault
    /// recorded since the previous synchronization
    pub fn synchronize(&self) -> Result<()> {
        let (done, wait) = mpsc::channel();
        self.send(Command::Barrier(done))?;
        wait.recv()
            .map_err(|_| SparseError::Internal("stream worker terminated".to_string()))?;

        match self.fault.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn send(&self, command: Command) -> Result<()> {
        self.sender
            .as_ref()
            .ok_or_else(|| SparseError::Internal("stream is shut down".to_string()))?
            .send(command)
            .map_err(|_| SparseError::Internal("stream worker terminated".to_string()))
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain the queue and exit.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_stream(receiver: mpsc::Receiver<Command>, fault: Arc<Mutex<Option<SparseError>>>) {
    for command in receiver {
        match command {
            Command::Launch { kernel, job } => {
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                    let message = panic_message(payload.as_ref());
                    tracing::warn!(kernel, %message, "kernel fault recorded on stream");
                    let mut slot = fault.lock();
                    if slot.is_none() {
                        *slot = Some(SparseError::KernelFault { kernel, message });
                    }
                }
            }
            Command::Barrier(done) => {
                let _ = done.send(());
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown device fault".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_for_items() {
        assert_eq!(LaunchConfig::for_items(0, 512).grid_dim, 0);
        assert_eq!(LaunchConfig::for_items(1, 512).grid_dim, 1);
        assert_eq!(LaunchConfig::for_items(512, 512).grid_dim, 1);
        assert_eq!(LaunchConfig::for_items(513, 512).grid_dim, 2);
        assert_eq!(LaunchConfig::new(3, 128).total_threads(), 384);
    }

    #[test]
    fn test_jobs_run_in_order() {
        let stream = Stream::new().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..16 {
            let log = Arc::clone(&log);
            stream.enqueue("push", move || log.lock().push(i)).unwrap();
        }
        stream.synchronize().unwrap();
        assert_eq!(*log.lock(), (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_fault_surfaces_on_synchronize() {
        let stream = Stream::new().unwrap();
        let ran = Arc::new(AtomicUsize::new(0));

        stream.enqueue("faulty", || panic!("bad address")).unwrap();
        let counter = Arc::clone(&ran);
        stream
            .enqueue("after", move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        match stream.synchronize() {
            Err(SparseError::KernelFault { kernel, message }) => {
                assert_eq!(kernel, "faulty");
                assert!(message.contains("bad address"));
            }
            other => panic!("expected kernel fault, got {:?}", other),
        }
        assert_eq!(ran.load(Ordering::SeqCst), 1);

        // The fault is reported once.
        assert!(stream.synchronize().is_ok());
    }
}
