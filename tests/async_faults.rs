//! Faults raised by queued kernels surface at synchronization

use hybmv::{hybmv, DeviceBuffer, Handle, HybMatrix, MatDescr, Operation, ScalarArg, SparseError};

fn call(handle: &Handle, a: &HybMatrix<f64>, x: &DeviceBuffer<f64>, y: &DeviceBuffer<f64>) {
    hybmv(
        Some(handle),
        Operation::NoTranspose,
        Some(&ScalarArg::Host(1.0)),
        Some(&MatDescr::new()),
        Some(a),
        Some(x),
        Some(&ScalarArg::Host(0.0)),
        Some(y),
    )
    .unwrap();
}

#[test]
fn test_out_of_range_coo_column_faults_on_synchronize() {
    let handle = Handle::new().unwrap();
    // Column 9 is outside x; the call itself is accepted.
    let a = HybMatrix::new(2, 2).with_coo(&[0, 1], &[0, 9], &[1.0, 1.0]);
    let x = DeviceBuffer::filled(2, 1.0);
    let y = DeviceBuffer::filled(2, 0.0);

    call(&handle, &a, &x, &y);

    match handle.synchronize() {
        Err(SparseError::KernelFault { kernel, message }) => {
            assert_eq!(kernel, "coomvn_warp_reduce");
            assert!(message.contains("out of bounds"), "{}", message);
        }
        other => panic!("expected kernel fault, got {:?}", other),
    }

    // The fault is reported once and the stream keeps working
    assert!(handle.synchronize().is_ok());
    let good = HybMatrix::new(2, 2).with_coo(&[0, 1], &[0, 1], &[2.0, 3.0]);
    call(&handle, &good, &x, &y);
    handle.synchronize().unwrap();
    assert_eq!(y.to_vec(), vec![2.0, 3.0]);
    assert_eq!(handle.memory_in_use(), 0);
}

#[test]
fn test_negative_coo_row_faults_on_synchronize() {
    let handle = Handle::new().unwrap();
    let a = HybMatrix::new(2, 2).with_coo(&[-4], &[0], &[1.0]);
    let x = DeviceBuffer::filled(2, 1.0);
    let y = DeviceBuffer::filled(2, 0.0);

    call(&handle, &a, &x, &y);
    assert!(matches!(
        handle.synchronize(),
        Err(SparseError::KernelFault { .. })
    ));
}

#[test]
fn test_ell_padding_columns_never_fault() {
    let handle = Handle::new().unwrap();
    // Out-of-range ELL columns are padding, not faults
    let a = HybMatrix::new(2, 2).with_ell(2, &[0, 7, -3, 1], &[1.0, 100.0, 100.0, 2.0]);
    let x = DeviceBuffer::filled(2, 1.0);
    let y = DeviceBuffer::filled(2, 0.0);

    call(&handle, &a, &x, &y);
    handle.synchronize().unwrap();
    assert_eq!(y.to_vec(), vec![1.0, 2.0]);
}
