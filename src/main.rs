use hybmv::{hybmv, reference_hybmv, to_dense, SparseError};
use hybmv::{DeviceBuffer, Handle, HybMatrix, IndexBase, MatDescr, Operation, ScalarArg};

fn main() -> Result<(), SparseError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("HYBMV: Hybrid ELL+COO sparse matrix-vector multiplication");

    // Create a simple example matrix
    //    [2 0 0 1]
    //    [0 0 0 0]
    //    [0 1 3 4]
    // ELL width 1 holds the first entry of each row, COO the overflow.
    let a = HybMatrix::new(3, 4)
        .with_ell(1, &[0, -1, 2], &[2.0f64, 0.0, 3.0])
        .with_coo(&[2, 0, 2], &[3, 3, 1], &[4.0, 1.0, 1.0]);

    println!("\nMatrix A:");
    println!("{:?}", a);
    println!("{}", to_dense(&a, IndexBase::Zero));

    let handle = Handle::new()?;
    println!("\nDevice:");
    println!("  Warp size: {}", handle.warp_size());
    println!("  Max threads per block: {}", handle.properties().max_threads_per_block);
    println!("  Multiprocessors: {}", handle.properties().multiprocessor_count);

    let x_host = [1.0, 2.0, 3.0, 4.0];
    let y_host = [1.0, 1.0, 1.0];
    let (alpha, beta) = (2.0, 0.5);

    let x = DeviceBuffer::from_slice(&x_host);
    let y = DeviceBuffer::from_slice(&y_host);

    hybmv(
        Some(&handle),
        Operation::NoTranspose,
        Some(&ScalarArg::Host(alpha)),
        Some(&MatDescr::new()),
        Some(&a),
        Some(&x),
        Some(&ScalarArg::Host(beta)),
        Some(&y),
    )?;
    handle.synchronize()?;

    let mut expected = y_host;
    reference_hybmv(alpha, IndexBase::Zero, &a, &x_host, beta, &mut expected);

    println!("\ny = {} * A * x + {} * y", alpha, beta);
    println!("  device:    {:?}", y.to_vec());
    println!("  reference: {:?}", expected);

    Ok(())
}
