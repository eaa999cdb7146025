//! The crate's items can be imported together with the `hybmv` entry point

use hybmv::{
    dhybmv, hybmv, shybmv, DeviceBuffer, DeviceProperties, Handle, HybMatrix, IndexBase,
    MatDescr, Operation, ScalarArg, Status,
};

#[test]
fn test_glob_style_import_of_entry_point_and_types() {
    let handle = Handle::with_properties(DeviceProperties::default()).unwrap();
    let a = HybMatrix::new(1, 1).with_ell(1, &[1], &[4.0f64]);
    let x = DeviceBuffer::from_slice(&[2.0]);
    let y = DeviceBuffer::filled(1, 0.0);
    let descr = MatDescr::new().with_index_base(IndexBase::One);

    hybmv(
        Some(&handle),
        Operation::NoTranspose,
        Some(&ScalarArg::Host(1.0)),
        Some(&descr),
        Some(&a),
        Some(&x),
        Some(&ScalarArg::Host(0.0)),
        Some(&y),
    )
    .unwrap();
    handle.synchronize().unwrap();
    assert_eq!(y.to_vec(), vec![8.0]);

    let status = dhybmv(
        Some(&handle),
        Operation::NoTranspose,
        Some(&ScalarArg::Host(1.0)),
        Some(&descr),
        Some(&a),
        Some(&x),
        Some(&ScalarArg::Host(1.0)),
        Some(&y),
    );
    assert_eq!(status, Status::Success);
    handle.synchronize().unwrap();
    assert_eq!(y.to_vec(), vec![16.0]);
}

#[test]
fn test_module_paths() {
    let status = hybmv::spmv::shybmv(
        None,
        hybmv::spmv::Operation::NoTranspose,
        None,
        None,
        None,
        None,
        None,
        None,
    );
    assert_eq!(status, Status::InvalidHandle);
    assert_eq!(status, shybmv(None, Operation::Transpose, None, None, None, None, None, None));
}
