// Matrix data structures and operations

pub mod descriptor;
pub mod hyb;
pub mod reference;

pub use descriptor::{IndexBase, MatDescr, MatrixType};
pub use hyb::{HybMatrix, HybPartition, SparseMatrixHYB};
pub use reference::reference_hybmv;
