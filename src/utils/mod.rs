//! Utility functions and helpers

pub mod formats;

pub use formats::{to_dense, to_sprs_csr};
