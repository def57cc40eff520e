//! Matrix storage helpers (dense construction, compressed-column sparse).

pub mod dense;
pub mod sparse;

pub use dense::DenseMatrix;
pub use sparse::CscMatrix;
