//! Dense-matrix API on top of faer.

use crate::core::traits::{MatShape, MatVec};
use faer::Mat;

/// Construction helper so any faer `Mat<T>` can be built from caller-owned
/// raw storage.
pub trait DenseMatrix<T>: MatVec<Vec<T>> + MatShape {
    /// Construct from raw column-major storage.
    fn from_raw(nrows: usize, ncols: usize, data: Vec<T>) -> Self;
}

impl<T: Copy + num_traits::Float> DenseMatrix<T> for Mat<T> {
    fn from_raw(nrows: usize, ncols: usize, data: Vec<T>) -> Self {
        Mat::from_fn(nrows, ncols, |i, j| data[j * nrows + i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_is_column_major() {
        // Columns [1, 2] and [3, 4]
        let a = <Mat<f64> as DenseMatrix<f64>>::from_raw(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(a.nrows(), 2);
        assert_eq!(a[(0, 0)], 1.0);
        assert_eq!(a[(1, 0)], 2.0);
        assert_eq!(a[(0, 1)], 3.0);
        assert_eq!(a[(1, 1)], 4.0);

        let x = vec![1.0, 1.0];
        let mut y = vec![0.0; 2];
        a.matvec(&x, &mut y);
        assert_eq!(y, vec![4.0, 6.0]);
    }
}
