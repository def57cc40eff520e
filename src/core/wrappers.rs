//! Trait implementations for faer dense matrices and plain vectors.
//!
//! These wire `faer::Mat`, `faer::MatRef`, and `Vec<T>` into the solver
//! framework's collaborator traits. Inner products and norms go through
//! Rayon when the `rayon` feature is enabled (the default), matching the
//! data-parallel reduction the rest of the crate assumes.

use crate::core::traits::{InnerProduct, MatShape, MatTransVec, MatVec, MatrixGet};
use faer::{Mat, MatRef};
use num_traits::Float;

impl<T: Float> MatVec<Vec<T>> for Mat<T> {
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(self.nrows(), y.len(), "output vector y has incorrect length");
        assert_eq!(self.ncols(), x.len(), "input vector x has incorrect length");
        for i in 0..self.nrows() {
            y[i] = T::zero();
            for j in 0..self.ncols() {
                y[i] = y[i] + self[(i, j)] * x[j];
            }
        }
    }
}

impl<'a, T: Float> MatVec<Vec<T>> for MatRef<'a, T> {
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(self.nrows(), y.len(), "output vector y has incorrect length");
        assert_eq!(self.ncols(), x.len(), "input vector x has incorrect length");
        for i in 0..self.nrows() {
            y[i] = T::zero();
            for j in 0..self.ncols() {
                y[i] = y[i] + self[(i, j)] * x[j];
            }
        }
    }
}

impl<T: Float> MatTransVec<Vec<T>> for Mat<T> {
    fn mattransvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(self.ncols(), y.len(), "output vector y has incorrect length");
        assert_eq!(self.nrows(), x.len(), "input vector x has incorrect length");
        for j in 0..self.ncols() {
            y[j] = T::zero();
            for i in 0..self.nrows() {
                y[j] = y[j] + self[(i, j)] * x[i];
            }
        }
    }
}

impl<'a, T: Float> MatTransVec<Vec<T>> for MatRef<'a, T> {
    fn mattransvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(self.ncols(), y.len(), "output vector y has incorrect length");
        assert_eq!(self.nrows(), x.len(), "input vector x has incorrect length");
        for j in 0..self.ncols() {
            y[j] = T::zero();
            for i in 0..self.nrows() {
                y[j] = y[j] + self[(i, j)] * x[i];
            }
        }
    }
}

/// Inner product and norm for vectors, Rayon-parallel when the feature is on.
impl<T: Float + Send + Sync> InnerProduct<Vec<T>> for () {
    type Scalar = T;

    fn dot(&self, x: &Vec<T>, y: &Vec<T>) -> T {
        assert_eq!(x.len(), y.len(), "vectors must have the same length");
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            x.as_slice()
                .par_iter()
                .zip(y.as_slice().par_iter())
                .map(|(xi, yi)| *xi * *yi)
                .reduce(|| T::zero(), |acc, v| acc + v)
        }
        #[cfg(not(feature = "rayon"))]
        {
            x.iter()
                .zip(y.iter())
                .map(|(xi, yi)| *xi * *yi)
                .fold(T::zero(), |acc, v| acc + v)
        }
    }

    fn norm(&self, x: &Vec<T>) -> T {
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            x.as_slice()
                .par_iter()
                .map(|xi| *xi * *xi)
                .reduce(|| T::zero(), |acc, v| acc + v)
                .sqrt()
        }
        #[cfg(not(feature = "rayon"))]
        {
            x.iter()
                .map(|xi| *xi * *xi)
                .fold(T::zero(), |acc, v| acc + v)
                .sqrt()
        }
    }
}

impl<T> MatShape for Mat<T> {
    fn nrows(&self) -> usize {
        self.nrows()
    }
    fn ncols(&self) -> usize {
        self.ncols()
    }
}

impl<'a, T> MatShape for MatRef<'a, T> {
    fn nrows(&self) -> usize {
        self.nrows()
    }
    fn ncols(&self) -> usize {
        self.ncols()
    }
}

impl<T: Float> MatrixGet<T> for Mat<T> {
    fn get(&self, i: usize, j: usize) -> T {
        self[(i, j)]
    }
}

impl<'a, T: Float> MatrixGet<T> for MatRef<'a, T> {
    fn get(&self, i: usize, j: usize) -> T {
        self[(i, j)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    #[test]
    fn matvec_and_transpose_agree_with_hand_computation() {
        let a = mat![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let x = vec![1.0, -1.0];
        let mut y = vec![0.0; 3];
        a.matvec(&x, &mut y);
        assert_eq!(y, vec![-1.0, -1.0, -1.0]);

        let xt = vec![1.0, 1.0, 1.0];
        let mut yt = vec![0.0; 2];
        a.mattransvec(&xt, &mut yt);
        assert_eq!(yt, vec![9.0, 12.0]);
    }

    #[test]
    fn dot_and_norm() {
        let ip = ();
        let x = vec![3.0, 4.0];
        assert_eq!(ip.dot(&x, &x), 25.0);
        assert_eq!(ip.norm(&x), 5.0);
    }
}
