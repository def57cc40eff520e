//! Compressed-column (CSC) sparse storage.
//!
//! Column-major sparse storage with just enough surface for the solver core:
//! `y = A x`, `y = Aᵀ x`, shape queries, and entry reads for preconditioner
//! setup. Entry reads scan one column and are not a hot-path operation.

use crate::core::traits::{MatShape, MatTransVec, MatVec, MatrixGet};
use crate::error::Error;
use num_traits::Float;

pub struct CscMatrix<T> {
    nrows: usize,
    ncols: usize,
    col_ptr: Vec<usize>,
    row_idx: Vec<usize>,
    values: Vec<T>,
}

impl<T: Float> CscMatrix<T> {
    /// Build from raw column-pointer, row-index, and value arrays.
    ///
    /// Validates the structural invariants (monotone column pointers, row
    /// indices in range, matching lengths) up front.
    pub fn from_csc(
        nrows: usize,
        ncols: usize,
        col_ptr: Vec<usize>,
        row_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self, Error> {
        if col_ptr.len() != ncols + 1 || col_ptr[0] != 0 {
            return Err(Error::Config("col_ptr must have ncols + 1 entries starting at 0"));
        }
        if col_ptr.windows(2).any(|w| w[1] < w[0]) {
            return Err(Error::Config("col_ptr must be non-decreasing"));
        }
        if *col_ptr.last().unwrap() != row_idx.len() || row_idx.len() != values.len() {
            return Err(Error::Config("row_idx/values length must equal col_ptr[ncols]"));
        }
        if row_idx.iter().any(|&i| i >= nrows) {
            return Err(Error::Config("row index out of range"));
        }
        Ok(Self {
            nrows,
            ncols,
            col_ptr,
            row_idx,
            values,
        })
    }

    /// Densify into a faer matrix (test and setup convenience).
    pub fn to_dense(&self) -> faer::Mat<T>
    where
        T: faer::traits::ComplexField,
    {
        let mut m = faer::Mat::zeros(self.nrows, self.ncols);
        for j in 0..self.ncols {
            for k in self.col_ptr[j]..self.col_ptr[j + 1] {
                m[(self.row_idx[k], j)] = self.values[k];
            }
        }
        m
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }
}

impl<T: Float> MatVec<Vec<T>> for CscMatrix<T> {
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(x.len(), self.ncols, "input vector x has incorrect length");
        assert_eq!(y.len(), self.nrows, "output vector y has incorrect length");
        y.iter_mut().for_each(|yi| *yi = T::zero());
        for j in 0..self.ncols {
            let xj = x[j];
            for k in self.col_ptr[j]..self.col_ptr[j + 1] {
                y[self.row_idx[k]] = y[self.row_idx[k]] + self.values[k] * xj;
            }
        }
    }
}

impl<T: Float> MatTransVec<Vec<T>> for CscMatrix<T> {
    fn mattransvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(x.len(), self.nrows, "input vector x has incorrect length");
        assert_eq!(y.len(), self.ncols, "output vector y has incorrect length");
        // Columns of A are rows of Aᵀ, so each output entry is one column dot x.
        for j in 0..self.ncols {
            let mut sum = T::zero();
            for k in self.col_ptr[j]..self.col_ptr[j + 1] {
                sum = sum + self.values[k] * x[self.row_idx[k]];
            }
            y[j] = sum;
        }
    }
}

impl<T> MatShape for CscMatrix<T> {
    fn nrows(&self) -> usize {
        self.nrows
    }
    fn ncols(&self) -> usize {
        self.ncols
    }
}

impl<T: Float> MatrixGet<T> for CscMatrix<T> {
    fn get(&self, i: usize, j: usize) -> T {
        for k in self.col_ptr[j]..self.col_ptr[j + 1] {
            if self.row_idx[k] == i {
                return self.values[k];
            }
        }
        T::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_spmv() {
        // 3×3 identity in CSC: col_ptr=[0,1,2,3], row_idx=[0,1,2], vals=[1,1,1]
        let m = CscMatrix::from_csc(3, 3, vec![0, 1, 2, 3], vec![0, 1, 2], vec![1.0, 1.0, 1.0])
            .unwrap();
        let x = vec![2.0, 3.0, 5.0];
        let mut y = vec![0.0; 3];
        m.matvec(&x, &mut y);
        assert_eq!(y, x);
    }

    #[test]
    fn rectangular_pattern() {
        // 2×3 matrix [[1,2,0],[0,3,4]] column-compressed
        let m = CscMatrix::from_csc(
            2,
            3,
            vec![0, 1, 3, 4],
            vec![0, 0, 1, 1],
            vec![1.0, 2.0, 3.0, 4.0],
        )
        .unwrap();
        let x = vec![1.0, 1.0, 1.0];
        let mut y = vec![0.0; 2];
        m.matvec(&x, &mut y);
        assert_eq!(y, vec![3.0, 7.0]);

        let xt = vec![1.0, 1.0];
        let mut yt = vec![0.0; 3];
        m.mattransvec(&xt, &mut yt);
        assert_eq!(yt, vec![1.0, 5.0, 4.0]);
    }

    #[test]
    fn get_scans_columns() {
        let m = CscMatrix::from_csc(
            2,
            2,
            vec![0, 1, 2],
            vec![0, 1],
            vec![4.0, 5.0],
        )
        .unwrap();
        assert_eq!(m.get(0, 0), 4.0);
        assert_eq!(m.get(1, 0), 0.0);
        assert_eq!(m.get(1, 1), 5.0);
    }

    #[test]
    fn rejects_inconsistent_structure() {
        assert!(CscMatrix::from_csc(2, 2, vec![0, 1], vec![0], vec![1.0]).is_err());
        assert!(CscMatrix::from_csc(2, 2, vec![0, 2, 1], vec![0, 1], vec![1.0, 1.0]).is_err());
        assert!(CscMatrix::from_csc(2, 2, vec![0, 1, 2], vec![0, 5], vec![1.0, 1.0]).is_err());
    }
}
