//! ILUT: incomplete LU with threshold dropping and fill-in control.
//!
//! Row-based factorization (Saad §10.4): each row is eliminated against the
//! previously computed U rows, small entries are dropped relative to the
//! row's norm, and only the `fill` largest entries are kept on each side of
//! the diagonal. The diagonal itself is never dropped; a vanishing diagonal
//! fails the setup rather than poisoning later triangular solves.

use crate::core::traits::{MatShape, MatrixGet};
use crate::error::Error;
use crate::preconditioner::Preconditioner;
use num_traits::Float;

/// Sparse row storage for the L/U factors.
#[derive(Clone)]
pub struct SparseRow<T> {
    pub cols: Vec<usize>,
    pub vals: Vec<T>,
}

impl<T> SparseRow<T> {
    pub fn new() -> Self {
        Self {
            cols: Vec::new(),
            vals: Vec::new(),
        }
    }
}

impl<T> Default for SparseRow<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// ILUT preconditioner.
///
/// - `fill`: maximum kept nonzeros per row on each side of the diagonal
/// - `droptol`: relative drop tolerance
pub struct Ilut<T> {
    pub fill: usize,
    pub droptol: T,
    l: Vec<SparseRow<T>>,
    u: Vec<SparseRow<T>>,
    n: usize,
}

impl<T: Float> Ilut<T> {
    pub fn new(fill: usize, droptol: T) -> Self {
        Self {
            fill,
            droptol,
            l: Vec::new(),
            u: Vec::new(),
            n: 0,
        }
    }

    /// Keep the `keep` largest-magnitude entries of `row`, in column order.
    fn prune(mut row: Vec<(usize, T)>, keep: usize) -> Vec<(usize, T)> {
        if row.len() > keep {
            row.sort_by(|a, b| {
                b.1.abs()
                    .partial_cmp(&a.1.abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            row.truncate(keep);
        }
        row.sort_by_key(|&(j, _)| j);
        row
    }
}

impl<M, V, T> Preconditioner<M, V> for Ilut<T>
where
    M: MatShape + MatrixGet<T>,
    V: AsRef<[T]> + AsMut<[T]>,
    T: Float,
{
    fn setup(&mut self, a: &M) -> Result<(), Error> {
        let n = a.nrows();
        self.n = n;
        self.l = vec![SparseRow::new(); n];
        self.u = vec![SparseRow::new(); n];

        for i in 0..n {
            // Dense scatter of row i
            let mut w = vec![T::zero(); n];
            let mut row_norm = T::zero();
            for j in 0..n {
                let v = a.get(i, j);
                w[j] = v;
                row_norm = row_norm + v * v;
            }
            let drop_threshold = self.droptol * row_norm.sqrt();

            // Eliminate against earlier U rows
            for k in 0..i {
                if w[k] == T::zero() {
                    continue;
                }
                let ukk_idx = self.u[k]
                    .cols
                    .iter()
                    .position(|&c| c == k)
                    .ok_or(Error::ZeroPivot(k))?;
                let factor = w[k] / self.u[k].vals[ukk_idx];
                if factor.abs() < drop_threshold {
                    w[k] = T::zero();
                    continue;
                }
                w[k] = factor;
                for (idx, &j) in self.u[k].cols.iter().enumerate() {
                    if j > k {
                        w[j] = w[j] - factor * self.u[k].vals[idx];
                    }
                }
            }

            // Split, drop, and cap fill on each side of the diagonal
            let mut lpart = Vec::new();
            let mut upart = Vec::new();
            let diag = w[i];
            for (j, &v) in w.iter().enumerate() {
                if j == i || v == T::zero() || v.abs() < drop_threshold {
                    continue;
                }
                if j < i {
                    lpart.push((j, v));
                } else {
                    upart.push((j, v));
                }
            }
            if diag == T::zero() {
                return Err(Error::ZeroPivot(i));
            }
            let lpart = Self::prune(lpart, self.fill);
            let mut upart = Self::prune(upart, self.fill);
            upart.insert(0, (i, diag));

            let (cols, vals) = lpart.into_iter().unzip();
            self.l[i] = SparseRow { cols, vals };
            let (cols, vals) = upart.into_iter().unzip();
            self.u[i] = SparseRow { cols, vals };
        }
        Ok(())
    }

    fn apply(&self, r: &V, z: &mut V) -> Result<(), Error> {
        let n = self.n;
        let r = r.as_ref();
        let z = z.as_mut();
        let mut y = vec![T::zero(); n];
        // Forward: L y = r (unit diagonal)
        for i in 0..n {
            let mut sum = r[i];
            for (idx, &j) in self.l[i].cols.iter().enumerate() {
                sum = sum - self.l[i].vals[idx] * y[j];
            }
            y[i] = sum;
        }
        // Backward: U z = y (diagonal stored first in each U row)
        for i in (0..n).rev() {
            let mut sum = y[i];
            for (idx, &j) in self.u[i].cols.iter().enumerate() {
                if j > i {
                    sum = sum - self.u[i].vals[idx] * z[j];
                }
            }
            z[i] = sum / self.u[i].vals[0];
        }
        Ok(())
    }
}
