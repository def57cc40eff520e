//! ILU(0): incomplete LU with zero fill.
//!
//! The factorization runs once at `setup` and only updates entries inside
//! A's nonzero pattern. A vanishing pivot is a structural problem with the
//! matrix and fails the setup immediately; it is never deferred into `apply`.

use crate::core::traits::{MatShape, MatrixGet};
use crate::error::Error;
use crate::preconditioner::Preconditioner;
use faer::Mat;
use faer::traits::ComplexField;
use num_traits::Float;

pub struct Ilu0<T> {
    pub(crate) l: Mat<T>,
    pub(crate) u: Mat<T>,
    n: usize,
}

impl<T: Float + ComplexField> Ilu0<T> {
    pub fn new() -> Self {
        Self {
            l: Mat::zeros(0, 0),
            u: Mat::zeros(0, 0),
            n: 0,
        }
    }
}

impl<T: Float + ComplexField> Default for Ilu0<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, V, T> Preconditioner<M, V> for Ilu0<T>
where
    M: MatShape + MatrixGet<T>,
    V: AsRef<[T]> + AsMut<[T]>,
    T: Float + ComplexField,
{
    fn setup(&mut self, a: &M) -> Result<(), Error> {
        let n = a.nrows();
        // Work on a dense copy restricted to A's pattern; zero entries stay
        // zero (no fill-in).
        let mut w = Mat::from_fn(n, n, |i, j| a.get(i, j));
        let pattern = |i: usize, j: usize| a.get(i, j) != T::zero();

        for i in 1..n {
            for k in 0..i {
                if !pattern(i, k) {
                    continue;
                }
                let pivot = w[(k, k)];
                if pivot == T::zero() {
                    return Err(Error::ZeroPivot(k));
                }
                let lik = w[(i, k)] / pivot;
                w[(i, k)] = lik;
                for j in (k + 1)..n {
                    if pattern(i, j) {
                        w[(i, j)] = w[(i, j)] - lik * w[(k, j)];
                    }
                }
            }
        }
        for i in 0..n {
            if w[(i, i)] == T::zero() {
                return Err(Error::ZeroPivot(i));
            }
        }

        let mut l = Mat::zeros(n, n);
        let mut u = Mat::zeros(n, n);
        for i in 0..n {
            l[(i, i)] = T::one();
            for j in 0..i {
                l[(i, j)] = w[(i, j)];
            }
            for j in i..n {
                u[(i, j)] = w[(i, j)];
            }
        }
        self.l = l;
        self.u = u;
        self.n = n;
        Ok(())
    }

    fn apply(&self, r: &V, z: &mut V) -> Result<(), Error> {
        let n = self.n;
        let r = r.as_ref();
        let z = z.as_mut();
        // Forward: L y = r (unit diagonal)
        for i in 0..n {
            let mut sum = r[i];
            for j in 0..i {
                sum = sum - self.l[(i, j)] * z[j];
            }
            z[i] = sum;
        }
        // Backward: U z = y
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                z[i] = z[i] - self.u[(i, j)] * z[j];
            }
            z[i] = z[i] / self.u[(i, i)];
        }
        Ok(())
    }

    fn apply_transpose(&self, r: &V, z: &mut V) -> Result<(), Error> {
        let n = self.n;
        let r = r.as_ref();
        let z = z.as_mut();
        // (L U)ᵀ z = r: first Uᵀ y = r (lower triangular, diag of U), then
        // Lᵀ z = y (unit upper triangular).
        for i in 0..n {
            let mut sum = r[i];
            for j in 0..i {
                sum = sum - self.u[(j, i)] * z[j];
            }
            z[i] = sum / self.u[(i, i)];
        }
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                z[i] = z[i] - self.l[(j, i)] * z[j];
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::MatVec;
    use faer::mat;

    #[test]
    fn exact_for_full_pattern() {
        // Dense pattern: ILU(0) equals the full LU, so M⁻¹ r solves exactly.
        let a = mat![[4.0, 1.0, 2.0], [1.0, 3.0, 1.0], [2.0, 1.0, 5.0]];
        let mut pc = Ilu0::new();
        Preconditioner::<faer::Mat<f64>, Vec<f64>>::setup(&mut pc, &a).unwrap();
        let x_true = vec![1.0, -2.0, 3.0];
        let mut r = vec![0.0; 3];
        a.matvec(&x_true, &mut r);
        let mut z = vec![0.0; 3];
        Preconditioner::<faer::Mat<f64>, Vec<f64>>::apply(&pc, &r, &mut z).unwrap();
        for (zi, xi) in z.iter().zip(&x_true) {
            assert!((zi - xi).abs() < 1e-12, "z = {z:?}");
        }
    }

    #[test]
    fn transpose_apply_solves_transposed_system() {
        let a = mat![[4.0, 1.0, 2.0], [1.0, 3.0, 1.0], [2.0, 1.0, 5.0]];
        let mut pc = Ilu0::new();
        Preconditioner::<faer::Mat<f64>, Vec<f64>>::setup(&mut pc, &a).unwrap();
        let x_true = vec![2.0, 1.0, -1.0];
        // r = Aᵀ x
        let mut r = vec![0.0; 3];
        use crate::core::traits::MatTransVec;
        a.mattransvec(&x_true, &mut r);
        let mut z = vec![0.0; 3];
        Preconditioner::<faer::Mat<f64>, Vec<f64>>::apply_transpose(&pc, &r, &mut z).unwrap();
        for (zi, xi) in z.iter().zip(&x_true) {
            assert!((zi - xi).abs() < 1e-12, "z = {z:?}");
        }
    }

    #[test]
    fn zero_pivot_fails_at_setup() {
        // Structurally singular leading block
        let a = mat![[0.0, 1.0], [1.0, 1.0]];
        let mut pc: Ilu0<f64> = Ilu0::new();
        match Preconditioner::<faer::Mat<f64>, Vec<f64>>::setup(&mut pc, &a) {
            Err(Error::ZeroPivot(0)) => {}
            other => panic!("expected ZeroPivot(0), got {other:?}"),
        }
    }
}
