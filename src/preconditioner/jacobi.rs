// Jacobi (diagonal scaling) preconditioner

use crate::core::traits::{MatShape, MatrixGet};
use crate::error::Error;
use crate::preconditioner::Preconditioner;
use num_traits::Float;

/// Jacobi preconditioner: M⁻¹ = D⁻¹.
///
/// A zero diagonal entry is a configuration error, not a numerical accident:
/// `setup` refuses it instead of letting `apply` manufacture Inf/NaN.
pub struct Jacobi<T> {
    pub(crate) inv_diag: Vec<T>,
}

impl<T: Float> Jacobi<T> {
    /// New with empty state; user must call `setup`.
    pub fn new() -> Self {
        Self { inv_diag: Vec::new() }
    }
}

impl<T: Float> Default for Jacobi<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, V, T> Preconditioner<M, V> for Jacobi<T>
where
    M: MatShape + MatrixGet<T>,
    V: AsRef<[T]> + AsMut<[T]>,
    T: Float,
{
    fn setup(&mut self, a: &M) -> Result<(), Error> {
        let n = a.nrows();
        let mut inv_diag = Vec::with_capacity(n);
        for i in 0..n {
            let d = a.get(i, i);
            if d == T::zero() {
                return Err(Error::ZeroDiagonal(i));
            }
            inv_diag.push(T::one() / d);
        }
        self.inv_diag = inv_diag;
        Ok(())
    }

    fn apply(&self, r: &V, z: &mut V) -> Result<(), Error> {
        let r = r.as_ref();
        let z = z.as_mut();
        for i in 0..r.len() {
            z[i] = self.inv_diag[i] * r[i];
        }
        Ok(())
    }

    // D⁻¹ is symmetric
    fn apply_transpose(&self, r: &V, z: &mut V) -> Result<(), Error> {
        <Self as Preconditioner<M, V>>::apply(self, r, z)
    }
}
