//! Preconditioners for the iterative solvers.
//!
//! A preconditioner is built once from the system matrix (`setup`) and then
//! applied read-only during a solve. Setup failures (zero diagonals, zero
//! pivots) surface immediately at `setup` time, never deferred into `apply`.

use crate::error::Error;

/// A preconditioner M ≈ A⁻¹.
///
/// After `setup` succeeds the object is immutable for the duration of a
/// solve; `apply` must not mutate state, so a built preconditioner may be
/// shared read-only across concurrent solves of the same matrix. Rebuilding
/// for a different matrix takes an explicit new `setup` call.
pub trait Preconditioner<M, V> {
    /// Build/factorize from A.
    fn setup(&mut self, _a: &M) -> Result<(), Error> {
        Ok(())
    }
    /// Apply M⁻¹ to r, writing z = M⁻¹ r.
    fn apply(&self, r: &V, z: &mut V) -> Result<(), Error>;
    /// Apply M⁻ᵀ to r. Optional capability; the two-sided methods (BiCG,
    /// QMR) need it when preconditioned, everything else does not.
    fn apply_transpose(&self, r: &V, z: &mut V) -> Result<(), Error> {
        let _ = (r, z);
        Err(Error::Unsupported("transpose preconditioner apply"))
    }
}

/// Identity preconditioner: z = r.
pub struct Identity;

impl<M, V: Clone> Preconditioner<M, V> for Identity {
    fn apply(&self, r: &V, z: &mut V) -> Result<(), Error> {
        z.clone_from(r);
        Ok(())
    }
    fn apply_transpose(&self, r: &V, z: &mut V) -> Result<(), Error> {
        z.clone_from(r);
        Ok(())
    }
}

// Submodules for the concrete preconditioners
pub mod amg;
pub mod ilu;
pub mod ilut;
pub mod jacobi;

// Re-exports for convenience
pub use amg::Amg;
pub use ilu::Ilu0;
pub use ilut::Ilut;
pub use jacobi::Jacobi;
