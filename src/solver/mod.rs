//! Iterative solver interfaces and implementations.

use crate::error::Error;
use crate::monitor::SolveStats;
use crate::preconditioner::Preconditioner;

/// Common interface for the iterative methods.
///
/// `solve` reads `x` as the initial guess and overwrites it with the solution
/// on success; on failure `x` is left at the initial guess. Scratch vectors
/// live inside the call, so one solver instance must not be shared between
/// concurrent solves.
pub trait IterativeSolver<M, V> {
    type Scalar: Copy + PartialOrd;

    /// Solve A·x = b, reporting iteration stats on convergence and a
    /// [`crate::error::Error`] (non-convergence, breakdown) otherwise.
    fn solve(
        &mut self,
        a: &M,
        pc: Option<&dyn Preconditioner<M, V>>,
        b: &V,
        x: &mut V,
    ) -> Result<SolveStats<Self::Scalar>, Error>;
}

pub mod bicg;
pub use bicg::BiCgSolver;

pub mod cg;
pub use cg::CgSolver;

pub mod cgs;
pub use cgs::CgsSolver;

pub mod chebyshev;
pub use chebyshev::ChebyshevSolver;

pub mod gmres;
pub use gmres::GmresSolver;

pub mod ir;
pub use ir::IrSolver;

pub mod qmr;
pub use qmr::QmrSolver;
