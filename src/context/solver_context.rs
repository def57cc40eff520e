//! One entry point over every solver in the crate.
//!
//! [`SolverContext`] pairs a matrix with a method selection and optional
//! preconditioner, validates options and shapes once up front, and then
//! dispatches. Each call to [`SolverContext::solve`] runs with a fresh
//! monitor, so a context can be reused across right-hand sides without any
//! state leaking between solves.

use crate::config::MonitorOptions;
use crate::core::traits::{InnerProduct, MatShape, MatTransVec, MatVec};
use crate::error::Error;
use crate::monitor::SolveStats;
use crate::preconditioner::Preconditioner;
use crate::solver::{
    BiCgSolver, CgSolver, CgsSolver, ChebyshevSolver, GmresSolver, IrSolver, IterativeSolver,
    QmrSolver,
};
use num_traits::Float;

/// Method selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverKind {
    /// Conjugate Gradient. SPD matrices only.
    Cg,
    /// BiConjugate Gradient.
    BiCg,
    /// Conjugate Gradient Squared.
    Cgs,
    /// Quasi-Minimal Residual.
    Qmr,
    /// Restarted GMRES.
    Gmres,
    /// Chebyshev semi-iteration. Needs spectral bounds.
    Chebyshev,
    /// Iterative refinement (preconditioned Richardson).
    Ir,
}

const DEFAULT_RESTART: usize = 30;

pub struct SolverContext<'a, M, V, T> {
    kind: SolverKind,
    a: &'a M,
    pc: Option<&'a dyn Preconditioner<M, V>>,
    opts: MonitorOptions<T>,
    restart: usize,
    spectrum: Option<(T, T)>,
}

impl<'a, M, V, T: Float> SolverContext<'a, M, V, T> {
    pub fn new(kind: SolverKind, a: &'a M) -> Self {
        Self {
            kind,
            a,
            pc: None,
            opts: MonitorOptions::default(),
            restart: DEFAULT_RESTART,
            spectrum: None,
        }
    }

    pub fn with_options(mut self, opts: MonitorOptions<T>) -> Self {
        self.opts = opts;
        self
    }

    pub fn with_preconditioner(mut self, pc: &'a dyn Preconditioner<M, V>) -> Self {
        self.pc = Some(pc);
        self
    }

    /// GMRES cycle length. Ignored by every other method.
    pub fn with_restart(mut self, restart: usize) -> Self {
        self.restart = restart;
        self
    }

    /// Bounds `0 < lambda_min < lambda_max` on the spectrum of the
    /// preconditioned operator. Required by Chebyshev, ignored elsewhere.
    pub fn with_spectral_bounds(mut self, lambda_min: T, lambda_max: T) -> Self {
        self.spectrum = Some((lambda_min, lambda_max));
        self
    }
}

impl<M, V, T> SolverContext<'_, M, V, T>
where
    M: MatVec<V> + MatTransVec<V> + MatShape,
    (): InnerProduct<V, Scalar = T>,
    V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    T: Float,
{
    /// Solve `A x = b` with `x` as the initial guess. On any error `x` is
    /// left untouched.
    pub fn solve(&self, b: &V, x: &mut V) -> Result<SolveStats<T>, Error> {
        self.opts.validate()?;
        let (rows, cols) = (self.a.nrows(), self.a.ncols());
        if rows != cols || b.as_ref().len() != rows || x.as_ref().len() != rows {
            return Err(Error::ShapeMismatch {
                rows,
                cols,
                rhs: b.as_ref().len(),
                guess: x.as_ref().len(),
            });
        }

        match self.kind {
            SolverKind::Cg => CgSolver::new(self.opts).solve(self.a, self.pc, b, x),
            SolverKind::BiCg => BiCgSolver::new(self.opts).solve(self.a, self.pc, b, x),
            SolverKind::Cgs => CgsSolver::new(self.opts).solve(self.a, self.pc, b, x),
            SolverKind::Qmr => QmrSolver::new(self.opts).solve(self.a, self.pc, b, x),
            SolverKind::Gmres => {
                GmresSolver::new(self.opts, self.restart).solve(self.a, self.pc, b, x)
            }
            SolverKind::Chebyshev => {
                let (lo, hi) = self.spectrum.ok_or(Error::Config(
                    "chebyshev needs with_spectral_bounds(lambda_min, lambda_max)",
                ))?;
                ChebyshevSolver::new(self.opts, lo, hi).solve(self.a, self.pc, b, x)
            }
            SolverKind::Ir => IrSolver::new(self.opts).solve(self.a, self.pc, b, x),
        }
    }
}
