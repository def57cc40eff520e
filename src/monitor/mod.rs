//! Convergence and divergence tracking for iterative solvers.
//!
//! Every solver feeds its residual norm (true or a documented per-method
//! proxy) through an [`IterationMonitor`] once per iteration. The monitor is
//! the single place where termination is decided: it either signals
//! continuation, signals convergence, or fails the solve with a
//! [`StopReason`].

use crate::config::MonitorOptions;
use crate::error::{Error, StopReason};
use num_traits::Float;

/// Non-terminal outcome of a residual check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Continue,
    Converged,
}

/// Iteration stats returned by a successful solve.
#[derive(Clone, Debug)]
pub struct SolveStats<T> {
    pub iterations: usize,
    pub final_residual: T,
    pub converged: bool,
}

/// Per-solve termination state machine.
///
/// The initial residual norm is captured exactly once, on the first check of
/// a solve, and frozen thereafter; [`IterationMonitor::reset`] must run before
/// the monitor is reused for another solve.
pub struct IterationMonitor<T> {
    pub opts: MonitorOptions<T>,
    iteration: usize,
    initial_residual: Option<T>,
}

impl<T: Float> IterationMonitor<T> {
    pub fn new(opts: MonitorOptions<T>) -> Self {
        Self {
            opts,
            iteration: 0,
            initial_residual: None,
        }
    }

    /// Clear per-solve state (iteration count and the frozen initial residual).
    pub fn reset(&mut self) {
        self.iteration = 0;
        self.initial_residual = None;
    }

    /// Number of completed iterations so far.
    pub fn iterations(&self) -> usize {
        self.iteration
    }

    /// Convergence threshold once the initial residual is known:
    /// `max(rtol * res0, atol)`.
    fn threshold(&self, res0: T) -> T {
        (self.opts.rtol * res0).max(self.opts.atol)
    }

    /// Non-mutating threshold query for solvers that re-test a recomputed
    /// true residual (e.g. GMRES at a restart boundary) without consuming an
    /// iteration.
    pub fn met(&self, res_norm: T) -> bool {
        match self.initial_residual {
            Some(res0) => res_norm < self.threshold(res0),
            None => false,
        }
    }

    /// Check one residual norm.
    ///
    /// Test order matters: convergence, then the divergence ratio, then the
    /// iteration limit, then an explicit NaN test. NaN compares false against
    /// everything, so without the final test a NaN residual would fall
    /// through every threshold and loop forever; placed last, it can never
    /// shadow a genuine convergence or divergence verdict either.
    pub fn check(&mut self, res_norm: T) -> Result<Indicator, Error> {
        let res0 = *self.initial_residual.get_or_insert(res_norm);
        if res_norm < self.threshold(res0) {
            return Ok(Indicator::Converged);
        }
        if res_norm > self.opts.dtol * res0 {
            return Err(Error::NotConverged {
                reason: StopReason::Divergence,
                iterations: self.iteration,
                residual: res_norm.to_f64().unwrap_or(f64::NAN),
            });
        }
        if self.iteration >= self.opts.max_iters {
            return Err(Error::NotConverged {
                reason: StopReason::Iterations,
                iterations: self.iteration,
                residual: res_norm.to_f64().unwrap_or(f64::NAN),
            });
        }
        if res_norm.is_nan() {
            return Err(Error::NotConverged {
                reason: StopReason::DivergenceNan,
                iterations: self.iteration,
                residual: f64::NAN,
            });
        }
        self.iteration += 1;
        Ok(Indicator::Continue)
    }

    /// Package the terminal state of a converged solve.
    pub fn stats(&self, final_residual: T) -> SolveStats<T> {
        SolveStats {
            iterations: self.iteration,
            final_residual,
            converged: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> IterationMonitor<f64> {
        IterationMonitor::new(MonitorOptions::default())
    }

    #[test]
    fn converges_at_second_check() {
        // Residual sequence [1.0, 1e-6] under default tolerances.
        let mut m = monitor();
        assert_eq!(m.check(1.0).unwrap(), Indicator::Continue);
        assert_eq!(m.check(1e-6).unwrap(), Indicator::Converged);
        assert_eq!(m.iterations(), 1);
    }

    #[test]
    fn zero_initial_residual_is_convergence() {
        let mut m = monitor();
        assert_eq!(m.check(0.0).unwrap(), Indicator::Converged);
        assert_eq!(m.iterations(), 0);
    }

    #[test]
    fn growing_residuals_diverge() {
        let mut m = monitor();
        let mut res = 1.0;
        let outcome = loop {
            match m.check(res) {
                Ok(Indicator::Continue) => res *= 10.0,
                other => break other,
            }
        };
        match outcome {
            Err(Error::NotConverged {
                reason: StopReason::Divergence,
                ..
            }) => {}
            other => panic!("expected divergence, got {other:?}"),
        }
    }

    #[test]
    fn nan_is_never_convergence() {
        let mut m = monitor();
        assert_eq!(m.check(1.0).unwrap(), Indicator::Continue);
        match m.check(f64::NAN) {
            Err(Error::NotConverged {
                reason: StopReason::DivergenceNan,
                ..
            }) => {}
            other => panic!("expected NaN divergence, got {other:?}"),
        }
    }

    #[test]
    fn nan_on_first_check_is_caught() {
        // A NaN initial residual freezes a NaN res0; every comparison against
        // it is false, so the explicit test must still fire.
        let mut m = monitor();
        match m.check(f64::NAN) {
            Err(Error::NotConverged {
                reason: StopReason::DivergenceNan,
                ..
            }) => {}
            other => panic!("expected NaN divergence, got {other:?}"),
        }
    }

    #[test]
    fn iteration_limit_is_reported() {
        let mut m = IterationMonitor::new(MonitorOptions {
            max_iters: 3,
            ..MonitorOptions::default()
        });
        for _ in 0..3 {
            assert_eq!(m.check(1.0).unwrap(), Indicator::Continue);
        }
        match m.check(1.0) {
            Err(Error::NotConverged {
                reason: StopReason::Iterations,
                iterations: 3,
                ..
            }) => {}
            other => panic!("expected iteration limit, got {other:?}"),
        }
    }

    #[test]
    fn initial_residual_is_frozen() {
        // Dropping below rtol * first-seen residual converges even though
        // later residuals never revisit the first check's value.
        let mut m = monitor();
        assert_eq!(m.check(100.0).unwrap(), Indicator::Continue);
        assert_eq!(m.check(50.0).unwrap(), Indicator::Continue);
        assert_eq!(m.check(9e-4).unwrap(), Indicator::Converged);
    }

    #[test]
    fn reset_forgets_history() {
        let mut m = monitor();
        assert_eq!(m.check(1.0).unwrap(), Indicator::Continue);
        m.reset();
        // New solve, new res0: 0.5 is the first residual now, not converged.
        assert_eq!(m.check(0.5).unwrap(), Indicator::Continue);
        assert_eq!(m.iterations(), 1);
    }
}
