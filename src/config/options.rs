//! Tunable termination parameters for the iteration monitor.
//!
//! These are configuration knobs shared by every solver; no algorithm bakes
//! in its own copies of them.

use crate::error::Error;
use num_traits::Float;

/// Termination parameters consumed by [`crate::monitor::IterationMonitor`].
#[derive(Debug, Clone, Copy)]
pub struct MonitorOptions<T> {
    /// Hard iteration limit.
    pub max_iters: usize,
    /// Relative tolerance: converged when `res < rtol * res0` (subject to `atol`).
    pub rtol: T,
    /// Absolute floor on the convergence threshold.
    pub atol: T,
    /// Divergence multiple: failed when `res > dtol * res0`.
    pub dtol: T,
}

impl<T: Float> Default for MonitorOptions<T> {
    fn default() -> Self {
        Self {
            max_iters: 100_000,
            rtol: num_traits::cast(1e-5).unwrap(),
            atol: num_traits::cast(1e-50).unwrap(),
            dtol: num_traits::cast(1e5).unwrap(),
        }
    }
}

impl<T: Float> MonitorOptions<T> {
    /// Check the recognized option ranges: `max_iters > 0`, `rtol` in `[0, 1]`,
    /// `atol >= 0`, `dtol > 1`.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_iters == 0 {
            return Err(Error::Config("max_iters must be positive"));
        }
        if !(self.rtol >= T::zero() && self.rtol <= T::one()) {
            return Err(Error::Config("rtol must lie in [0, 1]"));
        }
        if !(self.atol >= T::zero()) {
            return Err(Error::Config("atol must be non-negative"));
        }
        if !(self.dtol > T::one()) {
            return Err(Error::Config("dtol must exceed 1"));
        }
        Ok(())
    }
}
