//! Chebyshev semi-iteration (Saad §12.2, Templates §2.3.8).
//!
//! Needs user-supplied bounds `0 < λmin ≤ λ(M⁻¹A) ≤ λmax` on the spectrum
//! of the preconditioned operator; the recurrence runs with no inner
//! products at all, which is why the bounds cannot be estimated here.
//! Wrong bounds do not break the recurrence, they just stall it, and the
//! monitor then reports divergence or the iteration limit.

use crate::config::MonitorOptions;
use crate::core::traits::{InnerProduct, MatVec};
use crate::error::Error;
use crate::monitor::{Indicator, IterationMonitor, SolveStats};
use crate::preconditioner::Preconditioner;
use crate::solver::IterativeSolver;
use num_traits::Float;

pub struct ChebyshevSolver<T> {
    pub monitor: IterationMonitor<T>,
    pub lambda_min: T,
    pub lambda_max: T,
}

impl<T: Float> ChebyshevSolver<T> {
    pub fn new(opts: MonitorOptions<T>, lambda_min: T, lambda_max: T) -> Self {
        Self {
            monitor: IterationMonitor::new(opts),
            lambda_min,
            lambda_max,
        }
    }
}

impl<M, V, T> IterativeSolver<M, V> for ChebyshevSolver<T>
where
    M: MatVec<V>,
    (): InnerProduct<V, Scalar = T>,
    V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    T: Float,
{
    type Scalar = T;

    fn solve(
        &mut self,
        a: &M,
        pc: Option<&dyn Preconditioner<M, V>>,
        b: &V,
        x: &mut V,
    ) -> Result<SolveStats<T>, Error> {
        if !(self.lambda_min > T::zero() && self.lambda_max > self.lambda_min) {
            return Err(Error::Config(
                "chebyshev needs spectral bounds 0 < lambda_min < lambda_max",
            ));
        }
        self.monitor.reset();
        let n = b.as_ref().len();
        let ip = ();

        // Center and half-width of the ellipse enclosing the spectrum
        let center = (self.lambda_max + self.lambda_min) / (T::one() + T::one());
        let half = (self.lambda_max - self.lambda_min) / (T::one() + T::one());

        let mut r = {
            let mut tmp = V::from(vec![T::zero(); n]);
            a.matvec(x, &mut tmp);
            let rv = b
                .as_ref()
                .iter()
                .zip(tmp.as_ref())
                .map(|(&bi, &axi)| bi - axi)
                .collect::<Vec<_>>();
            V::from(rv)
        };
        let mut res_norm = ip.norm(&r);
        if let Indicator::Converged = self.monitor.check(res_norm)? {
            return Ok(self.monitor.stats(res_norm));
        }

        let mut xk = x.as_ref().to_vec();
        let mut z = V::from(vec![T::zero(); n]);
        let mut p = V::from(vec![T::zero(); n]);
        let mut alpha = T::zero();
        let mut first = true;

        loop {
            if let Some(pc) = pc {
                pc.apply(&r, &mut z)?;
            } else {
                z.clone_from(&r);
            }
            if first {
                p.clone_from(&z);
                alpha = T::one() / center;
                first = false;
            } else {
                let two = T::one() + T::one();
                let beta = (half * alpha / two) * (half * alpha / two);
                alpha = T::one() / (center - beta / alpha);
                for (pj, zj) in p.as_mut().iter_mut().zip(z.as_ref()) {
                    *pj = *zj + beta * *pj;
                }
            }

            let mut ap = V::from(vec![T::zero(); n]);
            a.matvec(&p, &mut ap);
            for (xj, pj) in xk.iter_mut().zip(p.as_ref()) {
                *xj = *xj + alpha * *pj;
            }
            for (rj, apj) in r.as_mut().iter_mut().zip(ap.as_ref()) {
                *rj = *rj - alpha * *apj;
            }

            res_norm = ip.norm(&r);
            if let Indicator::Converged = self.monitor.check(res_norm)? {
                *x = V::from(xk);
                return Ok(self.monitor.stats(res_norm));
            }
        }
    }
}
