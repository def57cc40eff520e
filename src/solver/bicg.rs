//! BiConjugate Gradient (Templates §2.3.5) for nonsymmetric systems.
//!
//! Runs two coupled recurrences, one on `A` and one on `Aᵀ`; a supplied
//! preconditioner must therefore offer `apply_transpose`. The shadow
//! inner product ρ can vanish for a nonsingular system; that is a breakdown,
//! reported as such instead of letting NaN propagate.
//!
//! Monitors the recursively updated residual norm.

use crate::config::MonitorOptions;
use crate::core::traits::{InnerProduct, MatTransVec, MatVec};
use crate::error::Error;
use crate::monitor::{Indicator, IterationMonitor, SolveStats};
use crate::preconditioner::Preconditioner;
use crate::solver::IterativeSolver;
use num_traits::Float;

pub struct BiCgSolver<T> {
    pub monitor: IterationMonitor<T>,
}

impl<T: Float> BiCgSolver<T> {
    pub fn new(opts: MonitorOptions<T>) -> Self {
        Self {
            monitor: IterationMonitor::new(opts),
        }
    }
}

impl<M, V, T> IterativeSolver<M, V> for BiCgSolver<T>
where
    M: MatVec<V> + MatTransVec<V>,
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
        self.monitor.reset();
        let n = b.as_ref().len();
        let ip = ();

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
        let mut r_tld = r.clone();
        let mut z = V::from(vec![T::zero(); n]);
        let mut z_tld = V::from(vec![T::zero(); n]);
        let mut p = V::from(vec![T::zero(); n]);
        let mut p_tld = V::from(vec![T::zero(); n]);
        let mut rho_prev = T::zero();
        let mut first = true;

        loop {
            if let Some(pc) = pc {
                pc.apply(&r, &mut z)?;
                pc.apply_transpose(&r_tld, &mut z_tld)?;
            } else {
                z.clone_from(&r);
                z_tld.clone_from(&r_tld);
            }
            let rho = ip.dot(&z, &r_tld);
            if rho.abs() < T::epsilon() {
                return Err(Error::Breakdown {
                    method: "bicg",
                    quantity: "shadow inner product rho",
                    iterations: self.monitor.iterations(),
                });
            }
            if first {
                p.clone_from(&z);
                p_tld.clone_from(&z_tld);
                first = false;
            } else {
                let beta = rho / rho_prev;
                for (pj, zj) in p.as_mut().iter_mut().zip(z.as_ref()) {
                    *pj = *zj + beta * *pj;
                }
                for (pj, zj) in p_tld.as_mut().iter_mut().zip(z_tld.as_ref()) {
                    *pj = *zj + beta * *pj;
                }
            }

            let mut q = V::from(vec![T::zero(); n]);
            a.matvec(&p, &mut q);
            let mut q_tld = V::from(vec![T::zero(); n]);
            a.mattransvec(&p_tld, &mut q_tld);

            let denom = ip.dot(&p_tld, &q);
            if denom.abs() < T::epsilon() {
                return Err(Error::Breakdown {
                    method: "bicg",
                    quantity: "search-direction inner product p~^T q",
                    iterations: self.monitor.iterations(),
                });
            }
            let alpha = rho / denom;
            for (xj, pj) in xk.iter_mut().zip(p.as_ref()) {
                *xj = *xj + alpha * *pj;
            }
            for (rj, qj) in r.as_mut().iter_mut().zip(q.as_ref()) {
                *rj = *rj - alpha * *qj;
            }
            for (rj, qj) in r_tld.as_mut().iter_mut().zip(q_tld.as_ref()) {
                *rj = *rj - alpha * *qj;
            }

            res_norm = ip.norm(&r);
            if let Indicator::Converged = self.monitor.check(res_norm)? {
                *x = V::from(xk);
                return Ok(self.monitor.stats(res_norm));
            }
            rho_prev = rho;
        }
    }
}
