//! Preconditioned Conjugate Gradient (Saad §9.2). Requires SPD `A`.
//!
//! Monitors the recursively updated residual norm, which can drift from the
//! true `‖b − A x‖` in long solves; this is the method's intended
//! cost/accuracy trade-off, not an oversight.

use crate::config::MonitorOptions;
use crate::core::traits::{InnerProduct, MatVec};
use crate::error::Error;
use crate::monitor::{Indicator, IterationMonitor, SolveStats};
use crate::preconditioner::Preconditioner;
use crate::solver::IterativeSolver;
use num_traits::Float;

pub struct CgSolver<T> {
    pub monitor: IterationMonitor<T>,
}

impl<T: Float> CgSolver<T> {
    pub fn new(opts: MonitorOptions<T>) -> Self {
        Self {
            monitor: IterationMonitor::new(opts),
        }
    }
}

impl<M, V, T> IterativeSolver<M, V> for CgSolver<T>
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
        let mut z = V::from(vec![T::zero(); n]);
        if let Some(pc) = pc {
            pc.apply(&r, &mut z)?;
        } else {
            z.clone_from(&r);
        }
        let mut p = z.clone();
        let mut rz = ip.dot(&r, &z);

        loop {
            let mut ap = V::from(vec![T::zero(); n]);
            a.matvec(&p, &mut ap);
            let p_dot_ap = ip.dot(&p, &ap);
            // Indefinite-matrix detection
            if p_dot_ap <= T::zero() {
                return Err(Error::Breakdown {
                    method: "cg",
                    quantity: "p^T A p",
                    iterations: self.monitor.iterations(),
                });
            }
            let alpha = rz / p_dot_ap;
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
            if let Some(pc) = pc {
                pc.apply(&r, &mut z)?;
            } else {
                z.clone_from(&r);
            }
            let rz_new = ip.dot(&r, &z);
            let beta = rz_new / rz;
            // Indefinite-preconditioner detection
            if beta < T::zero() {
                return Err(Error::Breakdown {
                    method: "cg",
                    quantity: "preconditioned inner product z^T r",
                    iterations: self.monitor.iterations(),
                });
            }
            for (pj, zj) in p.as_mut().iter_mut().zip(z.as_ref()) {
                *pj = *zj + beta * *pj;
            }
            rz = rz_new;
        }
    }
}
