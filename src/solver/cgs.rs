//! Conjugate Gradient Squared (Saad §7.2) for nonsymmetric systems.
//!
//! Squares the BiCG residual polynomial, which avoids any product with `Aᵀ`
//! at the price of a rougher convergence curve. Breakdown guards cover the
//! shadow inner product ρ and the step denominator σ; both vanish only when
//! the recurrence itself has failed, so they surface as breakdowns rather
//! than NaN.
//!
//! Monitors the recursively updated residual norm.

use crate::config::MonitorOptions;
use crate::core::traits::{InnerProduct, MatVec};
use crate::error::Error;
use crate::monitor::{Indicator, IterationMonitor, SolveStats};
use crate::preconditioner::Preconditioner;
use crate::solver::IterativeSolver;
use num_traits::Float;

pub struct CgsSolver<T> {
    pub monitor: IterationMonitor<T>,
}

impl<T: Float> CgsSolver<T> {
    pub fn new(opts: MonitorOptions<T>) -> Self {
        Self {
            monitor: IterationMonitor::new(opts),
        }
    }
}

impl<M, V, T> IterativeSolver<M, V> for CgsSolver<T>
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
        let r_tld = r.clone(); // shadow residual, fixed for the whole solve
        let mut p = V::from(vec![T::zero(); n]);
        let mut q = V::from(vec![T::zero(); n]);
        let mut u = V::from(vec![T::zero(); n]);
        let mut rho_prev = T::zero();
        let mut first = true;

        loop {
            let rho = ip.dot(&r_tld, &r);
            if rho.abs() < T::epsilon() {
                return Err(Error::Breakdown {
                    method: "cgs",
                    quantity: "shadow inner product rho",
                    iterations: self.monitor.iterations(),
                });
            }
            if first {
                u.clone_from(&r);
                p.clone_from(&u);
                first = false;
            } else {
                let beta = rho / rho_prev;
                // u = r + beta q
                for (uj, (rj, qj)) in u
                    .as_mut()
                    .iter_mut()
                    .zip(r.as_ref().iter().zip(q.as_ref()))
                {
                    *uj = *rj + beta * *qj;
                }
                // p = u + beta (q + beta p)
                for ((pj, uj), qj) in p
                    .as_mut()
                    .iter_mut()
                    .zip(u.as_ref())
                    .zip(q.as_ref())
                {
                    *pj = *uj + beta * (*qj + beta * *pj);
                }
            }

            // v̂ = A M⁻¹ p
            let mut p_hat = V::from(vec![T::zero(); n]);
            if let Some(pc) = pc {
                pc.apply(&p, &mut p_hat)?;
            } else {
                p_hat.clone_from(&p);
            }
            let mut v_hat = V::from(vec![T::zero(); n]);
            a.matvec(&p_hat, &mut v_hat);

            let sigma = ip.dot(&r_tld, &v_hat);
            if sigma.abs() < T::epsilon() {
                return Err(Error::Breakdown {
                    method: "cgs",
                    quantity: "step denominator r~^T v^",
                    iterations: self.monitor.iterations(),
                });
            }
            let alpha = rho / sigma;
            // q = u - alpha v̂
            for (qj, (uj, vj)) in q
                .as_mut()
                .iter_mut()
                .zip(u.as_ref().iter().zip(v_hat.as_ref()))
            {
                *qj = *uj - alpha * *vj;
            }
            // û = M⁻¹ (u + q)
            let upq = {
                let sum = u
                    .as_ref()
                    .iter()
                    .zip(q.as_ref())
                    .map(|(&uj, &qj)| uj + qj)
                    .collect::<Vec<_>>();
                V::from(sum)
            };
            let mut u_hat = V::from(vec![T::zero(); n]);
            if let Some(pc) = pc {
                pc.apply(&upq, &mut u_hat)?;
            } else {
                u_hat.clone_from(&upq);
            }

            for (xj, uj) in xk.iter_mut().zip(u_hat.as_ref()) {
                *xj = *xj + alpha * *uj;
            }
            let mut q_hat = V::from(vec![T::zero(); n]);
            a.matvec(&u_hat, &mut q_hat);
            for (rj, qj) in r.as_mut().iter_mut().zip(q_hat.as_ref()) {
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
