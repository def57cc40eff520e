//! Quasi-Minimal Residual method (Saad §7.3, Templates §2.3.3).
//!
//! Bi-Lanczos recurrence without look-ahead, so every scalar the coupled
//! recurrences divide by (ρ, ξ, δ, ε, β, γ) is guarded; any of them
//! vanishing ends the solve as a breakdown. Left preconditioning only; the
//! preconditioner must offer `apply_transpose` for the dual sequence.
//!
//! Monitors the recursively updated residual norm.

use crate::config::MonitorOptions;
use crate::core::traits::{InnerProduct, MatTransVec, MatVec};
use crate::error::Error;
use crate::monitor::{Indicator, IterationMonitor, SolveStats};
use crate::preconditioner::Preconditioner;
use crate::solver::IterativeSolver;
use num_traits::Float;

pub struct QmrSolver<T> {
    pub monitor: IterationMonitor<T>,
}

impl<T: Float> QmrSolver<T> {
    pub fn new(opts: MonitorOptions<T>) -> Self {
        Self {
            monitor: IterationMonitor::new(opts),
        }
    }
}

impl<T: Float> QmrSolver<T> {
    fn breakdown(&self, quantity: &'static str) -> Error {
        Error::Breakdown {
            method: "qmr",
            quantity,
            iterations: self.monitor.iterations(),
        }
    }
}

impl<M, V, T> IterativeSolver<M, V> for QmrSolver<T>
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
        let tiny = T::epsilon();

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

        // Lanczos starting vectors
        let mut v_tld = r.clone();
        let mut y = V::from(vec![T::zero(); n]);
        if let Some(pc) = pc {
            pc.apply(&v_tld, &mut y)?;
        } else {
            y.clone_from(&v_tld);
        }
        let mut rho = ip.norm(&y);

        let mut w_tld = r.clone();
        let mut z = w_tld.clone();
        let mut xi = ip.norm(&z);

        let mut gamma = T::one();
        let mut eta = -T::one();
        let mut theta = T::zero();
        let mut ep = T::one();

        let mut v = V::from(vec![T::zero(); n]);
        let mut w = V::from(vec![T::zero(); n]);
        let mut p = V::from(vec![T::zero(); n]);
        let mut q = V::from(vec![T::zero(); n]);
        let mut d = V::from(vec![T::zero(); n]);
        let mut s = V::from(vec![T::zero(); n]);
        let mut first = true;

        loop {
            if rho.abs() < tiny {
                return Err(self.breakdown("lanczos scale rho"));
            }
            if xi.abs() < tiny {
                return Err(self.breakdown("dual lanczos scale xi"));
            }

            for (vj, vt) in v.as_mut().iter_mut().zip(v_tld.as_ref()) {
                *vj = *vt / rho;
            }
            for yj in y.as_mut().iter_mut() {
                *yj = *yj / rho;
            }
            for (wj, wt) in w.as_mut().iter_mut().zip(w_tld.as_ref()) {
                *wj = *wt / xi;
            }
            for zj in z.as_mut().iter_mut() {
                *zj = *zj / xi;
            }

            let delta = ip.dot(&z, &y);
            if delta.abs() < tiny {
                return Err(self.breakdown("biorthogonality coefficient delta"));
            }

            // Dual preconditioner sweep
            let y_tld = y.clone();
            let mut z_tld = V::from(vec![T::zero(); n]);
            if let Some(pc) = pc {
                pc.apply_transpose(&z, &mut z_tld)?;
            } else {
                z_tld.clone_from(&z);
            }

            if first {
                p.clone_from(&y_tld);
                q.clone_from(&z_tld);
            } else {
                let pc_coeff = xi * delta / ep;
                let qc_coeff = rho * delta / ep;
                for (pj, yj) in p.as_mut().iter_mut().zip(y_tld.as_ref()) {
                    *pj = *yj - pc_coeff * *pj;
                }
                for (qj, zj) in q.as_mut().iter_mut().zip(z_tld.as_ref()) {
                    *qj = *zj - qc_coeff * *qj;
                }
            }

            let mut p_tld = V::from(vec![T::zero(); n]);
            a.matvec(&p, &mut p_tld);

            ep = ip.dot(&q, &p_tld);
            if ep.abs() < tiny {
                return Err(self.breakdown("pivot epsilon"));
            }
            let beta = ep / delta;
            if beta.abs() < tiny {
                return Err(self.breakdown("recurrence coefficient beta"));
            }

            for ((vt, pt), vj) in v_tld
                .as_mut()
                .iter_mut()
                .zip(p_tld.as_ref())
                .zip(v.as_ref())
            {
                *vt = *pt - beta * *vj;
            }
            if let Some(pc) = pc {
                pc.apply(&v_tld, &mut y)?;
            } else {
                y.clone_from(&v_tld);
            }
            let rho_prev = rho;
            rho = ip.norm(&y);

            let mut atq = V::from(vec![T::zero(); n]);
            a.mattransvec(&q, &mut atq);
            for ((wt, aq), wj) in w_tld
                .as_mut()
                .iter_mut()
                .zip(atq.as_ref())
                .zip(w.as_ref())
            {
                *wt = *aq - beta * *wj;
            }
            z.clone_from(&w_tld);
            xi = ip.norm(&z);

            let theta_prev = theta;
            let gamma_prev = gamma;
            theta = rho / (gamma_prev * beta);
            gamma = T::one() / (T::one() + theta * theta).sqrt();
            if gamma.abs() < tiny {
                return Err(self.breakdown("quasi-minimization weight gamma"));
            }
            eta = -eta * rho_prev * gamma * gamma / (beta * gamma_prev * gamma_prev);

            if first {
                for (dj, pj) in d.as_mut().iter_mut().zip(p.as_ref()) {
                    *dj = eta * *pj;
                }
                for (sj, pj) in s.as_mut().iter_mut().zip(p_tld.as_ref()) {
                    *sj = eta * *pj;
                }
                first = false;
            } else {
                let carry = (theta_prev * gamma) * (theta_prev * gamma);
                for (dj, pj) in d.as_mut().iter_mut().zip(p.as_ref()) {
                    *dj = eta * *pj + carry * *dj;
                }
                for (sj, pj) in s.as_mut().iter_mut().zip(p_tld.as_ref()) {
                    *sj = eta * *pj + carry * *sj;
                }
            }

            for (xj, dj) in xk.iter_mut().zip(d.as_ref()) {
                *xj = *xj + *dj;
            }
            for (rj, sj) in r.as_mut().iter_mut().zip(s.as_ref()) {
                *rj = *rj - *sj;
            }

            res_norm = ip.norm(&r);
            if let Indicator::Converged = self.monitor.check(res_norm)? {
                *x = V::from(xk);
                return Ok(self.monitor.stats(res_norm));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preconditioner::Jacobi;
    use faer::mat;

    fn opts(rtol: f64, max_iters: usize) -> MonitorOptions<f64> {
        MonitorOptions {
            rtol,
            max_iters,
            ..MonitorOptions::default()
        }
    }

    #[test]
    fn qmr_solves_small_nonsym() {
        // [2 1; 0 3] x = [3; 6] => x = [1; 2]
        let a = mat![[2.0, 1.0], [0.0, 3.0]];
        let b = vec![3.0, 6.0];
        let mut x = vec![0.0, 0.0];
        let mut solver = QmrSolver::new(opts(1e-10, 50));
        let stats = solver.solve(&a, None, &b, &mut x).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-6);
        assert!((x[1] - 2.0).abs() < 1e-6);
        assert!(stats.converged);
    }

    #[test]
    fn qmr_solves_nonsym_with_jacobi() {
        let a = mat![
            [4.0, 1.0, 0.0, 0.0],
            [2.0, 5.0, 1.0, 0.0],
            [0.0, 1.0, 3.0, 1.0],
            [0.0, 0.0, 2.0, 4.0]
        ];
        let x_true = vec![1.0, 2.0, 3.0, 4.0];
        let b = {
            let mut b = vec![0.0; 4];
            a.matvec(&x_true, &mut b);
            b
        };
        let mut pc = Jacobi::new();
        Preconditioner::<faer::Mat<f64>, Vec<f64>>::setup(&mut pc, &a).unwrap();
        let mut x = vec![0.0; 4];
        let mut solver = QmrSolver::new(opts(1e-10, 100));
        let stats = solver.solve(&a, Some(&pc), &b, &mut x).unwrap();
        for (xi, ei) in x.iter().zip(x_true.iter()) {
            assert!((xi - ei).abs() < 1e-6, "xi = {}, expected = {}", xi, ei);
        }
        assert!(stats.converged);
    }
}
