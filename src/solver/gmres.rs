//! Restarted GMRES (Saad §6.5) with left preconditioning.
//!
//! Builds an Arnoldi basis of the preconditioned operator by modified
//! Gram-Schmidt with one refinement pass, and reduces the Hessenberg matrix
//! with Givens rotations as it grows. Inside a cycle the monitor sees the
//! rotation-updated proxy `|g[j+1]|`, which equals the preconditioned
//! residual norm in exact arithmetic; each restart recomputes the true
//! residual from scratch, so the proxy cannot drift across cycles.

use crate::config::MonitorOptions;
use crate::core::traits::{InnerProduct, MatVec};
use crate::error::Error;
use crate::monitor::{Indicator, IterationMonitor, SolveStats};
use crate::preconditioner::Preconditioner;
use crate::solver::IterativeSolver;
use num_traits::Float;

pub struct GmresSolver<T> {
    pub monitor: IterationMonitor<T>,
    /// Arnoldi basis size per cycle.
    pub restart: usize,
}

impl<T: Float> GmresSolver<T> {
    pub fn new(opts: MonitorOptions<T>, restart: usize) -> Self {
        Self {
            monitor: IterationMonitor::new(opts),
            restart,
        }
    }
}

impl<M, V, T> IterativeSolver<M, V> for GmresSolver<T>
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
        if self.restart == 0 {
            return Err(Error::Config("gmres restart must be at least 1"));
        }
        self.monitor.reset();
        let n = b.as_ref().len();
        let m = self.restart;
        let ip = ();
        let tiny = T::epsilon();

        let mut xk = x.as_ref().to_vec();
        let mut first_cycle = true;

        loop {
            // Preconditioned residual for this cycle
            let mut z = {
                let xv = V::from(xk.clone());
                let mut tmp = V::from(vec![T::zero(); n]);
                a.matvec(&xv, &mut tmp);
                let rv = b
                    .as_ref()
                    .iter()
                    .zip(tmp.as_ref())
                    .map(|(&bi, &axi)| bi - axi)
                    .collect::<Vec<_>>();
                V::from(rv)
            };
            if let Some(pc) = pc {
                let r = z.clone();
                pc.apply(&r, &mut z)?;
            }
            let beta = ip.norm(&z);

            if first_cycle {
                first_cycle = false;
                if let Indicator::Converged = self.monitor.check(beta)? {
                    *x = V::from(xk);
                    return Ok(self.monitor.stats(beta));
                }
            } else if self.monitor.met(beta) {
                *x = V::from(xk);
                return Ok(self.monitor.stats(beta));
            }
            if beta < tiny {
                // Stagnated below machine precision without meeting the
                // tolerances; a restart cannot make progress from here.
                return Err(Error::Breakdown {
                    method: "gmres",
                    quantity: "restart residual norm",
                    iterations: self.monitor.iterations(),
                });
            }

            let mut basis: Vec<V> = Vec::with_capacity(m + 1);
            {
                let v0 = z
                    .as_ref()
                    .iter()
                    .map(|&zj| zj / beta)
                    .collect::<Vec<_>>();
                basis.push(V::from(v0));
            }
            let mut h = vec![vec![T::zero(); m]; m + 1];
            let mut cs = vec![T::zero(); m];
            let mut sn = vec![T::zero(); m];
            let mut g = vec![T::zero(); m + 1];
            g[0] = beta;

            let mut k = 0;
            let mut converged = false;
            let mut final_res = beta;

            for j in 0..m {
                // w = M⁻¹ A v_j
                let mut w = V::from(vec![T::zero(); n]);
                a.matvec(&basis[j], &mut w);
                if let Some(pc) = pc {
                    let aw = w.clone();
                    pc.apply(&aw, &mut w)?;
                }

                // Modified Gram-Schmidt with one refinement sweep
                for i in 0..=j {
                    let hij = ip.dot(&basis[i], &w);
                    h[i][j] = hij;
                    for (wl, vl) in w.as_mut().iter_mut().zip(basis[i].as_ref()) {
                        *wl = *wl - hij * *vl;
                    }
                }
                for i in 0..=j {
                    let corr = ip.dot(&basis[i], &w);
                    h[i][j] = h[i][j] + corr;
                    for (wl, vl) in w.as_mut().iter_mut().zip(basis[i].as_ref()) {
                        *wl = *wl - corr * *vl;
                    }
                }
                let h_sub = ip.norm(&w);
                h[j + 1][j] = h_sub;
                let happy = h_sub < tiny;
                if !happy {
                    let vnext = w
                        .as_ref()
                        .iter()
                        .map(|&wl| wl / h_sub)
                        .collect::<Vec<_>>();
                    basis.push(V::from(vnext));
                }

                // Fold the new column through the accumulated rotations
                for i in 0..j {
                    let hi = h[i][j];
                    let hi1 = h[i + 1][j];
                    h[i][j] = cs[i] * hi + sn[i] * hi1;
                    h[i + 1][j] = -sn[i] * hi + cs[i] * hi1;
                }
                let denom = (h[j][j] * h[j][j] + h[j + 1][j] * h[j + 1][j]).sqrt();
                if denom < tiny {
                    return Err(Error::Breakdown {
                        method: "gmres",
                        quantity: "givens rotation denominator",
                        iterations: self.monitor.iterations(),
                    });
                }
                cs[j] = h[j][j] / denom;
                sn[j] = h[j + 1][j] / denom;
                h[j][j] = denom;
                h[j + 1][j] = T::zero();
                let gj = g[j];
                g[j] = cs[j] * gj;
                g[j + 1] = -sn[j] * gj;

                k = j + 1;
                final_res = g[j + 1].abs();
                if let Indicator::Converged = self.monitor.check(final_res)? {
                    converged = true;
                    break;
                }
                if happy {
                    break;
                }
            }

            // y = H⁻¹ g by back substitution, then x += V y
            let mut y = vec![T::zero(); k];
            for i in (0..k).rev() {
                let mut sum = g[i];
                for jj in (i + 1)..k {
                    sum = sum - h[i][jj] * y[jj];
                }
                if h[i][i].abs() < tiny {
                    return Err(Error::Breakdown {
                        method: "gmres",
                        quantity: "hessenberg diagonal",
                        iterations: self.monitor.iterations(),
                    });
                }
                y[i] = sum / h[i][i];
            }
            for (i, yi) in y.iter().enumerate() {
                for (xj, vj) in xk.iter_mut().zip(basis[i].as_ref()) {
                    *xj = *xj + *yi * *vj;
                }
            }

            if converged {
                *x = V::from(xk);
                return Ok(self.monitor.stats(final_res));
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
    fn gmres_solves_nonsym_in_one_cycle() {
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
        let mut x = vec![0.0; 4];
        let mut solver = GmresSolver::new(opts(1e-12, 100), 4);
        let stats = solver.solve(&a, None, &b, &mut x).unwrap();
        for (xi, ei) in x.iter().zip(x_true.iter()) {
            assert!((xi - ei).abs() < 1e-8, "xi = {}, expected = {}", xi, ei);
        }
        assert!(stats.converged);
        assert!(stats.iterations <= 4);
    }

    #[test]
    fn gmres_converges_across_restarts() {
        // Restart shorter than the problem dimension forces several cycles.
        let a = mat![
            [10.0, 2.0, 0.0, 1.0, 0.0, 0.0],
            [3.0, 15.0, 4.0, 0.0, 0.0, 0.0],
            [0.0, -2.0, 8.0, 1.0, 0.0, 0.0],
            [1.0, 0.0, 1.0, 7.0, 3.0, 0.0],
            [0.0, 0.0, 0.0, 2.0, 12.0, 1.0],
            [0.0, 0.0, 0.0, 0.0, 1.0, 9.0]
        ];
        let x_true = vec![1.0, -2.0, 3.0, -4.0, 5.0, -6.0];
        let b = {
            let mut b = vec![0.0; 6];
            a.matvec(&x_true, &mut b);
            b
        };
        let mut x = vec![0.0; 6];
        let mut solver = GmresSolver::new(opts(1e-10, 500), 2);
        let stats = solver.solve(&a, None, &b, &mut x).unwrap();
        for (xi, ei) in x.iter().zip(x_true.iter()) {
            assert!((xi - ei).abs() < 1e-6, "xi = {}, expected = {}", xi, ei);
        }
        assert!(stats.converged);
    }

    #[test]
    fn gmres_with_jacobi() {
        let a = mat![
            [10.0, 2.0, 0.0],
            [3.0, 15.0, 4.0],
            [0.0, -2.0, 8.0]
        ];
        let x_true = vec![1.0, -1.0, 2.0];
        let b = {
            let mut b = vec![0.0; 3];
            a.matvec(&x_true, &mut b);
            b
        };
        let mut pc = Jacobi::new();
        Preconditioner::<faer::Mat<f64>, Vec<f64>>::setup(&mut pc, &a).unwrap();
        let mut x = vec![0.0; 3];
        let mut solver = GmresSolver::new(opts(1e-10, 100), 3);
        let stats = solver.solve(&a, Some(&pc), &b, &mut x).unwrap();
        for (xi, ei) in x.iter().zip(x_true.iter()) {
            assert!((xi - ei).abs() < 1e-7);
        }
        assert!(stats.converged);
    }

    #[test]
    fn gmres_zero_restart_rejected() {
        let a = mat![[1.0, 0.0], [0.0, 1.0]];
        let b = vec![1.0, 1.0];
        let mut x = vec![0.0, 0.0];
        let mut solver = GmresSolver::new(opts(1e-10, 10), 0);
        match solver.solve(&a, None, &b, &mut x) {
            Err(Error::Config(_)) => {}
            other => panic!("expected config error, got {other:?}"),
        }
    }
}
