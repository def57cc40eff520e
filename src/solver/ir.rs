//! Iterative refinement: preconditioned Richardson iteration.
//!
//! Each sweep recomputes the true residual and applies one correction
//! `x ← x + M⁻¹(b − Ax)`. Converges when the preconditioner is a good
//! enough approximate inverse that `‖I − M⁻¹A‖ < 1`; with no
//! preconditioner it only converges for operators close to the identity.

use crate::config::MonitorOptions;
use crate::core::traits::{InnerProduct, MatVec};
use crate::error::Error;
use crate::monitor::{Indicator, IterationMonitor, SolveStats};
use crate::preconditioner::Preconditioner;
use crate::solver::IterativeSolver;
use num_traits::Float;

pub struct IrSolver<T> {
    pub monitor: IterationMonitor<T>,
}

impl<T: Float> IrSolver<T> {
    pub fn new(opts: MonitorOptions<T>) -> Self {
        Self {
            monitor: IterationMonitor::new(opts),
        }
    }
}

impl<M, V, T> IterativeSolver<M, V> for IrSolver<T>
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

        let mut xk = x.as_ref().to_vec();
        let mut r = V::from(vec![T::zero(); n]);
        let mut z = V::from(vec![T::zero(); n]);
        let mut tmp = V::from(vec![T::zero(); n]);

        loop {
            // True residual every sweep, never a recurrence
            let xv = V::from(xk.clone());
            a.matvec(&xv, &mut tmp);
            for (rj, (bj, tj)) in r
                .as_mut()
                .iter_mut()
                .zip(b.as_ref().iter().zip(tmp.as_ref()))
            {
                *rj = *bj - *tj;
            }
            let res_norm = ip.norm(&r);
            if let Indicator::Converged = self.monitor.check(res_norm)? {
                *x = V::from(xk);
                return Ok(self.monitor.stats(res_norm));
            }

            if let Some(pc) = pc {
                pc.apply(&r, &mut z)?;
            } else {
                z.clone_from(&r);
            }
            for (xj, zj) in xk.iter_mut().zip(z.as_ref()) {
                *xj = *xj + *zj;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preconditioner::{Ilu0, Jacobi};
    use faer::mat;

    fn opts(rtol: f64, max_iters: usize) -> MonitorOptions<f64> {
        MonitorOptions {
            rtol,
            max_iters,
            ..MonitorOptions::default()
        }
    }

    #[test]
    fn ir_with_jacobi_on_dominant_system() {
        let a = mat![
            [10.0, 1.0, 0.0],
            [2.0, 8.0, 1.0],
            [0.0, 1.0, 5.0]
        ];
        let x_true = vec![1.0, 2.0, 3.0];
        let b = {
            let mut b = vec![0.0; 3];
            a.matvec(&x_true, &mut b);
            b
        };
        let mut pc = Jacobi::new();
        Preconditioner::<faer::Mat<f64>, Vec<f64>>::setup(&mut pc, &a).unwrap();
        let mut x = vec![0.0; 3];
        let mut solver = IrSolver::new(opts(1e-10, 500));
        let stats = solver.solve(&a, Some(&pc), &b, &mut x).unwrap();
        for (xi, ei) in x.iter().zip(x_true.iter()) {
            assert!((xi - ei).abs() < 1e-7, "xi = {}, expected = {}", xi, ei);
        }
        assert!(stats.converged);
    }

    #[test]
    fn ir_with_exact_ilu_converges_in_few_sweeps() {
        // Full sparsity pattern makes ILU(0) an exact factorization, so a
        // single correction lands on the solution.
        let a = mat![[4.0, 1.0], [1.0, 3.0]];
        let b = vec![1.0, 2.0];
        let mut pc = Ilu0::new();
        Preconditioner::<faer::Mat<f64>, Vec<f64>>::setup(&mut pc, &a).unwrap();
        let mut x = vec![0.0, 0.0];
        let mut solver = IrSolver::new(opts(1e-12, 10));
        let stats = solver.solve(&a, Some(&pc), &b, &mut x).unwrap();
        assert!(stats.converged);
        assert!(stats.iterations <= 3);
        let expected = [0.09090909090909091, 0.6363636363636364];
        for (xi, ei) in x.iter().zip(expected.iter()) {
            assert!((xi - ei).abs() < 1e-9);
        }
    }

    #[test]
    fn ir_unpreconditioned_diverges_on_large_operator() {
        // ‖I − A‖ > 1, plain Richardson blows up and the monitor reports it.
        let a = mat![[10.0, 0.0], [0.0, 10.0]];
        let b = vec![1.0, 1.0];
        let mut x = vec![0.0, 0.0];
        let mut solver = IrSolver::new(opts(1e-10, 1000));
        match solver.solve(&a, None, &b, &mut x) {
            Err(Error::NotConverged { .. }) => {}
            other => panic!("expected divergence, got {other:?}"),
        }
    }
}
