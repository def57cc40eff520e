//! Algebraic multigrid preconditioner.
//!
//! `setup` builds a hierarchy of coarsened operators: a strength-of-connection
//! graph drives greedy aggregation, aggregates define a piecewise-constant
//! prolongation P, and each coarse operator is the Galerkin triple product
//! Pᵀ A P. `apply` runs one V-cycle: pre-smooth with Jacobi, restrict the
//! residual, recurse, prolongate the correction, post-smooth. The coarsest
//! system is solved with plain CG.

use crate::core::traits::{MatShape, MatrixGet};
use crate::error::Error;
use crate::preconditioner::Preconditioner;
use faer::Mat;
use faer::traits::ComplexField;
use num_traits::Float;

struct Level<T> {
    /// Operator on this (fine) level.
    a: Mat<T>,
    /// Prolongation from the next coarser level.
    p: Mat<T>,
    /// Restriction to the next coarser level (Pᵀ).
    r: Mat<T>,
    inv_diag: Vec<T>,
}

pub struct Amg<T> {
    levels: Vec<Level<T>>,
    coarse: Mat<T>,
    nu_pre: usize,
    nu_post: usize,
    max_levels: usize,
    threshold: T,
}

// Stop coarsening below this size; CG finishes the job.
const COARSE_LIMIT: usize = 10;

impl<T: Float + ComplexField> Amg<T> {
    /// New hierarchy configuration; `setup` builds the levels.
    pub fn new(max_levels: usize, threshold: T) -> Self {
        Self {
            levels: Vec::new(),
            coarse: Mat::zeros(0, 0),
            nu_pre: 1,
            nu_post: 1,
            max_levels,
            threshold,
        }
    }

    fn inv_diag(m: &Mat<T>) -> Vec<T> {
        let eps: T = num_traits::cast(1e-14).unwrap();
        (0..m.nrows())
            .map(|i| {
                let d = m[(i, i)];
                // A (near-)zero diagonal entry simply opts out of smoothing.
                if d.abs() < eps { T::zero() } else { T::one() / d }
            })
            .collect()
    }

    /// Strength of connection: S(i,j) = |A_ij| / sqrt(|A_ii| |A_jj|),
    /// thresholded.
    fn strength_matrix(a: &Mat<T>, threshold: T) -> Mat<T> {
        let n = a.nrows();
        let eps: T = num_traits::cast(1e-14).unwrap();
        let mut s = Mat::zeros(n, n);
        for i in 0..n {
            let aii = a[(i, i)].abs();
            for j in 0..n {
                if i == j {
                    continue;
                }
                let ajj = a[(j, j)].abs();
                if aii > eps && ajj > eps {
                    let strength = a[(i, j)].abs() / (aii * ajj).sqrt();
                    if strength > threshold {
                        s[(i, j)] = strength;
                    }
                }
            }
        }
        s
    }

    /// Pair each node with its strongest unaggregated neighbor.
    fn greedy_aggregation(s: &Mat<T>) -> Vec<usize> {
        let n = s.nrows();
        let mut aggregates = vec![usize::MAX; n];
        let mut next_id = 0;
        for i in 0..n {
            if aggregates[i] != usize::MAX {
                continue;
            }
            let mut max_strength = T::zero();
            let mut strongest = i;
            for j in 0..n {
                if i != j && aggregates[j] == usize::MAX && s[(i, j)] > max_strength {
                    max_strength = s[(i, j)];
                    strongest = j;
                }
            }
            aggregates[i] = next_id;
            if strongest != i {
                aggregates[strongest] = next_id;
            }
            next_id += 1;
        }
        aggregates
    }

    /// Piecewise-constant prolongation: P_ij = 1 iff node i is in aggregate j.
    fn prolongation(aggregates: &[usize]) -> Mat<T> {
        let n = aggregates.len();
        let coarse_n = aggregates.iter().max().map_or(0, |&m| m + 1);
        let mut p = Mat::zeros(n, coarse_n);
        for (i, &agg) in aggregates.iter().enumerate() {
            p[(i, agg)] = T::one();
        }
        p
    }

    /// Damped Jacobi sweeps, ω = 2/3 (plain Jacobi leaves the highest
    /// frequencies nearly untouched, which defeats the coarse-grid
    /// correction).
    fn smooth_jacobi(a: &Mat<T>, inv_diag: &[T], rhs: &[T], z: &mut [T], sweeps: usize) {
        let n = rhs.len();
        let omega: T = num_traits::cast(2.0 / 3.0).unwrap();
        let mut az = vec![T::zero(); n];
        for _ in 0..sweeps {
            for i in 0..n {
                let mut sum = T::zero();
                for j in 0..n {
                    sum = sum + a[(i, j)] * z[j];
                }
                az[i] = rhs[i] - sum;
            }
            for i in 0..n {
                z[i] = z[i] + omega * inv_diag[i] * az[i];
            }
        }
    }

    /// Unpreconditioned CG on the coarsest operator.
    fn coarse_solve(a: &Mat<T>, rhs: &[T], z: &mut [T]) {
        let n = rhs.len();
        let tol: T = num_traits::cast(1e-10).unwrap();
        let mut x = vec![T::zero(); n];
        let mut r = rhs.to_vec();
        let mut p = r.clone();
        let mut ap = vec![T::zero(); n];
        let mut rr = r.iter().fold(T::zero(), |acc, &v| acc + v * v);
        for _ in 0..n.max(1) {
            for i in 0..n {
                let mut sum = T::zero();
                for j in 0..n {
                    sum = sum + a[(i, j)] * p[j];
                }
                ap[i] = sum;
            }
            let denom = p.iter().zip(&ap).fold(T::zero(), |acc, (&pi, &api)| acc + pi * api);
            if denom == T::zero() {
                break;
            }
            let alpha = rr / denom;
            for i in 0..n {
                x[i] = x[i] + alpha * p[i];
                r[i] = r[i] - alpha * ap[i];
            }
            let rr_new = r.iter().fold(T::zero(), |acc, &v| acc + v * v);
            if rr_new.sqrt() < tol {
                break;
            }
            let beta = rr_new / rr;
            for i in 0..n {
                p[i] = r[i] + beta * p[i];
            }
            rr = rr_new;
        }
        z.copy_from_slice(&x);
    }

    fn v_cycle(&self, level: usize, rhs: &[T], z: &mut [T]) {
        if level == self.levels.len() {
            Self::coarse_solve(&self.coarse, rhs, z);
            return;
        }
        let lvl = &self.levels[level];
        let n = lvl.a.nrows();
        z.iter_mut().for_each(|zi| *zi = T::zero());
        Self::smooth_jacobi(&lvl.a, &lvl.inv_diag, rhs, z, self.nu_pre);

        // Fine residual, restricted
        let mut residual = vec![T::zero(); n];
        for i in 0..n {
            let mut sum = T::zero();
            for j in 0..n {
                sum = sum + lvl.a[(i, j)] * z[j];
            }
            residual[i] = rhs[i] - sum;
        }
        let nc = lvl.r.nrows();
        let mut coarse_rhs = vec![T::zero(); nc];
        for i in 0..nc {
            let mut sum = T::zero();
            for j in 0..n {
                sum = sum + lvl.r[(i, j)] * residual[j];
            }
            coarse_rhs[i] = sum;
        }

        let mut coarse_z = vec![T::zero(); nc];
        self.v_cycle(level + 1, &coarse_rhs, &mut coarse_z);

        // Prolongate the correction back up
        for i in 0..n {
            let mut sum = T::zero();
            for j in 0..nc {
                sum = sum + lvl.p[(i, j)] * coarse_z[j];
            }
            z[i] = z[i] + sum;
        }
        Self::smooth_jacobi(&lvl.a, &lvl.inv_diag, rhs, z, self.nu_post);
    }
}

impl<M, V, T> Preconditioner<M, V> for Amg<T>
where
    M: MatShape + MatrixGet<T>,
    V: AsRef<[T]> + AsMut<[T]>,
    T: Float + ComplexField,
{
    fn setup(&mut self, a: &M) -> Result<(), Error> {
        let n = a.nrows();
        if n == 0 {
            return Err(Error::Config("cannot build AMG hierarchy for an empty matrix"));
        }
        self.levels.clear();
        let mut current = Mat::from_fn(n, n, |i, j| a.get(i, j));
        for _ in 0..self.max_levels {
            if current.nrows() <= COARSE_LIMIT {
                break;
            }
            let s = Self::strength_matrix(&current, self.threshold);
            let aggregates = Self::greedy_aggregation(&s);
            let p = Self::prolongation(&aggregates);
            if p.ncols() >= current.nrows() {
                // Aggregation stalled; further levels would not coarsen.
                break;
            }
            let r = p.transpose().to_owned();
            let coarse = &r * &current * &p;
            let inv_diag = Self::inv_diag(&current);
            self.levels.push(Level {
                a: current,
                p,
                r,
                inv_diag,
            });
            current = coarse;
        }
        self.coarse = current;
        Ok(())
    }

    fn apply(&self, r: &V, z: &mut V) -> Result<(), Error> {
        self.v_cycle(0, r.as_ref(), z.as_mut());
        Ok(())
    }
}
