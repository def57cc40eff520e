//! End-to-end tests of the [`SolverContext`] facade on a sparse fixture.
//!
//! The fixture is a 5×5 non-symmetric CSC matrix with zeros on the diagonal,
//! so it exercises the sparse matvec paths and the setup failure mode of
//! diagonal-based preconditioners, while GMRES solves it without help.

use faer::linalg::solvers::SolveCore;
use iterlin::config::MonitorOptions;
use iterlin::context::{SolverContext, SolverKind};
use iterlin::core::traits::MatrixGet;
use iterlin::error::Error;
use iterlin::matrix::CscMatrix;
use iterlin::preconditioner::{Jacobi, Preconditioner};

/// 5×5 fixture with `A x = b` solved by `x = [1, 2, 3, 4, 5]`:
///
/// ```text
///     [ 2  3  0  0  0 ]        [  8 ]
///     [ 3  0  4  0  6 ]        [ 45 ]
/// A = [ 0 -1 -3  2  0 ],  b =  [ -3 ]
///     [ 0  0  1  0  0 ]        [  3 ]
///     [ 0  4  2  0  1 ]        [ 19 ]
/// ```
fn fixture() -> (CscMatrix<f64>, Vec<f64>) {
    let a = CscMatrix::from_csc(
        5,
        5,
        vec![0, 2, 5, 9, 10, 12],
        vec![0, 1, 0, 2, 4, 1, 2, 3, 4, 2, 1, 4],
        vec![2.0, 3.0, 3.0, -1.0, 4.0, 4.0, -3.0, 1.0, 2.0, 2.0, 6.0, 1.0],
    )
    .unwrap();
    let b = vec![8.0, 45.0, -3.0, 3.0, 19.0];
    (a, b)
}

#[test]
fn fixture_layout_is_correct() {
    let (a, _) = fixture();
    assert_eq!(a.nnz(), 12);
    assert_eq!(a.get(0, 1), 3.0);
    assert_eq!(a.get(2, 1), -1.0);
    assert_eq!(a.get(1, 1), 0.0);
}

#[test]
fn gmres_matches_direct_solve_on_fixture() {
    let (a, b) = fixture();
    let opts = MonitorOptions {
        rtol: 1e-13,
        ..MonitorOptions::default()
    };
    let mut x = vec![0.0; 5];
    let stats = SolverContext::new(SolverKind::Gmres, &a)
        .with_options(opts)
        .with_restart(5)
        .solve(&b, &mut x)
        .unwrap();
    assert!(stats.converged);

    // Reference solution from faer's dense LU on the densified fixture
    let dense = a.to_dense();
    let mut x_direct = b.clone();
    let lus = faer::linalg::solvers::FullPivLu::new(dense.as_ref());
    let x_mat = faer::MatMut::from_column_major_slice_mut(&mut x_direct, 5, 1);
    lus.solve_in_place_with_conj(faer::Conj::No, x_mat);

    for (xi, di) in x.iter().zip(x_direct.iter()) {
        assert!((xi - di).abs() < 1e-9, "xi = {}, direct = {}", xi, di);
    }
    let expected = [1.0, 2.0, 3.0, 4.0, 5.0];
    for (xi, ei) in x.iter().zip(expected.iter()) {
        assert!((xi - ei).abs() < 1e-8);
    }
}

#[test]
fn bicg_solves_fixture_through_transpose_path() {
    let (a, b) = fixture();
    let opts = MonitorOptions {
        rtol: 1e-12,
        max_iters: 1000,
        ..MonitorOptions::default()
    };
    let mut x = vec![0.0; 5];
    let stats = SolverContext::new(SolverKind::BiCg, &a)
        .with_options(opts)
        .solve(&b, &mut x)
        .unwrap();
    assert!(stats.converged);
    let expected = [1.0, 2.0, 3.0, 4.0, 5.0];
    for (xi, ei) in x.iter().zip(expected.iter()) {
        assert!((xi - ei).abs() < 1e-7);
    }
}

#[test]
fn jacobi_setup_rejects_fixture_zero_diagonal() {
    let (a, _) = fixture();
    let mut pc = Jacobi::new();
    match Preconditioner::<CscMatrix<f64>, Vec<f64>>::setup(&mut pc, &a) {
        Err(Error::ZeroDiagonal(1)) => {}
        other => panic!("expected zero diagonal at row 1, got {other:?}"),
    }
}

#[test]
fn zero_rhs_converges_immediately_for_every_method() {
    let (a, _) = fixture();
    let b = vec![0.0; 5];
    let kinds = [
        SolverKind::Cg,
        SolverKind::BiCg,
        SolverKind::Cgs,
        SolverKind::Qmr,
        SolverKind::Gmres,
        SolverKind::Chebyshev,
        SolverKind::Ir,
    ];
    for kind in kinds {
        let mut x = vec![0.0; 5];
        let stats = SolverContext::new(kind, &a)
            .with_spectral_bounds(0.5, 2.0)
            .solve(&b, &mut x)
            .unwrap_or_else(|e| panic!("{kind:?} failed on zero rhs: {e}"));
        assert_eq!(stats.iterations, 0, "{kind:?} iterated on a zero rhs");
        assert_eq!(x, vec![0.0; 5], "{kind:?} moved the zero guess");
    }
}

#[test]
fn shape_mismatch_is_rejected_before_iterating() {
    let (a, _) = fixture();
    let b = vec![1.0; 4];
    let mut x = vec![0.0; 5];
    match SolverContext::<_, _, f64>::new(SolverKind::Gmres, &a).solve(&b, &mut x) {
        Err(Error::ShapeMismatch {
            rows: 5,
            cols: 5,
            rhs: 4,
            guess: 5,
        }) => {}
        other => panic!("expected shape mismatch, got {other:?}"),
    }
    assert_eq!(x, vec![0.0; 5]);
}
