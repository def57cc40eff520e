use thiserror::Error;

// Unified error type for iterlin

/// Why a solve stopped without producing a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Residual grew past `dtol` times the initial residual.
    Divergence,
    /// Iteration limit reached before the tolerance was met.
    Iterations,
    /// Residual norm became NaN.
    DivergenceNan,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "shape mismatch: matrix is {rows}x{cols}, rhs has length {rhs}, guess has length {guess}"
    )]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        rhs: usize,
        guess: usize,
    },
    #[error("did not converge ({reason:?}) after {iterations} iterations, last residual {residual:e}")]
    NotConverged {
        reason: StopReason,
        iterations: usize,
        residual: f64,
    },
    /// A method-internal denominator vanished. Divergence-class: the solve is
    /// abandoned, never retried with a different method.
    #[error("breakdown in {method}: {quantity} vanished after {iterations} iterations")]
    Breakdown {
        method: &'static str,
        quantity: &'static str,
        iterations: usize,
    },
    #[error("zero pivot at row {0}")]
    ZeroPivot(usize),
    #[error("zero diagonal entry at row {0}")]
    ZeroDiagonal(usize),
    #[error("invalid configuration: {0}")]
    Config(&'static str),
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}
