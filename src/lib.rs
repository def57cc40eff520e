//! iterlin: generic iterative solvers for `A x = b`.
//!
//! A family of Krylov-subspace and relaxation methods (CG, BiCG, CGS, QMR,
//! GMRES, Chebyshev, iterative refinement) built on a small set of
//! collaborator traits for matrices and vectors, a pluggable preconditioner
//! abstraction (Jacobi, ILU(0), ILUT, AMG), and a shared iteration monitor
//! that governs every solver's termination.

pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod matrix;
pub mod monitor;
pub mod preconditioner;
pub mod solver;

// Re-exports for convenience
pub use config::*;
pub use context::*;
pub use self::core::*;
pub use error::*;
pub use matrix::*;
pub use monitor::*;
pub use preconditioner::*;
pub use solver::*;

// Re-export SolveStats at the crate root for convenience
pub use monitor::SolveStats;
