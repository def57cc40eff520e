//! High-level solve facade.

pub mod solver_context;
pub use solver_context::{SolverContext, SolverKind};
