//! Collaborator traits and their implementations for common types.

pub mod traits;
pub mod wrappers;

pub use traits::*;
