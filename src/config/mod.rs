//! Solver and monitor configuration.

pub mod options;
pub use options::MonitorOptions;
