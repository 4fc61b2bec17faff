//! Seeded multi-run sweeps.
//!
//! ## Submodules
//!
//! - `builder` - SimulationBuilder for configuring a sweep
//! - `report` - SimulationMetrics and SimulationReport types

pub mod builder;
pub mod report;

pub use builder::{IterationControl, SimulationBuilder};
pub use report::{RunFailure, SimulationMetrics, SimulationReport};
