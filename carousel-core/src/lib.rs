//! # carousel-core
//!
//! Core types for the carousel Round-Robin scheduling simulator.
//!
//! This crate holds the pieces the simulation engine is built from:
//!
//! - [`ProcessSpec`] / [`ProcessTable`]: caller-supplied process definitions
//!   with sequential `P1, P2, ...` labelling
//! - [`ProcessRecord`]: identity plus mutable run-time state of one process
//! - [`DispatchEvent`] / [`CompletedProcess`]: immutable values recorded in a trace
//! - [`RotationQueue`]: circular doubly-linked queue in an index arena
//! - [`SimulationError`]: input validation and run failures

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]

mod error;
mod process;
mod queue;
mod types;

// Error exports
pub use error::{SimulationError, SimulationResult};

// Process exports
pub use process::{CompletedProcess, DispatchEvent, ProcessRecord};

// Rotation queue exports
pub use queue::{Iter, NodeHandle, RotationQueue};

// Input type exports
pub use types::{ProcessId, ProcessSpec, ProcessTable};
