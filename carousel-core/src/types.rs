//! Core input types for a simulation run.
//!
//! - [`ProcessId`]: stable external label of a process
//! - [`ProcessSpec`]: `(id, arrival, burst)` triple supplied by the caller
//! - [`ProcessTable`]: collects specs and assigns sequential ids

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable external identifier of a process.
///
/// Ordering is natural rather than lexical: a trailing number is compared
/// numerically, so `P2` sorts before `P10`.
///
/// # Examples
///
/// ```
/// use carousel_core::ProcessId;
///
/// let mut ids = vec![ProcessId::from("P10"), ProcessId::from("P2"), ProcessId::from("P1")];
/// ids.sort();
/// assert_eq!(ids, vec![ProcessId::from("P1"), ProcessId::from("P2"), ProcessId::from("P10")]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(String);

impl ProcessId {
    /// Create an identifier from any label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Sequential label for the `n`-th created process (1-based): `P1`, `P2`, ...
    pub fn sequential(n: usize) -> Self {
        Self(format!("P{n}"))
    }

    /// The label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into a non-numeric prefix and an optional trailing number.
    fn natural_key(&self) -> (&str, Option<u64>) {
        let prefix_len = self
            .0
            .trim_end_matches(|c: char| c.is_ascii_digit())
            .len();
        let (prefix, digits) = self.0.split_at(prefix_len);
        (prefix, digits.parse().ok())
    }
}

impl Ord for ProcessId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.natural_key()
            .cmp(&other.natural_key())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for ProcessId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProcessId {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for ProcessId {
    fn from(label: String) -> Self {
        Self(label)
    }
}

/// Caller-supplied definition of one process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    /// Unique identifier within the run.
    pub id: ProcessId,
    /// Simulated time at which the process becomes eligible to run.
    pub arrival: u64,
    /// Total CPU time required. Must be positive.
    pub burst: u64,
}

impl ProcessSpec {
    /// Create a new process definition.
    pub fn new(id: impl Into<ProcessId>, arrival: u64, burst: u64) -> Self {
        Self {
            id: id.into(),
            arrival,
            burst,
        }
    }
}

/// Collects process definitions in creation order and labels them `P1`, `P2`, ...
///
/// # Examples
///
/// ```
/// use carousel_core::ProcessTable;
///
/// let mut table = ProcessTable::new();
/// table.add(0, 5);
/// table.add(2, 3);
///
/// let specs = table.into_specs();
/// assert_eq!(specs[1].id.as_str(), "P2");
/// assert_eq!(specs[1].arrival, 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProcessTable {
    specs: Vec<ProcessSpec>,
}

impl ProcessTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a process and return the id it was assigned.
    pub fn add(&mut self, arrival: u64, burst: u64) -> ProcessId {
        let id = ProcessId::sequential(self.specs.len() + 1);
        self.specs.push(ProcessSpec::new(id.clone(), arrival, burst));
        id
    }

    /// Number of processes collected so far.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns `true` if no process was added.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Forget every collected process.
    pub fn clear(&mut self) {
        self.specs.clear();
    }

    /// Borrow the collected definitions in creation order.
    pub fn specs(&self) -> &[ProcessSpec] {
        &self.specs
    }

    /// Consume the table, yielding the definitions in creation order.
    pub fn into_specs(self) -> Vec<ProcessSpec> {
        self.specs
    }
}
