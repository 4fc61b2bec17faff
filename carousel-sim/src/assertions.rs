//! Coverage assertions tracked across seeded runs.
//!
//! `sometimes_assert!` records whether a condition held on a run without
//! failing it. After a sweep, a condition that was checked but never held
//! means the generated workloads never reached that scheduling situation.

use std::cell::RefCell;
use std::collections::HashMap;

/// Check and success counts of one named assertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssertionStats {
    /// Times the assertion was evaluated.
    pub total_checks: usize,
    /// Times the condition held.
    pub successes: usize,
}

impl AssertionStats {
    /// Create empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Percentage of checks where the condition held.
    pub fn success_rate(&self) -> f64 {
        if self.total_checks == 0 {
            0.0
        } else {
            (self.successes as f64 / self.total_checks as f64) * 100.0
        }
    }

    /// Record one evaluation.
    pub fn record(&mut self, success: bool) {
        self.total_checks += 1;
        if success {
            self.successes += 1;
        }
    }
}

thread_local! {
    static ASSERTION_RESULTS: RefCell<HashMap<String, AssertionStats>> = RefCell::new(HashMap::new());
}

/// Record one evaluation of the assertion `name` on this thread.
pub fn record_assertion(name: &str, success: bool) {
    ASSERTION_RESULTS.with(|results| {
        let mut results = results.borrow_mut();
        let stats = results.entry(name.to_string()).or_default();
        stats.record(success);
    });
}

/// Snapshot of this thread's assertion results.
pub fn get_assertion_results() -> HashMap<String, AssertionStats> {
    ASSERTION_RESULTS.with(|results| results.borrow().clone())
}

/// Forget this thread's assertion results.
pub fn reset_assertion_results() {
    ASSERTION_RESULTS.with(|results| {
        results.borrow_mut().clear();
    });
}

/// Describe every assertion that was evaluated but never held.
pub fn validate_assertion_contracts() -> Vec<String> {
    let results = get_assertion_results();
    let mut violations: Vec<String> = results
        .iter()
        .filter(|(_, stats)| stats.total_checks > 0 && stats.successes == 0)
        .map(|(name, stats)| {
            format!(
                "sometimes_assert!('{}') never held in {} checks",
                name, stats.total_checks
            )
        })
        .collect();
    violations.sort();
    violations
}

/// Record whether `$condition` held, without failing the run.
#[macro_export]
macro_rules! sometimes_assert {
    ($name:ident, $condition:expr, $message:expr) => {
        let result = $condition;
        $crate::assertions::record_assertion(stringify!($name), result);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_record() {
        let mut stats = AssertionStats::new();
        assert_eq!(stats.success_rate(), 0.0);

        stats.record(true);
        stats.record(false);
        assert_eq!(stats.total_checks, 2);
        assert_eq!(stats.successes, 1);
        assert_eq!(stats.success_rate(), 50.0);
    }

    #[test]
    fn test_never_held_is_reported() {
        reset_assertion_results();

        sometimes_assert!(reached, true, "reached");
        sometimes_assert!(unreached, false, "unreached");
        sometimes_assert!(unreached, 1 + 1 == 3, "unreached");

        let results = get_assertion_results();
        assert_eq!(results["reached"].successes, 1);
        assert_eq!(results["unreached"].total_checks, 2);

        let violations = validate_assertion_contracts();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("unreached"));

        reset_assertion_results();
        assert!(get_assertion_results().is_empty());
    }
}
