//! Metrics collection
//!
//! Thin wrappers over the `metrics` facade so metric names live in one place.
//! Nothing is exported unless the binary installs a recorder; without one
//! every call here is a no-op.

use metrics::{counter, histogram};
use std::time::Duration;

/// Counter of movie lookups, labelled by outcome
pub const LOOKUPS_TOTAL: &str = "movie_tracker_lookups_total";
/// Histogram of lookup latency in seconds
pub const LOOKUP_DURATION: &str = "movie_tracker_lookup_duration_seconds";
/// Counter of store mutations, labelled by operation and outcome
pub const STORE_OPERATIONS_TOTAL: &str = "movie_tracker_store_operations_total";
/// Counter of login attempts, labelled by outcome
pub const LOGINS_TOTAL: &str = "movie_tracker_logins_total";

/// Record the outcome and latency of one lookup
pub fn record_lookup(outcome: &'static str, duration: Duration) {
    counter!(LOOKUPS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(LOOKUP_DURATION).record(duration.as_secs_f64());
}

/// Record one store mutation
pub fn record_store_operation(operation: &'static str, outcome: &'static str) {
    counter!(STORE_OPERATIONS_TOTAL, "operation" => operation, "outcome" => outcome).increment(1);
}

/// Record one login attempt
pub fn record_login(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!(LOGINS_TOTAL, "outcome" => outcome).increment(1);
}
