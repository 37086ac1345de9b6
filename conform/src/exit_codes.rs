//! Stable exit codes for the `conform` CLI.

/// Every execution passed (skipped cases do not count against the run).
pub const OK: i32 = 0;
/// Invalid configuration: missing case directory, missing binary, bad pattern, etc.
/// Reported before any case executes.
pub const CONFIG_ERROR: i32 = 1;
/// Largest exit status that survives intact on every supported platform.
/// Failure counts above this saturate instead of wrapping modulo 256.
pub const MAX_FAILURES: i32 = 255;

/// Map a `fail + timeout` count onto a process exit status.
pub fn from_failure_count(count: usize) -> i32 {
    i32::try_from(count).map_or(MAX_FAILURES, |count| count.min(MAX_FAILURES))
}
