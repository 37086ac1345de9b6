//! Diagnostics for the runner itself, on stderr.
//!
//! Stdout belongs to the suite: the `running <case> (<variant>)` progress
//! lines and the final report (see `suite` and `render`). Everything here is
//! controlled by `RUST_LOG` and never changes what a run prints or returns.
//!
//! Useful spans:
//!
//! - `run_suite`: one per run, closes with the totals.
//! - `execute{case, variant}`: one per (case, variant) pair.
//! - `run_with_deadline{timeout_secs}`: spawn, wait and the kill on timeout.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "warn";

/// Install the stderr subscriber. Falls back to `warn` if `RUST_LOG` is unset
/// or unparsable, which still shows timeouts and spawn failures.
///
/// ```bash
/// # Per-execution spawn/exit detail:
/// RUST_LOG=conform::io::process=debug conform run --preset jit
/// # Only the runs that hit the deadline:
/// RUST_LOG='conform[execute]=warn' conform run
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}
