//! Conformance test runner for an interpreter binary.
//!
//! Discovers case files in a directory, runs each one through the interpreter
//! under every enabled variant (GC stress mode, JIT, ...) with a per-execution
//! deadline, and aggregates pass/fail/timeout/skip outcomes into a report
//! whose failure count becomes the process exit code.
//!
//! - **[`core`]**: Pure, deterministic logic (classification, variants, skip
//!   rules, aggregation). No I/O.
//! - **[`io`]**: Side-effecting operations (config files, directory listing,
//!   process execution).
//!
//! [`suite`] ties the two together; [`cli`] and [`render`] implement the
//! command-line surface.

pub mod cli;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod render;
pub mod suite;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
