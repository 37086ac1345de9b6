//! Side-effecting helpers: config files, case discovery, process execution.

pub mod config;
pub mod discover;
pub mod process;
