//! CLI command implementations.

use anyhow::Result;
use tracing::{debug, info};

use crate::io::config::{SuiteConfig, render_config};
use crate::io::process::{ProcessExecutor, resolve_binary};
use crate::render::{render_json, render_text};
use crate::suite::{RunOptions, SuitePlan, plan_cases, run_suite};

#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Run the suite and print the report. Returns the process exit code.
///
/// Configuration problems (bad config, missing case directory, missing
/// binary) are returned as `Err` before anything executes.
pub fn run_command(cfg: &SuiteConfig, output: OutputOptions) -> Result<i32> {
    let plan = SuitePlan::from_config(cfg)?;
    let binary = resolve_binary(&cfg.binary)?;
    debug!(configured = %cfg.binary.display(), "interpreter resolved");
    let mut executor = ProcessExecutor::new(binary, cfg.timeout());

    info!(
        root = %cfg.root.display(),
        binary = %executor.binary().display(),
        timeout_secs = executor.timeout().as_secs(),
        "starting run"
    );
    let options = RunOptions {
        // JSON output must stay machine-readable on stdout.
        quiet: output.quiet || output.json,
    };
    let report = run_suite(&plan, &mut executor, options)?;

    if output.json {
        print!("{}", render_json(&report)?);
    } else {
        print!("{}", render_text(&report));
    }
    Ok(report.exit_code())
}

/// Print discovered cases and the variants they would run under.
pub fn list_command(cfg: &SuiteConfig) -> Result<()> {
    let plan = SuitePlan::from_config(cfg)?;
    println!("variants: {}", plan.matrix.names().join(", "));
    for case in plan_cases(&plan)? {
        let marker = if case.skipped { "skip" } else { "run" };
        println!("{marker}\t{}", case.path.display());
    }
    Ok(())
}

/// Print the effective configuration as TOML.
pub fn config_command(cfg: &SuiteConfig) -> Result<()> {
    print!("{}", render_config(cfg)?);
    Ok(())
}
