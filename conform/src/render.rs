//! Final report rendering: human-readable text or JSON.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::report::{Bucket, Report, ReportSummary, lossy_paths};

/// Text report.
///
/// ```text
/// Skips:
///   examples/thread.lox
/// Failures:
///   examples/b.lox: [full]
/// Timeouts:
///   examples/c.lox: [young, full]
/// summary: cases=2 executions=4 pass=1 fail=1 timeout=2 skip=1
/// ```
///
/// A clean run prints `Success` in place of the failure sections.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    if !report.skipped.is_empty() {
        out.push_str("Skips:\n");
        for path in &report.skipped {
            let _ = writeln!(out, "  {}", path.display());
        }
    }
    if report.is_success() {
        out.push_str("Success\n");
    } else {
        write_buckets(&mut out, "Failures:", &report.failures());
        write_buckets(&mut out, "Timeouts:", &report.timeouts());
    }
    let summary = report.summary();
    let _ = writeln!(
        out,
        "summary: cases={} executions={} pass={} fail={} timeout={} skip={}",
        summary.cases,
        summary.executions,
        summary.pass,
        summary.fail,
        summary.timeout,
        summary.skip
    );
    out
}

fn write_buckets(out: &mut String, title: &str, buckets: &[Bucket<'_>]) {
    out.push_str(title);
    out.push('\n');
    if buckets.is_empty() {
        out.push_str("  (none)\n");
    }
    for bucket in buckets {
        let _ = writeln!(
            out,
            "  {}: [{}]",
            bucket.case.display(),
            bucket.variants.join(", ")
        );
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    variants: &'a [String],
    #[serde(serialize_with = "lossy_paths")]
    skipped: &'a [PathBuf],
    failures: Vec<Bucket<'a>>,
    timeouts: Vec<Bucket<'a>>,
    summary: ReportSummary,
    exit_code: i32,
}

/// Pretty-printed JSON with trailing newline.
pub fn render_json(report: &Report) -> Result<String> {
    let view = JsonReport {
        variants: &report.variants,
        skipped: &report.skipped,
        failures: report.failures(),
        timeouts: report.timeouts(),
        summary: report.summary(),
        exit_code: report.exit_code(),
    };
    let mut payload = serde_json::to_string_pretty(&view).context("serialize report json")?;
    payload.push('\n');
    Ok(payload)
}
