//! Result aggregation.
//!
//! A [`Report`] is owned by the orchestration loop and fed one outcome at a
//! time, in case/variant order. Nothing else writes to it.

use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};

use crate::core::outcome::Outcome;
use crate::exit_codes;

/// Outcome of one variant for one case.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VariantResult {
    pub variant: String,
    pub outcome: Outcome,
}

/// All executed variants for one case, in matrix order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CaseReport {
    #[serde(serialize_with = "lossy_path")]
    pub path: PathBuf,
    pub results: Vec<VariantResult>,
}

impl CaseReport {
    fn variants_with(&self, outcome: Outcome) -> Vec<&str> {
        self.results
            .iter()
            .filter(|result| result.outcome == outcome)
            .map(|result| result.variant.as_str())
            .collect()
    }
}

/// Variants of a single case that ended in the same non-pass outcome.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Bucket<'a> {
    #[serde(serialize_with = "lossy_path")]
    pub case: &'a Path,
    pub variants: Vec<&'a str>,
}

/// Case paths are reported as text; bytes that aren't UTF-8 become U+FFFD.
pub(crate) fn lossy_path<P, S>(path: &P, serializer: S) -> Result<S::Ok, S::Error>
where
    P: AsRef<Path>,
    S: Serializer,
{
    serializer.serialize_str(&path.as_ref().to_string_lossy())
}

pub(crate) fn lossy_paths<S>(paths: &[PathBuf], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(paths.iter().map(|path| path.to_string_lossy()))
}

#[derive(Debug, Default, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ReportSummary {
    /// Executed (non-skipped) cases.
    pub cases: usize,
    pub executions: usize,
    pub pass: usize,
    pub fail: usize,
    pub timeout: usize,
    pub skip: usize,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Report {
    /// Enabled variant names, in execution order.
    pub variants: Vec<String>,
    #[serde(serialize_with = "lossy_paths")]
    pub skipped: Vec<PathBuf>,
    pub cases: Vec<CaseReport>,
}

impl Report {
    pub fn new(variants: Vec<String>) -> Self {
        Self {
            variants,
            skipped: Vec::new(),
            cases: Vec::new(),
        }
    }

    pub fn record_skip(&mut self, case: PathBuf) {
        self.skipped.push(case);
    }

    /// Append an execution outcome. Consecutive outcomes for the same path
    /// are grouped under one [`CaseReport`].
    pub fn record(&mut self, case: &Path, variant: &str, outcome: Outcome) {
        debug_assert!(outcome != Outcome::Skip, "skips go through record_skip");
        let result = VariantResult {
            variant: variant.to_string(),
            outcome,
        };
        match self.cases.last_mut() {
            Some(last) if last.path == case => last.results.push(result),
            _ => self.cases.push(CaseReport {
                path: case.to_path_buf(),
                results: vec![result],
            }),
        }
    }

    /// Per-case variants that failed, for cases with at least one failure.
    pub fn failures(&self) -> Vec<Bucket<'_>> {
        self.buckets(Outcome::Fail)
    }

    /// Per-case variants that timed out, for cases with at least one timeout.
    pub fn timeouts(&self) -> Vec<Bucket<'_>> {
        self.buckets(Outcome::Timeout)
    }

    fn buckets(&self, outcome: Outcome) -> Vec<Bucket<'_>> {
        self.cases
            .iter()
            .filter_map(|case| {
                let variants = case.variants_with(outcome);
                (!variants.is_empty()).then_some(Bucket {
                    case: &case.path,
                    variants,
                })
            })
            .collect()
    }

    /// Outcomes recorded for `case`, or `None` if it was never executed.
    pub fn outcomes_for(&self, case: &Path) -> Option<&[VariantResult]> {
        self.cases
            .iter()
            .find(|report| report.path == case)
            .map(|report| report.results.as_slice())
    }

    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary {
            cases: self.cases.len(),
            skip: self.skipped.len(),
            ..ReportSummary::default()
        };
        for result in self.cases.iter().flat_map(|case| &case.results) {
            summary.executions += 1;
            match result.outcome {
                Outcome::Pass => summary.pass += 1,
                Outcome::Fail => summary.fail += 1,
                Outcome::Timeout => summary.timeout += 1,
                Outcome::Skip => summary.skip += 1,
            }
        }
        summary
    }

    /// Number of `fail` plus `timeout` outcomes across every (case, variant) pair.
    pub fn failure_count(&self) -> usize {
        self.cases
            .iter()
            .flat_map(|case| &case.results)
            .filter(|result| result.outcome.is_failure())
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }

    pub fn exit_code(&self) -> i32 {
        exit_codes::from_failure_count(self.failure_count())
    }
}
