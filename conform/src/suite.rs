//! Suite orchestration.
//!
//! Discovery happens first and is the only place a run can still fail as a
//! whole. After that every (case, variant) pair is executed once, in order,
//! and its outcome handed to the [`Report`]; nothing a single case does can
//! abort the remaining corpus.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info, instrument};

use crate::core::outcome::classify;
use crate::core::report::Report;
use crate::core::skip::SkipRules;
use crate::core::variant::VariantMatrix;
use crate::io::config::SuiteConfig;
use crate::io::discover::discover_cases;
use crate::io::process::Executor;

/// Validated, compiled form of a [`SuiteConfig`].
#[derive(Debug, Clone)]
pub struct SuitePlan {
    pub root: PathBuf,
    pub extension: String,
    pub skip: SkipRules,
    pub matrix: VariantMatrix,
}

impl SuitePlan {
    pub fn from_config(cfg: &SuiteConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            root: cfg.root.clone(),
            extension: cfg.extension.trim().to_string(),
            skip: SkipRules::compile(&cfg.skip)?,
            matrix: VariantMatrix::new(&cfg.variants)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Suppress the `running <case> (<variant>)` progress lines.
    pub quiet: bool,
}

/// A discovered case and whether a skip rule excludes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCase {
    pub path: PathBuf,
    pub skipped: bool,
}

/// Discover cases and apply skip rules without executing anything.
pub fn plan_cases(plan: &SuitePlan) -> Result<Vec<PlannedCase>> {
    Ok(discover_cases(&plan.root, &plan.extension)?
        .map(|path| PlannedCase {
            skipped: plan.skip.matches(&path),
            path,
        })
        .collect())
}

/// Run every discovered case under every enabled variant.
#[instrument(skip_all, fields(root = %plan.root.display(), variants = plan.matrix.len()))]
pub fn run_suite<E: Executor>(
    plan: &SuitePlan,
    executor: &mut E,
    options: RunOptions,
) -> Result<Report> {
    let cases = discover_cases(&plan.root, &plan.extension)?;
    info!("suite started");

    let mut report = Report::new(plan.matrix.names());
    for case in cases {
        if plan.skip.matches(&case) {
            debug!(case = %case.display(), "case skipped");
            report.record_skip(case);
            continue;
        }
        for variant in &plan.matrix {
            if !options.quiet {
                println!("running {} ({})", case.display(), variant.name);
            }
            let execution = executor.execute(&case, variant);
            let outcome = classify(&execution);
            debug!(
                case = %case.display(),
                variant = %variant.name,
                execution = ?execution,
                outcome = ?outcome,
                "execution classified"
            );
            report.record(&case, &variant.name, outcome);
        }
    }

    let summary = report.summary();
    info!(
        cases = summary.cases,
        executions = summary.executions,
        fail = summary.fail,
        timeout = summary.timeout,
        skip = summary.skip,
        "suite finished"
    );
    debug_assert_eq!(
        summary.executions,
        summary.cases * plan.matrix.len(),
        "every executed case has one outcome per variant"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::outcome::{Execution, Outcome};
    use crate::core::skip::SkipPattern;
    use crate::core::variant::Variant;
    use crate::error::ConfigError;
    use crate::test_support::{ScriptedExecutor, TestCorpus};
    use std::path::Path;

    fn suite_plan(root: &Path, variants: Vec<Variant>, skip: Vec<SkipPattern>) -> SuitePlan {
        let cfg = SuiteConfig {
            root: root.to_path_buf(),
            extension: "lox".to_string(),
            binary: PathBuf::from("sh"),
            timeout_secs: 5,
            variants,
            skip,
        };
        SuitePlan::from_config(&cfg).expect("plan")
    }

    fn quiet() -> RunOptions {
        RunOptions { quiet: true }
    }

    #[test]
    fn scenario_pass_fail_timeout_single_variant() {
        let corpus = TestCorpus::new(&["a.lox", "b.lox", "c.lox"]).expect("corpus");
        let plan = suite_plan(corpus.path(), vec![Variant::new("default", &[])], Vec::new());
        let mut executor = ScriptedExecutor::new()
            .on("b.lox", None, Execution::Completed(1))
            .on("c.lox", None, Execution::DeadlineExceeded);

        let report = run_suite(&plan, &mut executor, quiet()).expect("run");

        let outcome = |name: &str| {
            report
                .outcomes_for(&corpus.case(name))
                .expect("case ran")[0]
                .outcome
        };
        assert_eq!(outcome("a.lox"), Outcome::Pass);
        assert_eq!(outcome("b.lox"), Outcome::Fail);
        assert_eq!(outcome("c.lox"), Outcome::Timeout);
        assert_eq!(report.exit_code(), 2);
    }

    #[test]
    fn scenario_failure_under_one_variant() {
        let corpus = TestCorpus::new(&["a.lox", "b.lox"]).expect("corpus");
        let variants = vec![
            Variant::new("young", &["--stress-GC=young"]),
            Variant::new("full", &["--stress-GC=full"]),
        ];
        let plan = suite_plan(corpus.path(), variants, Vec::new());
        let mut executor =
            ScriptedExecutor::new().on("a.lox", Some("full"), Execution::Completed(1));

        let report = run_suite(&plan, &mut executor, quiet()).expect("run");

        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].case, corpus.case("a.lox"));
        assert_eq!(failures[0].variants, vec!["full"]);
        assert!(report.timeouts().is_empty());
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn scenario_skipped_case_never_executes() {
        let corpus = TestCorpus::new(&["a.lox", "thread_pool.lox", "z.lox"]).expect("corpus");
        let plan = suite_plan(
            corpus.path(),
            vec![Variant::new("young", &[]), Variant::new("full", &[])],
            vec![SkipPattern::Regex("thread".to_string())],
        );
        let mut executor =
            ScriptedExecutor::new().on("thread_pool.lox", None, Execution::Completed(1));

        let report = run_suite(&plan, &mut executor, quiet()).expect("run");

        let skipped = corpus.case("thread_pool.lox");
        assert_eq!(executor.calls_for(&skipped), 0);
        assert_eq!(report.skipped, vec![skipped.clone()]);
        assert!(report.outcomes_for(&skipped).is_none());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn scenario_missing_root_runs_nothing() {
        let corpus = TestCorpus::new(&[]).expect("corpus");
        let plan = suite_plan(
            &corpus.path().join("missing"),
            vec![Variant::new("default", &[])],
            Vec::new(),
        );
        let mut executor = ScriptedExecutor::new();

        let err = run_suite(&plan, &mut executor, quiet()).expect_err("missing root");

        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::DirectoryNotFound(_))
        ));
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn every_case_gets_one_outcome_per_variant() {
        let corpus =
            TestCorpus::new(&["a.lox", "b.lox", "mutex.lox", "c.lox", "notes.md"]).expect("corpus");
        let variants = vec![
            Variant::new("young", &[]),
            Variant::new("full", &[]),
            Variant::new("both", &[]),
            Variant::new("never", &[]).disabled(),
        ];
        let plan = suite_plan(
            corpus.path(),
            variants,
            vec![SkipPattern::Substring("mutex".to_string())],
        );
        let mut executor = ScriptedExecutor::new();

        let report = run_suite(&plan, &mut executor, quiet()).expect("run");

        assert_eq!(report.cases.len(), 3);
        for case in &report.cases {
            let names: Vec<&str> = case.results.iter().map(|r| r.variant.as_str()).collect();
            assert_eq!(names, vec!["young", "full", "both"]);
        }
        assert_eq!(executor.calls().len(), 9);
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn executes_in_case_then_variant_order() {
        let corpus = TestCorpus::new(&["b.lox", "a.lox"]).expect("corpus");
        let plan = suite_plan(
            corpus.path(),
            vec![Variant::new("young", &[]), Variant::new("full", &[])],
            Vec::new(),
        );
        let mut executor = ScriptedExecutor::new();
        run_suite(&plan, &mut executor, quiet()).expect("run");

        let order: Vec<(PathBuf, String)> = executor.calls().to_vec();
        assert_eq!(
            order,
            vec![
                (corpus.case("a.lox"), "young".to_string()),
                (corpus.case("a.lox"), "full".to_string()),
                (corpus.case("b.lox"), "young".to_string()),
                (corpus.case("b.lox"), "full".to_string()),
            ]
        );
    }

    #[test]
    fn launch_failure_is_recorded_and_run_continues() {
        let corpus = TestCorpus::new(&["a.lox", "b.lox"]).expect("corpus");
        let plan = suite_plan(corpus.path(), vec![Variant::new("default", &[])], Vec::new());
        let mut executor = ScriptedExecutor::new().on(
            "a.lox",
            None,
            Execution::Aborted("permission denied".to_string()),
        );

        let report = run_suite(&plan, &mut executor, quiet()).expect("run");

        assert_eq!(report.failures().len(), 1);
        assert_eq!(executor.calls_for(&corpus.case("b.lox")), 1);
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn identical_inputs_give_identical_reports() {
        let corpus = TestCorpus::new(&["a.lox", "b.lox", "thread.lox", "c.lox"]).expect("corpus");
        let plan = suite_plan(
            corpus.path(),
            vec![Variant::new("young", &[]), Variant::new("full", &[])],
            vec![SkipPattern::Regex("thread".to_string())],
        );
        let scripted = || {
            ScriptedExecutor::new()
                .on("a.lox", Some("young"), Execution::Completed(70))
                .on("c.lox", Some("full"), Execution::DeadlineExceeded)
        };

        let first = run_suite(&plan, &mut scripted(), quiet()).expect("first");
        let second = run_suite(&plan, &mut scripted(), quiet()).expect("second");

        assert_eq!(first, second);
        assert_eq!(first.exit_code(), second.exit_code());
        assert_eq!(first.exit_code(), 2);
    }

    #[test]
    fn plan_cases_marks_skips_without_executing() {
        let corpus = TestCorpus::new(&["a.lox", "mutex_blocking.lox"]).expect("corpus");
        let plan = suite_plan(
            corpus.path(),
            vec![Variant::new("default", &[])],
            vec![SkipPattern::Regex("mutex".to_string())],
        );
        let planned = plan_cases(&plan).expect("plan");
        assert_eq!(
            planned,
            vec![
                PlannedCase {
                    path: corpus.case("a.lox"),
                    skipped: false
                },
                PlannedCase {
                    path: corpus.case("mutex_blocking.lox"),
                    skipped: true
                },
            ]
        );
    }

    #[test]
    fn invalid_config_fails_before_discovery() {
        let cfg = SuiteConfig {
            variants: vec![Variant::new("young", &[]).disabled()],
            ..SuiteConfig::default()
        };
        let err = SuitePlan::from_config(&cfg).expect_err("no variants");
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }
}
