use serde::Serialize;

/// What the bounded executor observed for one (case, variant) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution {
    /// The interpreter terminated within the deadline with this exit code.
    /// Signal deaths are folded in as `128 + signal`.
    Completed(i32),
    /// The interpreter outlived the deadline and was killed.
    DeadlineExceeded,
    /// The interpreter could not be started or waited on.
    Aborted(String),
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail,
    Timeout,
    Skip,
}

impl Outcome {
    /// Counts toward the exit status.
    pub fn is_failure(self) -> bool {
        matches!(self, Outcome::Fail | Outcome::Timeout)
    }
}

/// Skipped cases never get here; `Outcome::Skip` is assigned before execution.
pub fn classify(execution: &Execution) -> Outcome {
    match execution {
        Execution::Completed(0) => Outcome::Pass,
        Execution::Completed(_) | Execution::Aborted(_) => Outcome::Fail,
        Execution::DeadlineExceeded => Outcome::Timeout,
    }
}
