//! Test-only helpers: a scripted executor and throwaway case corpora.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::core::outcome::Execution;
use crate::core::variant::Variant;
use crate::io::process::Executor;

#[derive(Debug, Clone)]
struct Scripted {
    file_name: String,
    variant: Option<String>,
    execution: Execution,
}

/// Executor that never spawns anything.
///
/// Answers from rules keyed by case file name (and optionally variant),
/// defaulting to `Completed(0)`, and records every call in order.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    rules: Vec<Scripted>,
    calls: Vec<(PathBuf, String)>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `execution` for `file_name`, under `variant` only if given.
    /// Earlier rules win.
    pub fn on(mut self, file_name: &str, variant: Option<&str>, execution: Execution) -> Self {
        self.rules.push(Scripted {
            file_name: file_name.to_string(),
            variant: variant.map(str::to_string),
            execution,
        });
        self
    }

    pub fn calls(&self) -> &[(PathBuf, String)] {
        &self.calls
    }

    pub fn calls_for(&self, case: &Path) -> usize {
        self.calls.iter().filter(|(path, _)| path == case).count()
    }
}

impl Executor for ScriptedExecutor {
    fn execute(&mut self, case: &Path, variant: &Variant) -> Execution {
        self.calls.push((case.to_path_buf(), variant.name.clone()));
        let file_name = case
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.rules
            .iter()
            .find(|rule| {
                rule.file_name == file_name
                    && rule
                        .variant
                        .as_deref()
                        .is_none_or(|wanted| wanted == variant.name)
            })
            .map(|rule| rule.execution.clone())
            .unwrap_or(Execution::Completed(0))
    }
}

/// A temporary case directory.
///
/// Case bodies are plain shell, so `sh` can stand in for the interpreter:
/// `sh -f <case> <flags...>` runs the body with the variant flags as `$@`.
pub struct TestCorpus {
    temp: TempDir,
}

impl TestCorpus {
    /// Create a corpus with empty files of the given names.
    pub fn new(names: &[&str]) -> Result<Self> {
        let corpus = Self {
            temp: tempfile::tempdir().context("create corpus dir")?,
        };
        for name in names {
            corpus.write_case(name, "")?;
        }
        Ok(corpus)
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn case(&self, name: impl AsRef<Path>) -> PathBuf {
        self.temp.path().join(name)
    }

    pub fn write_case(&self, name: impl AsRef<Path>, body: &str) -> Result<PathBuf> {
        let path = self.case(name);
        fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    /// Case body that appends `<case> <flags>` to `log` before running `body`.
    pub fn logged_body(log: &Path, body: &str) -> String {
        format!("echo \"$0 $*\" >> '{}'\n{body}", log.display())
    }
}

/// Lines of an invocation log written by [`TestCorpus::logged_body`].
pub fn read_invocations(log: &Path) -> Vec<String> {
    fs::read_to_string(log)
        .map(|contents| contents.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
