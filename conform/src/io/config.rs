//! Suite configuration: built-in presets, TOML files and CLI overrides.
//!
//! Precedence, lowest first: preset, `--config` file (replaces the preset
//! wholesale), then individual overrides from the command line.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::skip::{SkipPattern, SkipRules};
use crate::core::variant::{Variant, VariantMatrix};
use crate::error::ConfigError;
use crate::io::discover::normalize_extension;

/// Suite configuration (TOML).
///
/// Missing fields default to the `gc-stress` preset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SuiteConfig {
    /// Directory holding the case files (not searched recursively).
    pub root: PathBuf,

    /// Case file extension, with or without the leading dot.
    pub extension: String,

    /// Interpreter under test. Bare names are looked up on `PATH`.
    pub binary: PathBuf,

    /// Per-execution wall-clock deadline in seconds.
    pub timeout_secs: u64,

    pub variants: Vec<Variant>,

    pub skip: Vec<SkipPattern>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Preset::GcStress.config()
    }
}

/// Built-in configurations matching the interpreter's two test drivers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// `examples/*.lox` under the GC stress modes, 30s deadline.
    #[default]
    GcStress,
    /// `jit_test/*.jit` with the JIT enabled, 10s deadline.
    Jit,
}

impl Preset {
    pub fn config(self) -> SuiteConfig {
        match self {
            Preset::GcStress => SuiteConfig {
                root: PathBuf::from("examples"),
                extension: "lox".to_string(),
                binary: PathBuf::from("./bin/clox"),
                timeout_secs: 30,
                variants: vec![
                    Variant::new("young", &["--stress-GC=young"]).disabled(),
                    Variant::new("full", &["--stress-GC=full"]),
                    Variant::new("both", &["--stress-GC=both"]).disabled(),
                ],
                skip: vec![
                    SkipPattern::Regex("mutex_blocking".to_string()),
                    SkipPattern::Regex("thread".to_string()),
                    SkipPattern::Regex("mutex".to_string()),
                ],
            },
            Preset::Jit => SuiteConfig {
                root: PathBuf::from("jit_test"),
                extension: "jit".to_string(),
                binary: PathBuf::from("./bin/clox"),
                timeout_secs: 10,
                variants: vec![Variant::new("jit-enabled", &["--enable-jit"])],
                skip: Vec::new(),
            },
        }
    }
}

impl SuiteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be > 0".to_string()));
        }
        if normalize_extension(self.extension.trim()).is_empty() {
            return Err(ConfigError::Invalid("extension must be non-empty".to_string()));
        }
        if self.root.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("root must be non-empty".to_string()));
        }
        if self.binary.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("binary must be non-empty".to_string()));
        }
        VariantMatrix::new(&self.variants)?;
        SkipRules::compile(&self.skip)?;
        Ok(())
    }
}

/// Per-field overrides collected from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub root: Option<PathBuf>,
    pub extension: Option<String>,
    pub binary: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    /// Replaces the variant list when non-empty.
    pub variants: Vec<Variant>,
    /// Appended to the configured skip rules.
    pub skip: Vec<SkipPattern>,
}

/// Apply command-line overrides to a base configuration.
pub fn apply_overrides(mut base: SuiteConfig, overrides: &ConfigOverrides) -> Result<SuiteConfig> {
    if let Some(root) = &overrides.root {
        base.root = root.clone();
    }
    if let Some(extension) = &overrides.extension {
        base.extension = extension.clone();
    }
    if let Some(binary) = &overrides.binary {
        base.binary = binary.clone();
    }
    if let Some(timeout_secs) = overrides.timeout_secs {
        base.timeout_secs = timeout_secs;
    }
    if !overrides.variants.is_empty() {
        base.variants = overrides.variants.clone();
    }
    base.skip.extend(overrides.skip.iter().cloned());
    base.validate()?;
    Ok(base)
}

/// Load config from a TOML file. Unlike the preset, a named file must exist.
pub fn load_config(path: &Path) -> Result<SuiteConfig> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SuiteConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Render config as TOML, e.g. to seed a `--config` file from a preset.
pub fn render_config(cfg: &SuiteConfig) -> Result<String> {
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    if !buf.ends_with('\n') {
        buf.push('\n');
    }
    Ok(buf)
}
