//! Declarative skip rules evaluated against a case's full path.

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A skip rule as written in config: `{ substring = "..." }` or `{ regex = "..." }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipPattern {
    Substring(String),
    Regex(String),
}

#[derive(Debug, Clone)]
enum SkipRule {
    Substring(String),
    Regex(Regex),
}

impl SkipRule {
    fn matches(&self, path: &str) -> bool {
        match self {
            SkipRule::Substring(needle) => path.contains(needle.as_str()),
            SkipRule::Regex(re) => re.is_match(path),
        }
    }
}

/// Compiled skip rules. A case is skipped if any rule matches.
#[derive(Debug, Clone, Default)]
pub struct SkipRules {
    rules: Vec<SkipRule>,
}

impl SkipRules {
    pub fn compile(patterns: &[SkipPattern]) -> Result<Self, ConfigError> {
        let mut rules = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let rule = match pattern {
                SkipPattern::Substring(needle) if needle.is_empty() => {
                    return Err(ConfigError::Invalid(
                        "skip substring must be non-empty".to_string(),
                    ));
                }
                SkipPattern::Regex(raw) if raw.is_empty() => {
                    return Err(ConfigError::Invalid(
                        "skip regex must be non-empty".to_string(),
                    ));
                }
                SkipPattern::Substring(needle) => SkipRule::Substring(needle.clone()),
                SkipPattern::Regex(raw) => {
                    let re = Regex::new(raw).map_err(|source| ConfigError::InvalidSkipPattern {
                        pattern: raw.clone(),
                        source,
                    })?;
                    SkipRule::Regex(re)
                }
            };
            rules.push(rule);
        }
        Ok(Self { rules })
    }

    pub fn matches(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        self.rules.iter().any(|rule| rule.matches(&path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(patterns: &[SkipPattern]) -> SkipRules {
        SkipRules::compile(patterns).expect("compile")
    }

    #[test]
    fn empty_rules_skip_nothing() {
        let rules = rules(&[]);
        assert!(!rules.matches(Path::new("examples/thread.lox")));
    }

    #[test]
    fn substring_matches_anywhere_in_full_path() {
        let rules = rules(&[SkipPattern::Substring("mutex".to_string())]);
        assert!(rules.matches(Path::new("examples/mutex_blocking.lox")));
        assert!(rules.matches(Path::new("/tmp/mutex/a.lox")));
        assert!(!rules.matches(Path::new("examples/closure.lox")));
    }

    #[test]
    fn regex_matches_full_path() {
        let rules = rules(&[SkipPattern::Regex(r"thread\d*\.lox$".to_string())]);
        assert!(rules.matches(Path::new("examples/thread2.lox")));
        assert!(!rules.matches(Path::new("examples/thread2.lox.bak")));
    }

    #[test]
    fn any_rule_is_enough() {
        let rules = rules(&[
            SkipPattern::Substring("nope".to_string()),
            SkipPattern::Regex("^examples/".to_string()),
        ]);
        assert!(rules.matches(Path::new("examples/a.lox")));
    }

    #[test]
    fn invalid_regex_is_config_error() {
        let err = SkipRules::compile(&[SkipPattern::Regex("(".to_string())]).expect_err("bad");
        assert!(matches!(err, ConfigError::InvalidSkipPattern { .. }));
    }

    #[test]
    fn empty_pattern_is_rejected() {
        assert!(SkipRules::compile(&[SkipPattern::Substring(String::new())]).is_err());
        assert!(SkipRules::compile(&[SkipPattern::Regex(String::new())]).is_err());
    }
}
