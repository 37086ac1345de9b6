//! Runtime configurations each case is swept across.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A named set of flags appended after `-f <case>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Variant {
    pub name: String,
    #[serde(default)]
    pub flags: Vec<String>,
    /// Disabled variants stay in the config but are never executed.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl Variant {
    pub fn new(name: &str, flags: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            flags: flags.iter().map(|flag| flag.to_string()).collect(),
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Parse `name` or `name=<flags>` where flags are whitespace separated.
    ///
    /// `full=--stress-GC=full` splits on the first `=` only.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let (name, flags): (&str, Vec<&str>) = match raw.split_once('=') {
            Some((name, flags)) => (name.trim(), flags.split_whitespace().collect()),
            None => (raw.trim(), Vec::new()),
        };
        if name.is_empty() {
            return Err(ConfigError::InvalidVariant {
                name: raw.to_string(),
                reason: "name must be non-empty".to_string(),
            });
        }
        Ok(Self::new(name, &flags))
    }
}

/// The ordered, enabled variants for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantMatrix {
    variants: Vec<Variant>,
}

impl VariantMatrix {
    /// Keep the enabled variants in declaration order.
    ///
    /// Names must be non-empty and unique across the whole list (disabled
    /// entries included), and at least one variant must be enabled.
    pub fn new(variants: &[Variant]) -> Result<Self, ConfigError> {
        let mut seen = BTreeSet::new();
        for variant in variants {
            if variant.name.trim().is_empty() {
                return Err(ConfigError::InvalidVariant {
                    name: variant.name.clone(),
                    reason: "name must be non-empty".to_string(),
                });
            }
            if !seen.insert(variant.name.as_str()) {
                return Err(ConfigError::InvalidVariant {
                    name: variant.name.clone(),
                    reason: "duplicate name".to_string(),
                });
            }
            if variant.flags.iter().any(|flag| flag.is_empty()) {
                return Err(ConfigError::InvalidVariant {
                    name: variant.name.clone(),
                    reason: "flags must be non-empty strings".to_string(),
                });
            }
        }
        let enabled: Vec<Variant> = variants
            .iter()
            .filter(|variant| variant.enabled)
            .cloned()
            .collect();
        if enabled.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one variant must be enabled".to_string(),
            ));
        }
        Ok(Self { variants: enabled })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Variant> {
        self.variants.iter()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.variants
            .iter()
            .map(|variant| variant.name.clone())
            .collect()
    }
}

impl<'a> IntoIterator for &'a VariantMatrix {
    type Item = &'a Variant;
    type IntoIter = std::slice::Iter<'a, Variant>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
