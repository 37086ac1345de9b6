//! Case discovery.
//!
//! Lists a single directory (no recursion), sorts the entries by path, and
//! then lazily yields the regular files carrying the requested extension.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::vec;

use anyhow::{Context, Result};
use tracing::debug;

use crate::error::ConfigError;

/// Deterministically ordered iterator over candidate case files.
#[derive(Debug)]
pub struct Discovery {
    entries: vec::IntoIter<PathBuf>,
    extension: String,
}

impl Iterator for Discovery {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        for path in self.entries.by_ref() {
            if path.extension() != Some(OsStr::new(&self.extension)) {
                continue;
            }
            // Follows symlinks: a link to a regular file is a case.
            match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => return Some(path),
                Ok(_) => debug!(path = %path.display(), "not a regular file"),
                Err(err) => debug!(path = %path.display(), err = %err, "entry vanished"),
            }
        }
        None
    }
}

/// Strip a leading dot so `lox` and `.lox` mean the same thing.
pub fn normalize_extension(extension: &str) -> &str {
    extension.strip_prefix('.').unwrap_or(extension)
}

/// Discover case files with `extension` directly under `root`.
///
/// A missing root is a [`ConfigError::DirectoryNotFound`].
pub fn discover_cases(root: &Path, extension: &str) -> Result<Discovery> {
    if !root.is_dir() {
        return Err(ConfigError::DirectoryNotFound(root.to_path_buf()).into());
    }
    let mut entries = Vec::new();
    for entry in fs::read_dir(root).with_context(|| format!("read cases dir {}", root.display()))? {
        let entry = entry.context("read case entry")?;
        entries.push(entry.path());
    }
    entries.sort();
    debug!(root = %root.display(), entries = entries.len(), "listed case directory");
    Ok(Discovery {
        entries: entries.into_iter(),
        extension: normalize_extension(extension).to_string(),
    })
}
