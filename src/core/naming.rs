//! Entry filename layout
//!
//! An entry lives at `<base>/<prefix><hash><suffix>`. The same prefix/suffix
//! pair decides which files in the base directory belong to the cache.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::core::error::{CacheError, Result};

/// Optional prefix and suffix wrapped around every entry name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryNames {
    prefix: Option<String>,
    suffix: Option<String>,
}

impl EntryNames {
    /// Empty strings are treated the same as no prefix/suffix
    pub fn new(prefix: Option<String>, suffix: Option<String>) -> Self {
        Self {
            prefix: prefix.filter(|p| !p.is_empty()),
            suffix: suffix.filter(|s| !s.is_empty()),
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    /// Wrap a hash in the configured prefix and suffix
    pub fn file_name(&self, hash: &str) -> String {
        format!(
            "{}{}{}",
            self.prefix().unwrap_or(""),
            hash,
            self.suffix().unwrap_or("")
        )
    }

    /// Check whether a file name belongs to the cache
    pub fn matches(&self, name: &OsStr) -> bool {
        let name = name.as_encoded_bytes();
        self.prefix()
            .map_or(true, |p| name.starts_with(p.as_bytes()))
            && self
                .suffix()
                .map_or(true, |s| name.ends_with(s.as_bytes()))
    }

    /// List the direct children of `base` whose names match.
    ///
    /// Does not recurse and does not follow symlinks. Every kind of directory
    /// entry is returned, not only regular files. Entries that cannot be read
    /// are logged and skipped; only failing to open `base` is an error.
    pub fn scan(&self, base: &Path) -> Result<Vec<PathBuf>> {
        let mut matched = Vec::new();

        for entry in WalkDir::new(base).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    skip_entry_error(base, err)?;
                    continue;
                }
            };
            if self.matches(entry.file_name()) {
                matched.push(entry.into_path());
            }
        }

        matched.sort();
        Ok(matched)
    }
}

/// Errors on the base directory itself propagate; errors on a child entry
/// are logged and dropped.
fn skip_entry_error(base: &Path, err: walkdir::Error) -> Result<()> {
    if err.depth() == 0 {
        return Err(CacheError::io(base, err.into()));
    }
    warn!(
        path = %err.path().unwrap_or(base).display(),
        error = %err,
        "skipping unreadable cache directory entry"
    );
    Ok(())
}
