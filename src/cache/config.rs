//! Cache configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::hash::{DigestEncoding, HashAlgorithm};

fn default_algorithms() -> Vec<HashAlgorithm> {
    HashAlgorithm::DEFAULT_PREFERENCES.to_vec()
}

/// Configuration for a [`DiskCache`](crate::DiskCache)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding every entry. Must already exist.
    pub base_dir: PathBuf,

    /// Prepended to every entry filename
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Appended to every entry filename
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,

    /// Hash algorithms in order of preference
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<HashAlgorithm>,

    /// Filename rendering of the digest
    #[serde(default)]
    pub encoding: DigestEncoding,
}

impl CacheConfig {
    /// Config with no prefix/suffix and the default algorithm preferences
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            prefix: None,
            suffix: None,
            algorithms: default_algorithms(),
            encoding: DigestEncoding::default(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn with_algorithms(mut self, algorithms: impl IntoIterator<Item = HashAlgorithm>) -> Self {
        self.algorithms = algorithms.into_iter().collect();
        self
    }

    pub fn with_encoding(mut self, encoding: DigestEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
