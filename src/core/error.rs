//! Error types for cache operations

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::hash::HashAlgorithm;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, CacheError>;

/// Everything that can go wrong while building or using a cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// None of the preferred hash algorithms was compiled into this build.
    /// Raised only by the constructor.
    #[error("no available hashing algorithm (tried: {tried:?})")]
    NoHashAlgorithm { tried: Vec<HashAlgorithm> },

    /// Filesystem failure on an entry file or the base directory
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The caller-supplied codec failed to encode or decode a value
    #[error("codec failed for {}: {source:#}", .path.display())]
    Codec {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl CacheError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        CacheError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn codec(path: &Path, source: anyhow::Error) -> Self {
        CacheError::Codec {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Classify a codec failure. I/O errors surfacing through the codec
    /// (disk full, read failure), bare or wrapped by serde_json, stay `Io`;
    /// malformed data and everything else is `Codec`.
    pub(crate) fn from_codec(path: &Path, source: anyhow::Error) -> Self {
        if source
            .downcast_ref::<serde_json::Error>()
            .is_some_and(serde_json::Error::is_io)
        {
            return match source.downcast::<serde_json::Error>() {
                Ok(err) => CacheError::io(path, err.into()),
                Err(source) => CacheError::codec(path, source),
            };
        }

        if source
            .downcast_ref::<io::Error>()
            .is_some_and(|err| err.kind() != io::ErrorKind::InvalidData)
        {
            return match source.downcast::<io::Error>() {
                Ok(err) => CacheError::io(path, err),
                Err(source) => CacheError::codec(path, source),
            };
        }

        CacheError::codec(path, source)
    }

    /// Path of the file or directory involved, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            CacheError::NoHashAlgorithm { .. } => None,
            CacheError::Io { path, .. } | CacheError::Codec { path, .. } => Some(path),
        }
    }

    /// True when the underlying I/O error is `NotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}
