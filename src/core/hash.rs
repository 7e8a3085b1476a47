//! Key hashing
//!
//! Turns the string form of a key into a digest and renders it as the
//! variable part of an entry filename.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::{CacheError, Result};

#[cfg(feature = "sha1")]
use sha1::{Digest, Sha1};
#[cfg(feature = "xxh3")]
use xxhash_rust::xxh3::xxh3_64;

/// Hash algorithm selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha1,
    Md5,
    /// Fast, non-cryptographic. Never picked unless listed explicitly.
    Xxh3,
}

impl HashAlgorithm {
    /// Strong general-purpose hash first, widely available weaker one second
    pub const DEFAULT_PREFERENCES: [HashAlgorithm; 2] = [HashAlgorithm::Sha1, HashAlgorithm::Md5];

    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Xxh3 => "xxh3",
        }
    }

    /// Whether this algorithm was compiled into the current build
    pub fn is_available(self) -> bool {
        Backend::for_algorithm(self).is_some()
    }

    /// Digest length in bytes
    pub fn digest_len(self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Xxh3 => 8,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a digest is rendered into a filename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigestEncoding {
    /// Fixed-width lowercase hex of the raw digest bytes
    #[default]
    Hex,
    /// Digest read as a signed big-endian integer in base 16: leading zeros
    /// dropped, `-` prefix when the top bit is set. Only for reopening
    /// directories written with that naming scheme.
    LegacySigned,
}

impl DigestEncoding {
    pub fn encode(self, digest: &[u8]) -> String {
        match self {
            DigestEncoding::Hex => hex::encode(digest),
            DigestEncoding::LegacySigned => signed_hex(digest),
        }
    }
}

/// Algorithms actually compiled in. Uninhabited when every hash feature is off.
#[derive(Debug, Clone, Copy)]
enum Backend {
    #[cfg(feature = "sha1")]
    Sha1,
    #[cfg(feature = "md5")]
    Md5,
    #[cfg(feature = "xxh3")]
    Xxh3,
}

impl Backend {
    fn for_algorithm(algorithm: HashAlgorithm) -> Option<Self> {
        match algorithm {
            #[cfg(feature = "sha1")]
            HashAlgorithm::Sha1 => Some(Backend::Sha1),
            #[cfg(feature = "md5")]
            HashAlgorithm::Md5 => Some(Backend::Md5),
            #[cfg(feature = "xxh3")]
            HashAlgorithm::Xxh3 => Some(Backend::Xxh3),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }

    fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            #[cfg(feature = "sha1")]
            Backend::Sha1 => Sha1::digest(data).to_vec(),
            #[cfg(feature = "md5")]
            Backend::Md5 => md5::compute(data).0.to_vec(),
            #[cfg(feature = "xxh3")]
            Backend::Xxh3 => xxh3_64(data).to_be_bytes().to_vec(),
        }
    }
}

/// A selected hash algorithm plus the filename rendering.
///
/// Holds no hashing state: every call starts from a fresh context, so a
/// shared `Hasher` is safe to use from several threads.
#[derive(Debug, Clone, Copy)]
pub struct Hasher {
    algorithm: HashAlgorithm,
    backend: Backend,
    encoding: DigestEncoding,
}

impl Hasher {
    /// Pick the first available algorithm from `preferences`
    pub fn select(preferences: &[HashAlgorithm], encoding: DigestEncoding) -> Result<Self> {
        preferences
            .iter()
            .find_map(|&algorithm| {
                Backend::for_algorithm(algorithm).map(|backend| Self {
                    algorithm,
                    backend,
                    encoding,
                })
            })
            .ok_or_else(|| CacheError::NoHashAlgorithm {
                tried: preferences.to_vec(),
            })
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn encoding(&self) -> DigestEncoding {
        self.encoding
    }

    /// Compute the raw digest of bytes
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        self.backend.digest(data)
    }

    /// Digest `data` and render it with the configured encoding
    pub fn hash_str(&self, data: &str) -> String {
        self.encoding.encode(&self.digest(data.as_bytes()))
    }
}

/// Render bytes as a signed two's-complement big-endian integer in base 16
fn signed_hex(bytes: &[u8]) -> String {
    let negative = bytes.first().is_some_and(|b| b & 0x80 != 0);
    let magnitude = if negative {
        negate(bytes)
    } else {
        bytes.to_vec()
    };

    let digits = hex::encode(magnitude);
    let digits = match digits.trim_start_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };

    if negative {
        format!("-{}", digits)
    } else {
        digits.to_string()
    }
}

/// Two's-complement negation of a big-endian byte string
fn negate(bytes: &[u8]) -> Vec<u8> {
    let mut out: Vec<u8> = bytes.iter().map(|b| !b).collect();
    for byte in out.iter_mut().rev() {
        let (sum, overflow) = byte.overflowing_add(1);
        *byte = sum;
        if !overflow {
            break;
        }
    }
    out
}
