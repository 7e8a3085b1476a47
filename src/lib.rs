//! keyed-disk-cache - A generic on-disk cache, one file per key
//!
//! Each value is stored as a single file named
//! `<prefix><hex digest of the key><suffix>` inside a base directory. The
//! cache derives names and manages the files; a caller-supplied [`Codec`]
//! does all serialization.
//!
//! ```no_run
//! use keyed_disk_cache::{CacheConfig, DiskCache, StringCodec};
//!
//! # fn main() -> keyed_disk_cache::Result<()> {
//! let config = CacheConfig::new("/var/cache/thumbs").with_suffix(".txt");
//! let cache: DiskCache<str, String, _> = DiskCache::new(config, StringCodec)?;
//!
//! cache.put("https://example.com/a.png", &"64x64".to_string())?;
//! assert_eq!(cache.get("https://example.com/a.png")?.as_deref(), Some("64x64"));
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod core;

pub use crate::cache::codec::{BytesCodec, Codec, FnCodec, JsonCodec, StringCodec};
pub use crate::cache::config::CacheConfig;
pub use crate::cache::store::DiskCache;
pub use crate::core::error::{CacheError, Result};
pub use crate::core::hash::{DigestEncoding, HashAlgorithm};
