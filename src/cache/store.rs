//! Disk cache - One file per key under a base directory
//!
//! The filesystem is the only index: an entry exists exactly when its file
//! does. There is no locking, so concurrent writers to the same key (or a
//! `clear` racing a `put`) can observe partially written files.

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::{debug, error, trace, warn};

use crate::cache::codec::Codec;
use crate::cache::config::CacheConfig;
use crate::core::error::{CacheError, Result};
use crate::core::hash::{HashAlgorithm, Hasher};
use crate::core::naming::EntryNames;

/// Keyed on-disk cache.
///
/// Keys are identified by the hash of their `Display` form; two keys with
/// the same digest share one entry. Values are written and read by the codec.
pub struct DiskCache<K: ?Sized, V, C> {
    base_dir: PathBuf,
    names: EntryNames,
    hasher: Hasher,
    codec: C,
    _types: PhantomData<fn(&K) -> V>,
}

impl<K, V, C> DiskCache<K, V, C>
where
    K: Display + ?Sized,
    C: Codec<K, V>,
{
    /// Build a cache over an existing directory.
    ///
    /// Fails with [`CacheError::NoHashAlgorithm`] when none of the configured
    /// algorithms is compiled in. The directory itself is not checked.
    pub fn new(config: CacheConfig, codec: C) -> Result<Self> {
        let hasher = Hasher::select(&config.algorithms, config.encoding)?;
        let names = EntryNames::new(config.prefix, config.suffix);

        debug!(
            base_dir = %config.base_dir.display(),
            algorithm = %hasher.algorithm(),
            encoding = ?hasher.encoding(),
            "opened disk cache"
        );

        Ok(Self {
            base_dir: config.base_dir,
            names,
            hasher,
            codec,
            _types: PhantomData,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn prefix(&self) -> Option<&str> {
        self.names.prefix()
    }

    pub fn suffix(&self) -> Option<&str> {
        self.names.suffix()
    }

    /// The algorithm picked at construction
    pub fn algorithm(&self) -> HashAlgorithm {
        self.hasher.algorithm()
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Entry file name (no directory) for a key
    pub fn file_name_for(&self, key: &K) -> String {
        self.names.file_name(&self.hasher.hash_str(&key.to_string()))
    }

    /// Full path of the entry file for a key
    pub fn filename_for(&self, key: &K) -> PathBuf {
        self.base_dir.join(self.file_name_for(key))
    }

    /// Write `value` under `key`, replacing any previous entry.
    ///
    /// Not atomic: a failure part way through leaves a truncated file.
    pub fn put(&self, key: &K, value: &V) -> Result<()> {
        let path = self.filename_for(key);
        let file = File::create(&path).map_err(|e| CacheError::io(&path, e))?;
        let mut writer = BufWriter::new(file);

        self.codec
            .encode(key, value, &mut writer)
            .map_err(|e| CacheError::from_codec(&path, e))?;
        writer.flush().map_err(|e| CacheError::io(&path, e))?;

        debug!(path = %path.display(), "wrote cache entry");
        Ok(())
    }

    /// Read the value stored under `key`. `Ok(None)` is a plain miss.
    pub fn get(&self, key: &K) -> Result<Option<V>> {
        let path = self.filename_for(key);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io(&path, e)),
        };

        let mut reader = BufReader::new(file);
        let value = self
            .codec
            .decode(key, &mut reader)
            .map_err(|e| CacheError::from_codec(&path, e))?;

        trace!(path = %path.display(), "cache hit");
        Ok(Some(value))
    }

    /// Like [`put`](Self::put), but failures are only logged
    pub fn put_lenient(&self, key: &K, value: &V) {
        if let Err(err) = self.put(key, value) {
            warn!(error = %err, "failed to write cache entry");
        }
    }

    /// Like [`get`](Self::get), but failures are logged and read as a miss
    pub fn get_lenient(&self, key: &K) -> Option<V> {
        self.get(key).unwrap_or_else(|err| {
            warn!(error = %err, "failed to read cache entry");
            None
        })
    }

    /// Whether an entry file exists for `key`
    pub fn contains(&self, key: &K) -> bool {
        self.filename_for(key).exists()
    }

    /// Delete the entry for `key`. Returns false if there was none.
    pub fn remove(&self, key: &K) -> Result<bool> {
        let path = self.filename_for(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "removed cache entry");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::io(&path, e)),
        }
    }

    /// Paths of every entry currently in the base directory
    pub fn entry_paths(&self) -> Result<Vec<PathBuf>> {
        self.names.scan(&self.base_dir)
    }

    /// Delete every matching entry.
    ///
    /// Keeps going past failures and returns false if any deletion failed,
    /// in which case the cache may be partially cleared. Only a failure to
    /// list the base directory is returned as an error.
    pub fn clear(&self) -> Result<bool> {
        let mut success = true;

        for path in self.entry_paths()? {
            match fs::remove_file(&path) {
                Ok(()) => {}
                // already gone
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    error!(path = %path.display(), error = %e, "error deleting cache file");
                    success = false;
                }
            }
        }

        Ok(success)
    }

    /// Number of matching entries, counted fresh on every call
    pub fn size(&self) -> Result<usize> {
        Ok(self.entry_paths()?.len())
    }
}

impl<K: ?Sized, V, C: std::fmt::Debug> std::fmt::Debug for DiskCache<K, V, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskCache")
            .field("base_dir", &self.base_dir)
            .field("names", &self.names)
            .field("hasher", &self.hasher)
            .field("codec", &self.codec)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::codec::{BytesCodec, StringCodec};
    use crate::core::hash::DigestEncoding;
    use tempfile::tempdir;

    fn string_cache(dir: &Path) -> DiskCache<str, String, StringCodec> {
        DiskCache::new(CacheConfig::new(dir), StringCodec).unwrap()
    }

    #[test]
    fn test_new_without_algorithms_fails() {
        let temp = tempdir().unwrap();
        let config = CacheConfig::new(temp.path()).with_algorithms([]);
        let result: Result<DiskCache<str, String, StringCodec>> = DiskCache::new(config, StringCodec);
        assert!(matches!(result, Err(CacheError::NoHashAlgorithm { .. })));
    }

    #[cfg(feature = "sha1")]
    #[test]
    fn test_filename_layout() {
        let temp = tempdir().unwrap();
        let config = CacheConfig::new(temp.path()).with_prefix("p_").with_suffix(".c");
        let cache: DiskCache<str, String, _> = DiskCache::new(config, StringCodec).unwrap();

        assert_eq!(
            cache.filename_for("hello"),
            temp.path().join("p_aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d.c")
        );
        assert_eq!(cache.filename_for("hello"), cache.filename_for("hello"));
    }

    #[cfg(feature = "sha1")]
    #[test]
    fn test_legacy_filename_layout() {
        let temp = tempdir().unwrap();
        let config = CacheConfig::new(temp.path()).with_encoding(DigestEncoding::LegacySigned);
        let cache: DiskCache<str, String, _> = DiskCache::new(config, StringCodec).unwrap();

        assert_eq!(
            cache.file_name_for("hello"),
            "-550b39e2233a175d254121f0c4b7d3265156bcb3"
        );
    }

    #[test]
    fn test_key_uses_display_form() {
        let temp = tempdir().unwrap();
        let cache: DiskCache<u32, Vec<u8>, _> =
            DiskCache::new(CacheConfig::new(temp.path()), BytesCodec).unwrap();
        let by_str: DiskCache<str, Vec<u8>, _> =
            DiskCache::new(CacheConfig::new(temp.path()), BytesCodec).unwrap();

        assert_eq!(cache.filename_for(&42), by_str.filename_for("42"));
    }

    #[test]
    fn test_put_get() {
        let temp = tempdir().unwrap();
        let cache = string_cache(temp.path());

        cache.put("k", &"value".to_string()).unwrap();
        assert_eq!(cache.get("k").unwrap().as_deref(), Some("value"));
        assert!(cache.contains("k"));
    }

    #[test]
    fn test_get_miss() {
        let temp = tempdir().unwrap();
        let cache = string_cache(temp.path());
        assert_eq!(cache.get("never").unwrap(), None);
        assert!(!cache.contains("never"));
    }

    #[test]
    fn test_put_into_missing_dir_is_io_error() {
        let temp = tempdir().unwrap();
        let cache = string_cache(&temp.path().join("missing"));

        let err = cache.put("k", &"v".to_string()).unwrap_err();
        assert!(err.is_not_found());
        // lenient variant swallows it
        cache.put_lenient("k", &"v".to_string());
    }

    #[test]
    fn test_get_unreadable_entry() {
        let temp = tempdir().unwrap();
        let cache = string_cache(temp.path());

        // a directory where the entry file should be cannot be read as one
        fs::create_dir(cache.filename_for("k")).unwrap();
        assert!(cache.get("k").is_err());
        assert_eq!(cache.get_lenient("k"), None);
    }

    #[test]
    fn test_remove() {
        let temp = tempdir().unwrap();
        let cache = string_cache(temp.path());

        cache.put("k", &"v".to_string()).unwrap();
        assert!(cache.remove("k").unwrap());
        assert!(!cache.remove("k").unwrap());
        assert_eq!(cache.get("k").unwrap(), None);
    }

    #[test]
    fn test_size_and_clear() {
        let temp = tempdir().unwrap();
        let cache = string_cache(temp.path());

        for key in ["a", "b", "c"] {
            cache.put(key, &key.to_string()).unwrap();
        }
        assert_eq!(cache.size().unwrap(), 3);
        assert_eq!(cache.entry_paths().unwrap().len(), 3);

        assert!(cache.clear().unwrap());
        assert_eq!(cache.size().unwrap(), 0);
    }

    #[test]
    fn test_size_of_missing_dir_is_error() {
        let temp = tempdir().unwrap();
        let cache = string_cache(&temp.path().join("missing"));
        assert!(cache.size().is_err());
        assert!(cache.clear().is_err());
    }
}
