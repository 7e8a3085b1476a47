//! Serialization boundary
//!
//! The cache never interprets entry contents. A [`Codec`] writes a value into
//! an open sink and reads one back from an open source; the cache owns the
//! streams and closes them.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::io::{self, Read, Write};
use std::marker::PhantomData;

/// Caller-supplied encode/decode pair for values of type `V` keyed by `K`
pub trait Codec<K: ?Sized, V> {
    /// Write a serialized form of `value` to `sink`
    fn encode(&self, key: &K, value: &V, sink: &mut dyn Write) -> Result<()>;

    /// Read a value back from `source`
    fn decode(&self, key: &K, source: &mut dyn Read) -> Result<V>;
}

/// Stores `Vec<u8>` values verbatim
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCodec;

impl<K: ?Sized> Codec<K, Vec<u8>> for BytesCodec {
    fn encode(&self, _key: &K, value: &Vec<u8>, sink: &mut dyn Write) -> Result<()> {
        sink.write_all(value)?;
        Ok(())
    }

    fn decode(&self, _key: &K, source: &mut dyn Read) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        source.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

/// Stores `String` values as UTF-8 text
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl<K: ?Sized> Codec<K, String> for StringCodec {
    fn encode(&self, _key: &K, value: &String, sink: &mut dyn Write) -> Result<()> {
        sink.write_all(value.as_bytes())?;
        Ok(())
    }

    fn decode(&self, _key: &K, source: &mut dyn Read) -> Result<String> {
        let mut buf = String::new();
        source
            .read_to_string(&mut buf)
            .context("reading text entry")?;
        Ok(buf)
    }
}

/// Stores any serde value as JSON
pub struct JsonCodec<V> {
    pretty: bool,
    _value: PhantomData<fn() -> V>,
}

impl<V> JsonCodec<V> {
    pub fn new() -> Self {
        Self {
            pretty: false,
            _value: PhantomData,
        }
    }

    /// Indent the stored JSON
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            _value: PhantomData,
        }
    }
}

impl<V> Default for JsonCodec<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for JsonCodec<V> {
    fn clone(&self) -> Self {
        Self {
            pretty: self.pretty,
            _value: PhantomData,
        }
    }
}

impl<V> fmt::Debug for JsonCodec<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonCodec")
            .field("pretty", &self.pretty)
            .finish()
    }
}

impl<K: ?Sized, V: Serialize + DeserializeOwned> Codec<K, V> for JsonCodec<V> {
    fn encode(&self, _key: &K, value: &V, sink: &mut dyn Write) -> Result<()> {
        let written = if self.pretty {
            serde_json::to_writer_pretty(sink, value)
        } else {
            serde_json::to_writer(sink, value)
        };
        written.map_err(|e| json_error(e, "serializing JSON entry"))
    }

    fn decode(&self, _key: &K, source: &mut dyn Read) -> Result<V> {
        serde_json::from_reader(source).map_err(|e| json_error(e, "invalid JSON entry"))
    }
}

/// Stream failures go back as plain `io::Error`, everything else gets `context`
fn json_error(err: serde_json::Error, context: &'static str) -> anyhow::Error {
    if err.is_io() {
        io::Error::from(err).into()
    } else {
        anyhow::Error::new(err).context(context)
    }
}

/// Codec built from a pair of closures
pub struct FnCodec<E, D> {
    encode: E,
    decode: D,
}

impl<E, D> FnCodec<E, D> {
    pub fn new(encode: E, decode: D) -> Self {
        Self { encode, decode }
    }
}

impl<E, D> fmt::Debug for FnCodec<E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCodec").finish_non_exhaustive()
    }
}

impl<K: ?Sized, V, E, D> Codec<K, V> for FnCodec<E, D>
where
    E: Fn(&K, &V, &mut dyn Write) -> Result<()>,
    D: Fn(&K, &mut dyn Read) -> Result<V>,
{
    fn encode(&self, key: &K, value: &V, sink: &mut dyn Write) -> Result<()> {
        (self.encode)(key, value, sink)
    }

    fn decode(&self, key: &K, source: &mut dyn Read) -> Result<V> {
        (self.decode)(key, source)
    }
}
