//! Cache module - The keyed disk cache and what plugs into it
//!
//! Provides:
//! - Cache configuration (base directory, prefix/suffix, hashing)
//! - The codec boundary and stock codecs
//! - The disk cache itself

pub mod codec;
pub mod config;
pub mod store;
