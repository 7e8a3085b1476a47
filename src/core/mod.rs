//! Core module - Building blocks shared by the cache
//!
//! This module provides:
//! - Typed errors
//! - Key hashing and digest rendering
//! - Entry filename layout and directory scanning

pub mod error;
pub mod hash;
pub mod naming;
