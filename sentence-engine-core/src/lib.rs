//! Template-based random sentence generation library.
//!
//! This crate provides a weighted template engine including:
//! - Placeholder parsing with a configurable notation (`{key}` by default)
//! - Key modifiers for articles (`a-key`) and plurals (`key-s`)
//! - Weighted random selection over templates and vocabulary entries
//! - Lazily computed entries, resolved only when they are selected
//!
//! The entry point is `sentence::engine::SentenceEngine`, usually built
//! through `sentence::factory::SentenceFactory`.

/// Weighted collections and selection primitives.
///
/// Holds the entry types shared by templates and vocabulary, and the
/// range tree used to select among large weighted pools.
pub mod collections;

/// Error type shared by every fallible operation of the crate.
pub mod error;

/// Sentence generation: parsing, key modifiers, options and the engine.
pub mod sentence;

pub use error::{Result, SentenceError};
