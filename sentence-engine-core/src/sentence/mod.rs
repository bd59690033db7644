//! Sentence generation from weighted templates and vocabulary.
//!
//! - Placeholder notation and parsing (`placeholder`)
//! - `a-` / `-s` key modifiers and word formatting (`modifier`)
//! - Engine options (`options`) and raw configuration input (`config`)
//! - The generation engine itself (`engine`)
//! - Built-in defaults and a factory holding them (`defaults`, `factory`)

/// The sentence engine: state, mutation and generation.
pub mod engine;

/// Placeholder notation, placeholder and key extraction.
pub mod placeholder;

/// Key modifiers (`a-key`, `key-s`) and word formatting helpers.
pub mod modifier;

/// Engine options and partial options.
pub mod options;

/// Raw configuration input, as accepted from callers or JSON.
pub mod config;

/// Built-in default templates, vocabulary and options.
pub mod defaults;

/// Factory creating engines from shared defaults.
pub mod factory;
