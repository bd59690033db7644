//! Weighted collections used by the sentence engine.
//!
//! - `Entry` / `WeightedEntry`: literal or computed values with a weight
//! - `WeightedList`: normalized entries keeping their lookup index
//! - `WeightedSelector`: proportional random selection
//! - `RangeTree`: balanced lookup over cumulative weight ranges

/// Balanced binary tree over half-open position ranges.
pub mod range_tree;

/// Entries, weight merging and weighted selection.
pub mod weighted;
