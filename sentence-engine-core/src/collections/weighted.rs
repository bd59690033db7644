use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::range_tree::RangeTree;
use crate::error::{Result, SentenceError};

/// Pools up to this size are scanned linearly, bigger ones go through a `RangeTree`.
pub const LINEAR_SCAN_LIMIT: usize = 32;

/// Zero-argument function producing a string when its entry is selected.
pub type Thunk = Arc<dyn Fn() -> String + Send + Sync>;

/// A template or vocabulary value.
///
/// - `Literal`: a plain string.
/// - `Computed`: a function evaluated each time the entry is selected, so
///   a single entry can yield a different string per generation.
#[derive(Clone)]
pub enum Entry {
	Literal(String),
	Computed(Thunk),
}

impl Entry {
	/// Wraps a closure into a computed entry.
	pub fn computed<F>(f: F) -> Self
	where
		F: Fn() -> String + Send + Sync + 'static,
	{
		Entry::Computed(Arc::new(f))
	}

	/// Produces the string value, calling the function of a computed entry.
	pub fn resolve(&self) -> String {
		match self {
			Entry::Literal(s) => s.clone(),
			Entry::Computed(f) => f(),
		}
	}

	/// Returns the literal value, or `None` for a computed entry.
	pub fn as_literal(&self) -> Option<&str> {
		match self {
			Entry::Literal(s) => Some(s),
			Entry::Computed(_) => None,
		}
	}

	/// Identity used when merging duplicates.
	///
	/// Literals compare by content, computed entries by function identity.
	pub fn is_same(&self, other: &Self) -> bool {
		match (self, other) {
			(Entry::Literal(a), Entry::Literal(b)) => a == b,
			(Entry::Computed(a), Entry::Computed(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}
}

impl fmt::Debug for Entry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Entry::Literal(s) => f.debug_tuple("Literal").field(s).finish(),
			Entry::Computed(_) => f.write_str("Computed(<fn>)"),
		}
	}
}

impl From<&str> for Entry {
	fn from(value: &str) -> Self {
		Entry::Literal(value.to_owned())
	}
}

impl From<String> for Entry {
	fn from(value: String) -> Self {
		Entry::Literal(value)
	}
}

/// Anything that takes part in a weighted draw.
pub trait Weighted {
	/// Relative weight, always >= 1.
	fn weight(&self) -> u64;
}

/// An entry paired with its selection weight.
///
/// # Invariants
/// - `weight >= 1`: a weight of 0 is normalized to 1 on construction
#[derive(Clone, Debug, Deserialize)]
#[serde(from = "RawWeightedEntry")]
pub struct WeightedEntry {
	entry: Entry,
	weight: u32,
}

impl WeightedEntry {
	/// Creates a weighted entry, turning a zero weight into 1.
	pub fn new(entry: impl Into<Entry>, weight: u32) -> Self {
		Self {
			entry: entry.into(),
			weight: weight.max(1),
		}
	}

	pub fn entry(&self) -> &Entry {
		&self.entry
	}

	pub fn into_entry(self) -> Entry {
		self.entry
	}
}

impl Weighted for WeightedEntry {
	fn weight(&self) -> u64 {
		u64::from(self.weight)
	}
}

impl From<Entry> for WeightedEntry {
	fn from(value: Entry) -> Self {
		Self::new(value, 1)
	}
}

impl From<&str> for WeightedEntry {
	fn from(value: &str) -> Self {
		Self::new(value, 1)
	}
}

impl From<String> for WeightedEntry {
	fn from(value: String) -> Self {
		Self::new(value, 1)
	}
}

impl<E: Into<Entry>> From<(E, u32)> for WeightedEntry {
	fn from((entry, weight): (E, u32)) -> Self {
		Self::new(entry, weight)
	}
}

/// Wire shape of a weighted entry: a bare string or `{ "entry", "weight" }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawWeightedEntry {
	Plain(String),
	Weighted {
		entry: String,
		#[serde(default)]
		weight: u32,
	},
}

impl From<RawWeightedEntry> for WeightedEntry {
	fn from(value: RawWeightedEntry) -> Self {
		match value {
			RawWeightedEntry::Plain(entry) => Self::new(entry, 1),
			RawWeightedEntry::Weighted { entry, weight } => Self::new(entry, weight),
		}
	}
}

/// Serialized view of a literal entry with its weight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WeightedLiteral {
	pub entry: String,
	pub weight: u32,
}

impl WeightedEntry {
	/// Literal view for serialization, `None` for computed entries.
	pub fn to_literal(&self) -> Option<WeightedLiteral> {
		self.entry.as_literal().map(|entry| WeightedLiteral {
			entry: entry.to_owned(),
			weight: self.weight,
		})
	}
}

/// Appends `incoming` entries to `target`.
///
/// When `allow_duplicates` is false, an entry identical to one already
/// present (see `Entry::is_same`) is not appended: its weight is added to
/// the existing entry instead. Incoming entries are compared against each
/// other too, so `["a", "a"]` collapses to a single `a` of weight 2.
pub fn merge_entries<I, E>(target: &mut Vec<WeightedEntry>, incoming: I, allow_duplicates: bool)
where
	I: IntoIterator<Item = E>,
	E: Into<WeightedEntry>,
{
	for entry in incoming {
		let entry = entry.into();
		if !allow_duplicates {
			if let Some(existing) = target.iter_mut().find(|e| e.entry.is_same(&entry.entry)) {
				existing.weight = existing.weight.saturating_add(entry.weight);
				continue;
			}
		}
		target.push(entry);
	}
}

/// Sum of the weights of `entries`.
pub fn total_weight<W: Weighted>(entries: &[W]) -> u64 {
	entries.iter().map(Weighted::weight).sum()
}

/// Picks entries with a probability proportional to their weight.
///
/// A draw `r` is taken uniformly in `[1, total]`; the selected entry is the
/// first one at which the running sum of weights reaches `r`. Small pools
/// are scanned linearly, larger ones are looked up in a `RangeTree` at
/// position `r - 1`. Both strategies select the same entry for the same
/// draw.
pub struct WeightedSelector<'a, W> {
	entries: &'a [W],
	total: u64,
	tree: Option<Cow<'a, RangeTree<usize>>>,
}

impl<'a, W: Weighted> WeightedSelector<'a, W> {
	/// Creates a selector, choosing the lookup strategy from the pool size.
	///
	/// # Errors
	/// Returns `SentenceError::Resolution` if `entries` is empty.
	pub fn new(entries: &'a [W]) -> Result<Self> {
		if entries.len() > LINEAR_SCAN_LIMIT {
			Self::with_tree(entries)
		} else {
			Self::linear(entries)
		}
	}

	/// Creates a selector scanning entries linearly.
	pub fn linear(entries: &'a [W]) -> Result<Self> {
		Self::check_not_empty(entries)?;
		Ok(Self {
			entries,
			total: total_weight(entries),
			tree: None,
		})
	}

	/// Creates a selector backed by a range tree, whatever the pool size.
	pub fn with_tree(entries: &'a [W]) -> Result<Self> {
		Self::check_not_empty(entries)?;
		let tree = index_tree(entries);
		Ok(Self {
			entries,
			total: tree.max_position(),
			tree: Some(Cow::Owned(tree)),
		})
	}

	fn check_not_empty(entries: &[W]) -> Result<()> {
		if entries.is_empty() {
			return Err(SentenceError::Resolution("cannot pick from an empty set of entries".to_owned()));
		}
		Ok(())
	}

	pub fn total_weight(&self) -> u64 {
		self.total
	}

	/// Returns the entry selected by `draw`, expected in `[1, total_weight]`.
	///
	/// Returns `None` for a draw outside that range.
	pub fn select(&self, draw: u64) -> Option<&'a W> {
		if draw == 0 || draw > self.total {
			return None;
		}

		let entries = self.entries;
		match &self.tree {
			Some(tree) => tree.find(draw - 1).map(|index| &entries[*index]),
			None => {
				let mut remaining = draw;
				entries.iter().find(|entry| {
					let weight = entry.weight();
					if remaining <= weight {
						return true;
					}
					remaining -= weight;
					false
				})
			}
		}
	}

	/// Draws uniformly in `[1, total_weight]` and returns the selected entry.
	pub fn pick<R: Rng>(&self, rng: &mut R) -> Result<&'a W> {
		let draw = rng.random_range(1..=self.total);
		self.select(draw)
			.ok_or_else(|| SentenceError::Resolution(format!("draw {draw} is outside [1, {}]", self.total)))
	}
}

/// Range tree over entry indices, one range per entry.
fn index_tree<W: Weighted>(entries: &[W]) -> RangeTree<usize> {
	RangeTree::create(entries.iter().enumerate().map(|(index, e)| (index, e.weight())))
}

/// Normalized weighted entries, kept with their lookup index.
///
/// The range tree of a pool bigger than `LINEAR_SCAN_LIMIT` is built when
/// the entries change, not at each pick.
///
/// # Invariants
/// - `total` is the sum of the weights of `entries`
/// - `tree` is present iff `entries.len() > LINEAR_SCAN_LIMIT`, and covers
///   the current entries
#[derive(Clone, Debug, Default)]
pub struct WeightedList {
	entries: Vec<WeightedEntry>,
	total: u64,
	tree: Option<RangeTree<usize>>,
}

impl WeightedList {
	/// Normalizes `entries`, merging duplicates unless `allow_duplicates`.
	pub fn new<I, E>(entries: I, allow_duplicates: bool) -> Self
	where
		I: IntoIterator<Item = E>,
		E: Into<WeightedEntry>,
	{
		let mut list = Self::default();
		list.extend(entries, allow_duplicates);
		list
	}

	/// Appends entries like `merge_entries`, then refreshes the index.
	pub fn extend<I, E>(&mut self, incoming: I, allow_duplicates: bool)
	where
		I: IntoIterator<Item = E>,
		E: Into<WeightedEntry>,
	{
		merge_entries(&mut self.entries, incoming, allow_duplicates);
		self.reindex();
	}

	fn reindex(&mut self) {
		self.total = total_weight(&self.entries);
		self.tree = (self.entries.len() > LINEAR_SCAN_LIMIT).then(|| index_tree(&self.entries));
	}

	pub fn entries(&self) -> &[WeightedEntry] {
		&self.entries
	}

	pub fn total_weight(&self) -> u64 {
		self.total
	}

	pub fn has_tree(&self) -> bool {
		self.tree.is_some()
	}

	/// Selector over the entries, reusing the stored index.
	///
	/// # Errors
	/// Returns `SentenceError::Resolution` if the list is empty.
	pub fn selector(&self) -> Result<WeightedSelector<'_, WeightedEntry>> {
		WeightedSelector::<WeightedEntry>::check_not_empty(&self.entries)?;
		Ok(WeightedSelector {
			entries: &self.entries,
			total: self.total,
			tree: self.tree.as_ref().map(Cow::Borrowed),
		})
	}

	/// Picks an entry with a probability proportional to its weight.
	pub fn pick<R: Rng>(&self, rng: &mut R) -> Result<&WeightedEntry> {
		self.selector()?.pick(rng)
	}
}

impl Deref for WeightedList {
	type Target = [WeightedEntry];

	fn deref(&self) -> &Self::Target {
		&self.entries
	}
}

impl Weighted for WeightedList {
	fn weight(&self) -> u64 {
		self.total
	}
}

/// Picks one of `entries` with a probability proportional to its weight.
///
/// # Errors
/// Returns `SentenceError::Resolution` if `entries` is empty.
pub fn pick_by_weight<'a, W, R>(entries: &'a [W], rng: &mut R) -> Result<&'a W>
where
	W: Weighted,
	R: Rng,
{
	WeightedSelector::new(entries)?.pick(rng)
}

/// Picks one of `items` uniformly, ignoring weights.
///
/// Returns `None` if `items` is empty.
pub fn pick_uniform<'a, T, R>(items: &'a [T], rng: &mut R) -> Option<&'a T>
where
	R: Rng,
{
	items.choose(rng)
}
