use serde::{Deserialize, Serialize};

use super::placeholder::PlaceholderNotation;

/// Options controlling how the engine stores entries and builds sentences.
///
/// Serialized with camelCase names (`allowDuplicates`, `forceNewSentence`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
	/// Keep identical entries separate. When false, duplicates collapse
	/// into a single entry whose weight is the sum of theirs.
	pub allow_duplicates: bool,

	/// Upper-case a replacement that starts the sentence, or follows
	/// `.`, `!`, `?` or `:`.
	pub capitalize: bool,

	/// Regenerate until the output differs from the previous one, when a
	/// different output is reachable at all.
	pub force_new_sentence: bool,

	/// Delimiters of placeholders.
	pub placeholder_notation: PlaceholderNotation,

	/// Emit replacements wrapped in the delimiters instead of bare.
	pub preserve_placeholder_notation: bool,
}

impl Default for Options {
	fn default() -> Self {
		Self {
			allow_duplicates: true,
			capitalize: true,
			force_new_sentence: false,
			placeholder_notation: PlaceholderNotation::default(),
			preserve_placeholder_notation: false,
		}
	}
}

impl Options {
	/// Overwrites the fields set in `patch`, leaving the others untouched.
	pub fn apply(&mut self, patch: &OptionsPatch) {
		if let Some(allow_duplicates) = patch.allow_duplicates {
			self.allow_duplicates = allow_duplicates;
		}
		if let Some(capitalize) = patch.capitalize {
			self.capitalize = capitalize;
		}
		if let Some(force_new_sentence) = patch.force_new_sentence {
			self.force_new_sentence = force_new_sentence;
		}
		if let Some(notation) = &patch.placeholder_notation {
			self.placeholder_notation = notation.clone();
		}
		if let Some(preserve) = patch.preserve_placeholder_notation {
			self.preserve_placeholder_notation = preserve;
		}
	}
}

/// A partial set of options, merged shallowly over current ones.
///
/// `placeholderNotation` accepts `"START END"` as well as `{ start, end }`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptionsPatch {
	pub allow_duplicates: Option<bool>,
	pub capitalize: Option<bool>,
	pub force_new_sentence: Option<bool>,
	pub placeholder_notation: Option<PlaceholderNotation>,
	pub preserve_placeholder_notation: Option<bool>,
}

impl OptionsPatch {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn allow_duplicates(mut self, value: bool) -> Self {
		self.allow_duplicates = Some(value);
		self
	}

	pub fn capitalize(mut self, value: bool) -> Self {
		self.capitalize = Some(value);
		self
	}

	pub fn force_new_sentence(mut self, value: bool) -> Self {
		self.force_new_sentence = Some(value);
		self
	}

	pub fn placeholder_notation(mut self, value: PlaceholderNotation) -> Self {
		self.placeholder_notation = Some(value);
		self
	}

	pub fn preserve_placeholder_notation(mut self, value: bool) -> Self {
		self.preserve_placeholder_notation = Some(value);
		self
	}

	/// Returns `self` with the fields set in `other` taking precedence.
	pub fn merge(self, other: &OptionsPatch) -> OptionsPatch {
		OptionsPatch {
			allow_duplicates: other.allow_duplicates.or(self.allow_duplicates),
			capitalize: other.capitalize.or(self.capitalize),
			force_new_sentence: other.force_new_sentence.or(self.force_new_sentence),
			placeholder_notation: other.placeholder_notation.clone().or(self.placeholder_notation),
			preserve_placeholder_notation: other.preserve_placeholder_notation.or(self.preserve_placeholder_notation),
		}
	}
}

impl From<Options> for OptionsPatch {
	fn from(options: Options) -> Self {
		Self {
			allow_duplicates: Some(options.allow_duplicates),
			capitalize: Some(options.capitalize),
			force_new_sentence: Some(options.force_new_sentence),
			placeholder_notation: Some(options.placeholder_notation),
			preserve_placeholder_notation: Some(options.preserve_placeholder_notation),
		}
	}
}
