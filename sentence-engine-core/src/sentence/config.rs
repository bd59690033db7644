use std::collections::HashMap;

use serde::Deserialize;

use super::options::OptionsPatch;
use crate::collections::weighted::WeightedEntry;
use crate::error::{Result, SentenceError};

/// Raw vocabulary: key => alternatives, weights not merged yet.
pub type VocabularyInput = HashMap<String, Vec<WeightedEntry>>;

/// Raw templates: a single template or a list of them.
///
/// Deserializes from `"tpl"`, `["tpl", ...]` or a list mixing strings and
/// `{ "entry": "tpl", "weight": n }` objects.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(from = "OneOrMany")]
pub struct TemplateInput(Vec<WeightedEntry>);

impl TemplateInput {
	pub fn entries(&self) -> &[WeightedEntry] {
		&self.0
	}

	pub fn into_entries(self) -> Vec<WeightedEntry> {
		self.0
	}
}

impl<E: Into<WeightedEntry>> FromIterator<E> for TemplateInput {
	fn from_iter<T: IntoIterator<Item = E>>(iter: T) -> Self {
		Self(iter.into_iter().map(Into::into).collect())
	}
}

impl From<&str> for TemplateInput {
	fn from(value: &str) -> Self {
		Self(vec![value.into()])
	}
}

impl From<Vec<WeightedEntry>> for TemplateInput {
	fn from(value: Vec<WeightedEntry>) -> Self {
		Self(value)
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
	One(WeightedEntry),
	Many(Vec<WeightedEntry>),
}

impl From<OneOrMany> for TemplateInput {
	fn from(value: OneOrMany) -> Self {
		match value {
			OneOrMany::One(entry) => Self(vec![entry]),
			OneOrMany::Many(entries) => Self(entries),
		}
	}
}

/// Builds a raw vocabulary from `(key, alternatives)` pairs.
pub fn vocabulary_from<K, I, E>(vocabulary: impl IntoIterator<Item = (K, I)>) -> VocabularyInput
where
	K: Into<String>,
	I: IntoIterator<Item = E>,
	E: Into<WeightedEntry>,
{
	vocabulary
		.into_iter()
		.map(|(key, alternatives)| (key.into(), alternatives.into_iter().map(Into::into).collect()))
		.collect()
}

/// Checks that there is at least one template to pick from.
pub fn validate_templates(templates: &[WeightedEntry]) -> Result<()> {
	if templates.is_empty() {
		return Err(SentenceError::Configuration("at least one template is required".to_owned()));
	}
	Ok(())
}

/// Checks that every vocabulary key has at least one alternative.
pub fn validate_vocabulary(vocabulary: &VocabularyInput) -> Result<()> {
	if let Some((key, _)) = vocabulary.iter().find(|(_, alternatives)| alternatives.is_empty()) {
		return Err(SentenceError::Configuration(format!("vocabulary key '{key}' has no alternatives")));
	}
	Ok(())
}

/// A partial engine configuration.
///
/// Fields left to `None` keep their current value when applied.
///
/// ```json
/// {
///   "templates": ["Let's {verb} this."],
///   "vocabulary": { "verb": ["try", { "entry": "do", "weight": 3 }] },
///   "options": { "placeholderNotation": "[ ]" }
/// }
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Configuration {
	pub templates: Option<TemplateInput>,
	pub vocabulary: Option<VocabularyInput>,
	pub options: Option<OptionsPatch>,
}

impl Configuration {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a configuration from JSON.
	///
	/// # Errors
	/// Returns `SentenceError::Configuration` if the JSON does not have the
	/// expected shape or holds an invalid notation.
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}

	pub fn templates<I, E>(mut self, templates: I) -> Self
	where
		I: IntoIterator<Item = E>,
		E: Into<WeightedEntry>,
	{
		self.templates = Some(templates.into_iter().collect());
		self
	}

	pub fn vocabulary<K, I, E>(mut self, vocabulary: impl IntoIterator<Item = (K, I)>) -> Self
	where
		K: Into<String>,
		I: IntoIterator<Item = E>,
		E: Into<WeightedEntry>,
	{
		self.vocabulary = Some(vocabulary_from(vocabulary));
		self
	}

	pub fn options(mut self, options: OptionsPatch) -> Self {
		self.options = Some(options);
		self
	}

	/// Checks the parts that are present.
	pub fn validate(&self) -> Result<()> {
		if let Some(templates) = &self.templates {
			validate_templates(templates.entries())?;
		}
		if let Some(vocabulary) = &self.vocabulary {
			validate_vocabulary(vocabulary)?;
		}
		Ok(())
	}
}
