use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SentenceError};

/// Delimiter pair marking placeholders in a template.
///
/// Delimiters are matched as exact sequences: with `{{ }}`, the template
/// `{{noun}}` holds a placeholder but `{noun}` does not. A delimiter may be
/// repeated, so `{{noun}}` is also a placeholder under the default `{ }`.
///
/// # Invariants
/// - `start` and `end` are non-empty and contain no whitespace
/// - `start` and `end` contain no character allowed in a placeholder body
///   (ASCII letters, digits, `-` and `,`)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NotationInput")]
pub struct PlaceholderNotation {
	start: String,
	end: String,
}

impl PlaceholderNotation {
	/// Creates a notation from an explicit delimiter pair.
	///
	/// # Errors
	/// Returns `SentenceError::Configuration` if a delimiter is empty, or
	/// contains whitespace or a character allowed in keys.
	pub fn new(start: &str, end: &str) -> Result<Self> {
		for (name, delimiter) in [("start", start), ("end", end)] {
			if delimiter.is_empty() {
				return Err(SentenceError::Configuration(format!("placeholder {name} delimiter is empty")));
			}
			if delimiter.chars().any(char::is_whitespace) {
				return Err(SentenceError::Configuration(format!(
					"placeholder {name} delimiter '{delimiter}' contains whitespace"
				)));
			}
			if let Some(c) = delimiter.chars().find(|c| is_body_char(*c)) {
				return Err(SentenceError::Configuration(format!(
					"placeholder {name} delimiter '{delimiter}' contains '{c}', which is reserved for keys"
				)));
			}
		}

		Ok(Self {
			start: start.to_owned(),
			end: end.to_owned(),
		})
	}

	/// Parses a notation written as `"START END"`.
	///
	/// Examples: `"[ ]"`, `"{{ }}"`, `"%% (&"`.
	pub fn parse(notation: &str) -> Result<Self> {
		let parts: Vec<&str> = notation.split_whitespace().collect();
		match parts.as_slice() {
			[start, end] => Self::new(start, end),
			_ => Err(SentenceError::Configuration(format!(
				"placeholder notation '{notation}' must be two delimiters separated by whitespace"
			))),
		}
	}

	pub fn start(&self) -> &str {
		&self.start
	}

	pub fn end(&self) -> &str {
		&self.end
	}

	/// Surrounds `text` with the delimiters.
	pub fn wrap(&self, text: &str) -> String {
		format!("{}{}{}", self.start, text, self.end)
	}
}

/// Characters a placeholder body is made of, besides whitespace.
fn is_body_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '-' || c == ','
}

impl Default for PlaceholderNotation {
	fn default() -> Self {
		Self {
			start: "{".to_owned(),
			end: "}".to_owned(),
		}
	}
}

impl FromStr for PlaceholderNotation {
	type Err = SentenceError;

	fn from_str(s: &str) -> Result<Self> {
		Self::parse(s)
	}
}

impl fmt::Display for PlaceholderNotation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.start, self.end)
	}
}

/// Accepted shapes for a notation: `"START END"` or `{ "start", "end" }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum NotationInput {
	Text(String),
	Pair { start: String, end: String },
}

impl TryFrom<NotationInput> for PlaceholderNotation {
	type Error = SentenceError;

	fn try_from(value: NotationInput) -> Result<Self> {
		match value {
			NotationInput::Text(text) => Self::parse(&text),
			NotationInput::Pair { start, end } => Self::new(&start, &end),
		}
	}
}

/// Finds placeholders and their keys for a given notation.
///
/// A placeholder is one or more `start` delimiters, a body made of
/// letters, digits, hyphens, commas and whitespace, then one or more `end`
/// delimiters. Matching is case-insensitive.
///
/// ```text
/// "This is {a-adjective} example."        => ["{a-adjective}"]
/// "{a-adjective, a-curse, verb}" (keys)    => ["a-adjective", "a-curse", "verb"]
/// ```
#[derive(Clone, Debug)]
pub struct PlaceholderParser {
	notation: PlaceholderNotation,
	pattern: Regex,
}

impl PlaceholderParser {
	/// Compiles the placeholder pattern for `notation`.
	///
	/// # Errors
	/// Returns `SentenceError::Configuration` if the pattern does not compile.
	pub fn new(notation: PlaceholderNotation) -> Result<Self> {
		let pattern = format!(
			r"(?i)(?:{})+[\sa-z0-9,-]*(?:{})+",
			regex::escape(&notation.start),
			regex::escape(&notation.end)
		);
		let pattern = Regex::new(&pattern)
			.map_err(|e| SentenceError::Configuration(format!("invalid placeholder notation '{notation}': {e}")))?;

		Ok(Self { notation, pattern })
	}

	pub fn notation(&self) -> &PlaceholderNotation {
		&self.notation
	}

	/// Returns the placeholders of `template`, left to right.
	///
	/// The iterator is lazy; call again to rescan. A template without
	/// placeholders yields nothing.
	pub fn find_placeholders<'t>(&self, template: &'t str) -> impl Iterator<Item = &'t str> {
		self.pattern.find_iter(template).map(|m| m.as_str())
	}

	/// Returns the keys listed in `placeholder`, in order.
	///
	/// Delimiters and whitespace are removed, then the rest is split on
	/// commas. Listing a key twice keeps both occurrences.
	pub fn find_keys(&self, placeholder: &str) -> Vec<String> {
		let stripped = placeholder
			.replace(self.notation.start.as_str(), "")
			.replace(self.notation.end.as_str(), "");
		let stripped: String = stripped.chars().filter(|c| !c.is_whitespace()).collect();
		stripped.split(',').map(str::to_owned).collect()
	}
}
