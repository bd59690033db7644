use std::collections::HashMap;

/// Prefix asking for an indefinite article: `a-animal` => `an owl`.
pub const ARTICLE_PREFIX: &str = "a-";

/// Suffix asking for a plural: `animal-s` => `owls`.
pub const PLURAL_SUFFIX: &str = "-s";

/// A placeholder key resolved against the vocabulary.
///
/// `lookup_key` is the vocabulary key left once modifiers are stripped;
/// the flags tell how each selected word must be formatted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyModifiers<'k> {
	pub lookup_key: &'k str,
	pub use_article: bool,
	pub pluralize: bool,
}

impl<'k> KeyModifiers<'k> {
	/// Resolves `key` against `vocabulary`.
	///
	/// - A leading `a-` is stripped and turns on the article.
	/// - A trailing `-s` is stripped and turns on the plural, but only when
	///   the stripped key exists in the vocabulary. Otherwise the suffix is
	///   kept as part of the key.
	///
	/// Returns `None` if the remaining key is not in the vocabulary.
	pub fn resolve<V>(key: &'k str, vocabulary: &HashMap<String, V>) -> Option<Self> {
		let (lookup_key, use_article) = match key.strip_prefix(ARTICLE_PREFIX) {
			Some(stripped) => (stripped, true),
			None => (key, false),
		};

		let (lookup_key, pluralize) = match lookup_key.strip_suffix(PLURAL_SUFFIX) {
			Some(stripped) if vocabulary.contains_key(stripped) => (stripped, true),
			_ => (lookup_key, false),
		};

		if !vocabulary.contains_key(lookup_key) {
			return None;
		}

		Some(Self {
			lookup_key,
			use_article,
			pluralize,
		})
	}

	/// Applies the article and plural flags to `word`.
	pub fn format(&self, word: &str) -> String {
		article_and_pluralize(self.use_article, self.pluralize, word)
	}
}

/// Returns true for `a`, `e`, `i`, `o`, `u`, in either case.
pub fn is_vowel(c: char) -> bool {
	matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Prefixes `word` with `a ` or `an ` and/or appends `s`.
///
/// The article is chosen from the first letter of the unmodified word.
pub fn article_and_pluralize(use_article: bool, pluralize: bool, word: &str) -> String {
	let mut formatted = String::with_capacity(word.len() + 4);
	if use_article {
		let article = match word.chars().next() {
			Some(c) if is_vowel(c) => "an ",
			_ => "a ",
		};
		formatted.push_str(article);
	}
	formatted.push_str(word);
	if pluralize {
		formatted.push('s');
	}
	formatted
}

/// Upper-cases the first word character, skipping leading apostrophes.
///
/// `'twas` becomes `'Twas`; a string starting with anything else than
/// apostrophes and a word character is returned unchanged.
pub fn capitalize(s: &str) -> String {
	let body = s.trim_start_matches('\'');
	let quotes = &s[..s.len() - body.len()];

	let mut chars = body.chars();
	match chars.next() {
		Some(first) if first.is_alphanumeric() || first == '_' => {
			let mut capitalized = String::with_capacity(s.len());
			capitalized.push_str(quotes);
			capitalized.extend(first.to_uppercase());
			capitalized.push_str(chars.as_str());
			capitalized
		}
		_ => s.to_owned(),
	}
}

/// Tells whether a placeholder preceded by `before` starts a sentence.
///
/// True at the very beginning of the text, or after `.`, `!`, `?` or `:`
/// followed by optional whitespace.
pub fn starts_sentence(before: &str) -> bool {
	before.is_empty() || before.trim_end().ends_with(['.', '!', '?', ':'])
}
