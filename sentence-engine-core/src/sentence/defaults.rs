use super::config::{Configuration, TemplateInput, VocabularyInput, vocabulary_from};
use super::options::Options;

/// Template used when none is given.
pub const TEMPLATES: [&str; 1] = ["{greeting}, {noun}. I am the {default} Sentence{self}."];

/// Vocabulary used when none is given.
pub const VOCABULARY: [(&str, &[&str]); 4] = [
	("greeting", &["hello", "greetings"]),
	("noun", &["world", "user"]),
	("default", &["default", "example"]),
	("self", &["Factory", "Engine", "r"]),
];

pub fn templates() -> TemplateInput {
	TEMPLATES.into_iter().collect()
}

pub fn vocabulary() -> VocabularyInput {
	vocabulary_from(VOCABULARY.iter().map(|(key, alternatives)| (*key, alternatives.iter().copied())))
}

pub fn options() -> Options {
	Options::default()
}

/// The full default configuration: templates, vocabulary and options.
pub fn configuration() -> Configuration {
	Configuration {
		templates: Some(templates()),
		vocabulary: Some(vocabulary()),
		options: Some(options().into()),
	}
}
