use thiserror::Error;

/// The common error type used by this crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SentenceError {
	/// The engine was handed a configuration it cannot work with
	/// (empty delimiters, empty template list, empty vocabulary key, bad input shape)
	#[error("Invalid configuration: {0}")]
	Configuration(String),

	/// A selection could not produce a value, most often because every key
	/// listed in a placeholder is missing from the vocabulary
	#[error("Cannot resolve: {0}")]
	Resolution(String),
}

impl From<serde_json::Error> for SentenceError {
	fn from(value: serde_json::Error) -> Self {
		SentenceError::Configuration(format!("{value}"))
	}
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SentenceError>;
