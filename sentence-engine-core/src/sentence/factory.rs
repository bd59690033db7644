use log::debug;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::config::{Configuration, TemplateInput, VocabularyInput};
use super::defaults;
use super::engine::SentenceEngine;
use super::options::OptionsPatch;
use crate::collections::weighted::WeightedEntry;
use crate::error::Result;

/// Creates engines from a shared set of default templates, vocabulary and options.
///
/// Whatever a call to `create_sentence` leaves out is taken from the
/// factory; options are merged field by field over the factory options.
#[derive(Clone, Debug)]
pub struct SentenceFactory {
	default_templates: TemplateInput,
	default_vocabulary: VocabularyInput,
	default_options: OptionsPatch,
}

impl Default for SentenceFactory {
	fn default() -> Self {
		Self {
			default_templates: defaults::templates(),
			default_vocabulary: defaults::vocabulary(),
			default_options: OptionsPatch::default(),
		}
	}
}

impl SentenceFactory {
	/// Creates a factory with its own defaults.
	pub fn new(templates: TemplateInput, vocabulary: VocabularyInput, options: OptionsPatch) -> Self {
		Self {
			default_templates: templates,
			default_vocabulary: vocabulary,
			default_options: options,
		}
	}

	/// Creates an engine and generates its first sentence.
	///
	/// # Errors
	/// Returns an error if the resulting configuration is invalid or the
	/// first generation fails.
	pub fn create_sentence(&self, config: Configuration) -> Result<SentenceEngine> {
		self.create_sentence_with_rng(config, StdRng::from_os_rng())
	}

	/// Same as `create_sentence`, drawing from `rng`.
	pub fn create_sentence_with_rng<R: Rng>(&self, config: Configuration, rng: R) -> Result<SentenceEngine<R>> {
		let options = match &config.options {
			Some(options) => self.default_options.clone().merge(options),
			None => self.default_options.clone(),
		};
		let config = Configuration {
			templates: Some(config.templates.unwrap_or_else(|| self.default_templates.clone())),
			vocabulary: Some(config.vocabulary.unwrap_or_else(|| self.default_vocabulary.clone())),
			options: Some(options),
		};

		let mut engine = SentenceEngine::with_rng(config, rng)?;
		engine.generate()?;
		Ok(engine)
	}

	/// Replaces the defaults given in `config`; options are merged.
	pub fn configure(&mut self, config: Configuration) -> Result<&mut Self> {
		config.validate()?;
		if let Some(options) = &config.options {
			self.default_options = self.default_options.clone().merge(options);
		}
		if let Some(templates) = config.templates {
			self.default_templates = templates;
		}
		if let Some(vocabulary) = config.vocabulary {
			self.default_vocabulary = vocabulary;
		}
		debug!("Factory defaults configured");
		Ok(self)
	}

	pub fn add_default_options(&mut self, options: &OptionsPatch) -> &mut Self {
		self.default_options = self.default_options.clone().merge(options);
		self
	}

	/// Appends templates to the default ones.
	pub fn add_default_templates<I, E>(&mut self, templates: I) -> &mut Self
	where
		I: IntoIterator<Item = E>,
		E: Into<WeightedEntry>,
	{
		let mut entries = std::mem::take(&mut self.default_templates).into_entries();
		entries.extend(templates.into_iter().map(Into::into));
		self.default_templates = entries.into();
		self
	}

	/// Appends alternatives to the default vocabulary, key by key.
	pub fn add_default_vocabulary(&mut self, vocabulary: VocabularyInput) -> &mut Self {
		for (key, alternatives) in vocabulary {
			self.default_vocabulary.entry(key).or_default().extend(alternatives);
		}
		self
	}

	/// Puts the built-in defaults back and forgets default options.
	pub fn restore_defaults(&mut self) -> &mut Self {
		*self = Self::default();
		self
	}

	pub fn default_templates(&self) -> &TemplateInput {
		&self.default_templates
	}

	pub fn default_vocabulary(&self) -> &VocabularyInput {
		&self.default_vocabulary
	}

	pub fn default_options(&self) -> &OptionsPatch {
		&self.default_options
	}
}
