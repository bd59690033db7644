use std::collections::{HashMap, HashSet};

use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::{Configuration, VocabularyInput, validate_vocabulary};
use super::defaults;
use super::modifier::{self, KeyModifiers, article_and_pluralize, starts_sentence};
use super::options::Options;
use super::placeholder::PlaceholderParser;
use crate::collections::weighted::{Entry, Weighted, WeightedEntry, WeightedList, pick_by_weight};
use crate::error::{Result, SentenceError};

/// Upper bound of attempts when `force_new_sentence` depends on computed
/// entries that may keep producing the previous value.
pub const FORCE_NEW_SENTENCE_MAX_TRIES: usize = 256;

/// Vocabulary as stored by the engine: key => merged weighted alternatives.
pub type WeightedVocabulary = HashMap<String, WeightedList>;

/// Lifecycle of an engine.
///
/// An engine is `Configured` once built; the first successful `generate`
/// moves it to `Generated`, where it stays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
	Configured,
	Generated,
}

/// What regenerating can change, from least to most certain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Variety {
	/// Every generation yields the same sentence.
	Fixed,
	/// Only computed entries may vary; their output is unknown upfront.
	Computed,
	/// Distinct literal outcomes exist.
	Literal,
}

/// Random sentence generator.
///
/// Holds weighted templates, a weighted vocabulary and options. Each call
/// to `generate` picks a template by weight, then replaces each of its
/// placeholders with a weighted pick among the alternatives of the keys it
/// lists.
///
/// # Responsibilities
/// - Keep templates and vocabulary normalized (weights >= 1, duplicates
///   merged when `allow_duplicates` is off)
/// - Resolve placeholders, applying `a-` / `-s` modifiers, capitalization
///   and notation preservation
/// - Retry generation when `force_new_sentence` asks for a new value
///
/// # Invariants
/// - There is always at least one template
/// - Every vocabulary key has at least one alternative
///
/// The engine is not synchronized: share it behind a `Mutex` if needed.
#[derive(Debug)]
pub struct SentenceEngine<R = StdRng> {
	templates: WeightedList,
	vocabulary: WeightedVocabulary,
	options: Options,
	parser: PlaceholderParser,
	value: Option<String>,
	rng: R,
}

impl SentenceEngine<StdRng> {
	/// Creates an engine seeded from the operating system.
	///
	/// Parts missing from `config` fall back to the built-in defaults
	/// (see `defaults`).
	///
	/// # Errors
	/// Returns `SentenceError::Configuration` if `config` is invalid.
	pub fn new(config: Configuration) -> Result<Self> {
		Self::with_rng(config, StdRng::from_os_rng())
	}
}

impl<R: Rng> SentenceEngine<R> {
	/// Creates an engine drawing from `rng`.
	///
	/// Passing a seeded generator makes generation reproducible.
	pub fn with_rng(config: Configuration, rng: R) -> Result<Self> {
		let options = defaults::options();
		let mut engine = Self {
			templates: WeightedList::new(defaults::templates().into_entries(), options.allow_duplicates),
			vocabulary: HashMap::new(),
			parser: PlaceholderParser::new(options.placeholder_notation.clone())?,
			options,
			value: None,
			rng,
		};
		engine.vocabulary = engine.weigh_vocabulary(defaults::vocabulary());
		engine.configure(config)?;
		Ok(engine)
	}

	/// Applies a partial configuration.
	///
	/// - Options are merged over the current ones; they are applied first,
	///   so `allow_duplicates` given here already governs the new entries.
	/// - Templates and vocabulary, when given, replace the current ones.
	///
	/// Nothing is regenerated. On error the engine is left untouched.
	///
	/// # Errors
	/// Returns `SentenceError::Configuration` for an empty template list, a
	/// vocabulary key without alternatives, or an unusable notation.
	pub fn configure(&mut self, config: Configuration) -> Result<&mut Self> {
		config.validate()?;
		let Configuration {
			templates,
			vocabulary,
			options,
		} = config;

		let mut next_options = self.options.clone();
		if let Some(patch) = &options {
			next_options.apply(patch);
		}
		let parser = if next_options.placeholder_notation != self.options.placeholder_notation {
			Some(PlaceholderParser::new(next_options.placeholder_notation.clone())?)
		} else {
			None
		};

		self.options = next_options;
		if let Some(parser) = parser {
			self.parser = parser;
		}
		if let Some(templates) = templates {
			self.templates = WeightedList::new(templates.into_entries(), self.options.allow_duplicates);
		}
		if let Some(vocabulary) = vocabulary {
			self.vocabulary = self.weigh_vocabulary(vocabulary);
		}

		debug!(
			"Configured: {} template(s), {} vocabulary key(s), options {:?}",
			self.templates.len(),
			self.vocabulary.len(),
			self.options
		);
		Ok(self)
	}

	/// Adds templates after the current ones.
	///
	/// With `allow_duplicates` off, a template already present gets the
	/// added weight instead of a new entry.
	pub fn add_templates<I, E>(&mut self, templates: I) -> &mut Self
	where
		I: IntoIterator<Item = E>,
		E: Into<WeightedEntry>,
	{
		self.templates.extend(templates, self.options.allow_duplicates);
		debug!("Templates added, {} in total", self.templates.len());
		self
	}

	/// Adds alternatives to the vocabulary, key by key.
	///
	/// New keys are created; existing keys get the new alternatives after
	/// their current ones, merged like templates.
	///
	/// # Errors
	/// Returns `SentenceError::Configuration` if a key comes with no alternatives.
	pub fn add_vocabulary(&mut self, vocabulary: VocabularyInput) -> Result<&mut Self> {
		validate_vocabulary(&vocabulary)?;
		let allow_duplicates = self.options.allow_duplicates;
		for (key, alternatives) in vocabulary {
			self.vocabulary.entry(key).or_default().extend(alternatives, allow_duplicates);
		}
		debug!("Vocabulary extended, {} key(s) in total", self.vocabulary.len());
		Ok(self)
	}

	/// Puts the default options back.
	pub fn restore_default_options(&mut self) -> Result<&mut Self> {
		self.configure(Configuration::new().options(defaults::options().into()))
	}

	/// Generates a new sentence, readable afterwards with `get`.
	///
	/// With `force_new_sentence`, generation is repeated while it yields the
	/// previous value, unless no other value is reachable (see
	/// `is_force_new_sentence_possible`). When a distinct literal outcome
	/// exists, it repeats until it gets one. When only computed entries can
	/// vary, attempts are capped at `FORCE_NEW_SENTENCE_MAX_TRIES`.
	///
	/// # Errors
	/// Returns `SentenceError::Resolution` if a placeholder has no
	/// alternative at all. The previous value is kept in that case.
	pub fn generate(&mut self) -> Result<&mut Self> {
		let variety = if self.options.force_new_sentence {
			self.variety()
		} else {
			Variety::Fixed
		};
		let resolver = Resolver {
			vocabulary: &self.vocabulary,
			options: &self.options,
			parser: &self.parser,
		};

		let mut sentence = resolver.sentence(&self.templates, &mut self.rng)?;
		let mut tries = 1;
		while variety != Variety::Fixed && self.value.as_deref() == Some(sentence.as_str()) {
			if variety == Variety::Computed && tries >= FORCE_NEW_SENTENCE_MAX_TRIES {
				warn!("No new sentence after {tries} attempts, keeping '{sentence}'");
				break;
			}
			sentence = resolver.sentence(&self.templates, &mut self.rng)?;
			tries += 1;
		}

		debug!("Generated '{sentence}' in {tries} attempt(s)");
		self.value = Some(sentence);
		Ok(self)
	}

	/// Tells whether regenerating can produce something else.
	///
	/// True when there is more than one distinct template. With a single
	/// template, true when at least one of its placeholders has more than
	/// one distinct outcome (computed entries count as varying).
	pub fn is_force_new_sentence_possible(&self) -> bool {
		self.variety() != Variety::Fixed
	}

	fn variety(&self) -> Variety {
		let Some(first) = self.templates.first() else {
			return Variety::Fixed;
		};
		if self.templates.iter().any(|t| !t.entry().is_same(first.entry())) {
			return if self.templates.iter().all(|t| t.entry().as_literal().is_some()) {
				Variety::Literal
			} else {
				Variety::Computed
			};
		}

		let template = match first.entry() {
			Entry::Literal(template) => template,
			Entry::Computed(_) => return Variety::Computed,
		};
		let resolver = Resolver {
			vocabulary: &self.vocabulary,
			options: &self.options,
			parser: &self.parser,
		};
		self.parser
			.find_placeholders(template)
			.map(|placeholder| resolver.variety(placeholder))
			.max()
			.unwrap_or(Variety::Fixed)
	}

	/// Last generated sentence, or an empty string before the first generation.
	pub fn get(&self) -> &str {
		self.value.as_deref().unwrap_or_default()
	}

	/// Last generated sentence, `None` before the first generation.
	pub fn value(&self) -> Option<&str> {
		self.value.as_deref()
	}

	pub fn state(&self) -> EngineState {
		match self.value {
			Some(_) => EngineState::Generated,
			None => EngineState::Configured,
		}
	}

	/// Templates without their weights.
	pub fn templates(&self) -> Vec<Entry> {
		self.templates.iter().map(|t| t.entry().clone()).collect()
	}

	pub fn weighted_templates(&self) -> &[WeightedEntry] {
		self.templates.entries()
	}

	/// Vocabulary without weights.
	pub fn vocabulary(&self) -> HashMap<String, Vec<Entry>> {
		self.vocabulary
			.iter()
			.map(|(key, alternatives)| (key.clone(), alternatives.iter().map(|a| a.entry().clone()).collect()))
			.collect()
	}

	pub fn weighted_vocabulary(&self) -> &WeightedVocabulary {
		&self.vocabulary
	}

	pub fn options(&self) -> &Options {
		&self.options
	}

	fn weigh_vocabulary(&self, vocabulary: VocabularyInput) -> WeightedVocabulary {
		vocabulary
			.into_iter()
			.map(|(key, alternatives)| (key, WeightedList::new(alternatives, self.options.allow_duplicates)))
			.collect()
	}
}

/// The alternatives of one placeholder key, with the formatting the key
/// asked for.
///
/// A placeholder listing several keys pools their sources: a source is
/// picked by its total weight, then an alternative within it, so each
/// alternative keeps a chance proportional to its own weight.
struct Source<'a> {
	alternatives: &'a WeightedList,
	use_article: bool,
	pluralize: bool,
}

impl Source<'_> {
	fn format(&self, word: &str) -> String {
		article_and_pluralize(self.use_article, self.pluralize, word)
	}
}

impl Weighted for Source<'_> {
	fn weight(&self) -> u64 {
		self.alternatives.total_weight()
	}
}

/// Borrowed view of the engine state needed to resolve placeholders.
///
/// Kept apart from the random generator so both can be borrowed at once.
struct Resolver<'a> {
	vocabulary: &'a WeightedVocabulary,
	options: &'a Options,
	parser: &'a PlaceholderParser,
}

impl<'a> Resolver<'a> {
	/// Picks a template and replaces its placeholders, left to right.
	fn sentence<R: Rng>(&self, templates: &WeightedList, rng: &mut R) -> Result<String> {
		let template = templates.pick(rng)?.entry().resolve();
		let placeholders: Vec<&str> = self.parser.find_placeholders(&template).collect();

		let mut sentence = template.clone();
		for placeholder in placeholders {
			let capitalize = self.options.capitalize
				&& sentence
					.find(placeholder)
					.is_some_and(|index| starts_sentence(&sentence[..index]));
			let replacement = self.word(placeholder, capitalize, rng)?;
			sentence = sentence.replacen(placeholder, &replacement, 1);
		}
		Ok(sentence)
	}

	/// Picks and formats the replacement of one placeholder.
	fn word<R: Rng>(&self, placeholder: &str, capitalize: bool, rng: &mut R) -> Result<String> {
		let sources = self.sources(placeholder);
		if sources.is_empty() {
			return Err(SentenceError::Resolution(format!(
				"no vocabulary entry for placeholder '{placeholder}'"
			)));
		}

		let source = pick_by_weight(&sources, rng)?;
		let chosen = source.alternatives.pick(rng)?;
		let mut word = source.format(&chosen.entry().resolve());
		if capitalize {
			word = modifier::capitalize(&word);
		}
		trace!("Resolved '{placeholder}' to '{word}' among {} key(s)", sources.len());

		if self.options.preserve_placeholder_notation {
			word = self.parser.notation().wrap(&word);
		}
		Ok(word)
	}

	/// Alternatives of every key listed in `placeholder`, in listed order.
	///
	/// Keys missing from the vocabulary contribute nothing.
	fn sources(&self, placeholder: &str) -> Vec<Source<'a>> {
		let mut sources = Vec::new();
		for key in self.parser.find_keys(placeholder) {
			let Some(modifiers) = KeyModifiers::resolve(&key, self.vocabulary) else {
				debug!("Key '{key}' of '{placeholder}' is not in the vocabulary, skipped");
				continue;
			};
			if let Some(alternatives) = self.vocabulary.get(modifiers.lookup_key).filter(|list| !list.is_empty()) {
				sources.push(Source {
					alternatives,
					use_article: modifiers.use_article,
					pluralize: modifiers.pluralize,
				});
			}
		}
		sources
	}

	/// What `placeholder` can resolve to across generations.
	///
	/// Literal outcomes are compared once formatted, and capitalized when
	/// capitalization is on, so `owl` and `Owl` do not count as distinct.
	fn variety(&self, placeholder: &str) -> Variety {
		let mut outcomes = HashSet::new();
		let mut computed = false;
		for source in self.sources(placeholder) {
			for alternative in source.alternatives.iter() {
				match alternative.entry() {
					Entry::Literal(word) => {
						let word = source.format(word);
						outcomes.insert(if self.options.capitalize {
							modifier::capitalize(&word)
						} else {
							word
						});
					}
					Entry::Computed(_) => computed = true,
				}
			}
		}

		if outcomes.len() > 1 {
			Variety::Literal
		} else if computed {
			Variety::Computed
		} else {
			Variety::Fixed
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sentence::options::OptionsPatch;
	use crate::sentence::placeholder::PlaceholderNotation;
	use pretty_assertions::assert_eq;

	fn engine(config: Configuration) -> SentenceEngine {
		SentenceEngine::with_rng(config, StdRng::seed_from_u64(42)).unwrap()
	}

	#[test]
	fn starts_configured_then_generated() {
		let mut engine = engine(Configuration::new().templates(["plain text"]));
		assert_eq!(engine.state(), EngineState::Configured);
		assert_eq!(engine.value(), None);
		assert_eq!(engine.get(), "");

		engine.generate().unwrap();
		assert_eq!(engine.state(), EngineState::Generated);
		assert_eq!(engine.get(), "plain text");
	}

	#[test]
	fn missing_parts_fall_back_to_defaults() {
		let engine = engine(Configuration::new());
		assert_eq!(engine.weighted_templates().len(), 1);
		assert_eq!(engine.vocabulary()["self"].len(), 3);
		assert_eq!(engine.options(), &Options::default());
	}

	#[test]
	fn default_configuration_generates() {
		let mut engine = engine(Configuration::new());
		let value = engine.generate().unwrap().get().to_owned();

		assert!(value.starts_with("Hello, ") || value.starts_with("Greetings, "), "{value}");
		assert!(value.contains(". I am the "), "{value}");
	}

	#[test]
	fn keys_are_pooled_in_listed_order() {
		let mut engine = engine(
			Configuration::new()
				.templates(["{fruit, vegetable}"])
				.vocabulary([("fruit", vec!["apple"]), ("vegetable", vec!["leek"])])
				.options(OptionsPatch::new().capitalize(false)),
		);

		let mut seen = HashSet::new();
		for _ in 0..100 {
			seen.insert(engine.generate().unwrap().get().to_owned());
		}
		assert_eq!(seen, HashSet::from(["apple".to_owned(), "leek".to_owned()]));
	}

	#[test]
	fn undefined_keys_are_skipped() {
		let mut engine = engine(
			Configuration::new()
				.templates(["I like {a-missing, a-animal}."])
				.vocabulary([("animal", vec!["owl"])]),
		);
		assert_eq!(engine.generate().unwrap().get(), "I like an owl.");
	}

	#[test]
	fn placeholder_without_any_known_key_fails() {
		let mut engine = engine(
			Configuration::new()
				.templates(["A {ghost} here."])
				.vocabulary([("animal", vec!["owl"])]),
		);

		let error = engine.generate().unwrap_err();
		assert!(matches!(error, SentenceError::Resolution(_)));
		assert_eq!(engine.state(), EngineState::Configured);
	}

	#[test]
	fn capitalizes_after_terminal_punctuation() {
		let mut engine = engine(
			Configuration::new()
				.templates(["{word}. {word}, {word}! {word}: {word}"])
				.vocabulary([("word", vec!["yes"])]),
		);
		assert_eq!(engine.generate().unwrap().get(), "Yes. Yes, yes! Yes: Yes");

		engine.configure(Configuration::new().options(OptionsPatch::new().capitalize(false))).unwrap();
		assert_eq!(engine.generate().unwrap().get(), "yes. yes, yes! yes: yes");
	}

	#[test]
	fn custom_notation_with_preserved_delimiters() {
		let mut engine = engine(
			Configuration::new()
				.templates(["Say [word] and {word}."])
				.vocabulary([("word", vec!["hi"])])
				.options(
					OptionsPatch::new()
						.placeholder_notation(PlaceholderNotation::parse("[ ]").unwrap())
						.preserve_placeholder_notation(true),
				),
		);
		assert_eq!(engine.generate().unwrap().get(), "Say [hi] and {word}.");
	}

	#[test]
	fn invalid_configuration_leaves_engine_untouched() {
		let mut engine = engine(Configuration::new().templates(["kept"]));

		let result = engine.configure(
			Configuration::new()
				.templates(Vec::<&str>::new())
				.options(OptionsPatch::new().capitalize(false)),
		);
		assert!(matches!(result, Err(SentenceError::Configuration(_))));
		assert!(engine.options().capitalize);
		assert_eq!(engine.templates()[0].as_literal(), Some("kept"));
	}

	#[test]
	fn add_vocabulary_extends_existing_keys() {
		let mut engine = engine(
			Configuration::new()
				.templates(["{noun}"])
				.vocabulary([("noun", vec!["cat"])])
				.options(OptionsPatch::new().allow_duplicates(false)),
		);

		engine
			.add_vocabulary(crate::sentence::config::vocabulary_from([
				("noun", vec!["cat", "dog"]),
				("verb", vec!["run"]),
			]))
			.unwrap();

		let nouns = &engine.weighted_vocabulary()["noun"];
		assert_eq!(nouns.len(), 2);
		assert_eq!(nouns[0].weight(), 2);
		assert_eq!(engine.vocabulary()["verb"][0].as_literal(), Some("run"));

		let empty = crate::sentence::config::vocabulary_from([("adverb", Vec::<&str>::new())]);
		assert!(engine.add_vocabulary(empty).is_err());
	}

	#[test]
	fn restore_default_options_resets_notation() {
		let mut engine = engine(
			Configuration::new().options(OptionsPatch::new().placeholder_notation(PlaceholderNotation::parse("< >").unwrap())),
		);
		engine.restore_default_options().unwrap();
		assert_eq!(engine.options(), &Options::default());
	}

	#[test]
	fn force_new_sentence_possibility() {
		let single = engine(
			Configuration::new()
				.templates(["{a}"])
				.vocabulary([("a", vec!["x"])]),
		);
		assert!(!single.is_force_new_sentence_possible());

		let varied = engine(
			Configuration::new()
				.templates(["{a}"])
				.vocabulary([("a", vec!["x", "y"])]),
		);
		assert!(varied.is_force_new_sentence_possible());

		let two_templates = engine(Configuration::new().templates(["one", "two"]));
		assert!(two_templates.is_force_new_sentence_possible());

		let same_template_twice = engine(Configuration::new().templates(["same", "same"]));
		assert!(!same_template_twice.is_force_new_sentence_possible());
	}

	#[test]
	fn force_new_sentence_never_repeats() {
		let mut engine = engine(
			Configuration::new()
				.templates(["{coin}"])
				.vocabulary([("coin", vec!["heads", "tails"])])
				.options(OptionsPatch::new().force_new_sentence(true)),
		);

		let mut previous = engine.generate().unwrap().get().to_owned();
		for _ in 0..20 {
			let current = engine.generate().unwrap().get().to_owned();
			assert_ne!(current, previous);
			previous = current;
		}
	}

	#[test]
	fn force_new_sentence_reaches_rare_alternatives() {
		let mut engine = engine(
			Configuration::new()
				.templates(["{coin}"])
				.vocabulary([("coin", vec![("heads", 1000), ("tails", 1)])])
				.options(OptionsPatch::new().force_new_sentence(true)),
		);

		let mut previous = engine.generate().unwrap().get().to_owned();
		for _ in 0..20 {
			let current = engine.generate().unwrap().get().to_owned();
			assert_ne!(current, previous);
			previous = current;
		}
	}

	#[test]
	fn force_new_sentence_gives_up_on_constant_computed_entries() {
		let mut engine = engine(
			Configuration::new()
				.templates(["{stuck}"])
				.vocabulary([("stuck", vec![Entry::computed(|| "same".to_owned())])])
				.options(OptionsPatch::new().force_new_sentence(true)),
		);
		assert!(engine.is_force_new_sentence_possible());

		for _ in 0..3 {
			assert_eq!(engine.generate().unwrap().get(), "Same");
		}
	}

	#[test]
	fn outcomes_equal_once_capitalized_do_not_count() {
		let mut engine = engine(
			Configuration::new()
				.templates(["{word}"])
				.vocabulary([("word", vec!["owl", "Owl"])]),
		);
		assert!(!engine.is_force_new_sentence_possible());

		engine.configure(Configuration::new().options(OptionsPatch::new().capitalize(false))).unwrap();
		assert!(engine.is_force_new_sentence_possible());
	}

	#[test]
	fn large_pools_keep_their_index_across_updates() {
		let mut engine = engine(
			Configuration::new()
				.templates(["{n}"])
				.vocabulary(crate::sentence::config::vocabulary_from([("n", ["zero"])])),
		);
		assert!(!engine.weighted_vocabulary()["n"].has_tree());

		let many: Vec<String> = (0..40).map(|i| format!("n{i}")).collect();
		engine
			.add_vocabulary(crate::sentence::config::vocabulary_from([("n", many.iter().map(String::as_str))]))
			.unwrap();
		let pool = &engine.weighted_vocabulary()["n"];
		assert!(pool.has_tree());
		assert_eq!(pool.total_weight(), 41);

		let value = engine.generate().unwrap().get().to_owned();
		assert!(value == "Zero" || value.starts_with('N'), "{value}");
	}
}
