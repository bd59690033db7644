use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use regex::Regex;

use sentence_engine_core::SentenceError;
use sentence_engine_core::collections::weighted::{Entry, Weighted, WeightedEntry, WeightedSelector};
use sentence_engine_core::sentence::config::{Configuration, vocabulary_from};
use sentence_engine_core::sentence::engine::SentenceEngine;
use sentence_engine_core::sentence::options::OptionsPatch;

fn seeded(config: Configuration, seed: u64) -> SentenceEngine {
	SentenceEngine::with_rng(config, StdRng::seed_from_u64(seed)).unwrap()
}

#[test]
fn get_is_idempotent() {
	let mut engine = seeded(Configuration::new(), 1);
	engine.generate().unwrap();

	let first = engine.get().to_owned();
	assert_eq!(engine.get(), first);
	assert_eq!(engine.value(), Some(first.as_str()));
}

#[test]
fn same_draws_give_same_sentences() {
	let config = Configuration::new()
		.templates(["{a} {b} {c}", "{c}, {b}!"])
		.vocabulary([
			("a", vec!["one", "two", "three"]),
			("b", vec!["red", "green", "blue"]),
			("c", vec!["cat", "dog", "eel", "fox"]),
		]);

	let mut left = seeded(config.clone(), 99);
	let mut right = seeded(config, 99);
	for _ in 0..50 {
		assert_eq!(left.generate().unwrap().get(), right.generate().unwrap().get());
	}
}

#[test]
fn selection_frequency_follows_weights() {
	let entries: Vec<WeightedEntry> = [("a", 1), ("b", 2), ("c", 3), ("d", 4)].into_iter().map(Into::into).collect();
	let total: u64 = entries.iter().map(Weighted::weight).sum();
	let draws = 20_000;

	for selector in [WeightedSelector::linear(&entries).unwrap(), WeightedSelector::with_tree(&entries).unwrap()] {
		let mut rng = StdRng::seed_from_u64(2024);
		let mut counts = [0u64; 4];
		for _ in 0..draws {
			let picked = selector.pick(&mut rng).unwrap();
			let index = entries.iter().position(|e| std::ptr::eq(e, picked)).unwrap();
			counts[index] += 1;
		}

		let chi_square: f64 = entries
			.iter()
			.zip(counts)
			.map(|(entry, observed)| {
				let expected = draws as f64 * entry.weight() as f64 / total as f64;
				(observed as f64 - expected).powi(2) / expected
			})
			.sum();
		// 3 degrees of freedom, p = 0.0001
		assert!(chi_square < 21.1, "chi-square {chi_square} for counts {counts:?}");
	}
}

#[test]
fn force_new_sentence_terminates_with_a_single_outcome() {
	let mut engine = seeded(
		Configuration::new()
			.templates(["{greeting}, {noun}."])
			.vocabulary([("greeting", vec!["hello"]), ("noun", vec!["world"])])
			.options(OptionsPatch::new().force_new_sentence(true)),
		5,
	);

	for _ in 0..10 {
		assert_eq!(engine.generate().unwrap().get(), "Hello, world.");
	}
}

#[test]
fn force_new_sentence_never_repeats_with_skewed_weights() {
	let mut engine = seeded(
		Configuration::new()
			.templates(["{coin}"])
			.vocabulary([("coin", vec![("heads", 2000), ("tails", 1)])])
			.options(OptionsPatch::new().force_new_sentence(true)),
		1,
	);

	let mut previous = engine.generate().unwrap().get().to_owned();
	let mut repeats = 0;
	for _ in 0..200 {
		let current = engine.generate().unwrap().get().to_owned();
		if current == previous {
			repeats += 1;
		}
		previous = current;
	}
	assert_eq!(repeats, 0);
}

#[test]
fn force_new_sentence_alternates_between_skewed_templates() {
	let mut engine = seeded(
		Configuration::new()
			.templates([("Most of the time.", 500), ("Once in a while.", 1)])
			.options(OptionsPatch::new().force_new_sentence(true)),
		6,
	);
	assert!(engine.is_force_new_sentence_possible());

	let mut previous = engine.generate().unwrap().get().to_owned();
	for _ in 0..50 {
		let current = engine.generate().unwrap().get().to_owned();
		assert_ne!(current, previous);
		previous = current;
	}
}

#[test]
fn duplicate_templates_merge_only_when_duplicates_are_not_allowed() {
	let template = "Same {noun}.";

	let mut merging = seeded(
		Configuration::new()
			.templates([template])
			.options(OptionsPatch::new().allow_duplicates(false)),
		1,
	);
	merging.add_templates([template]);
	assert_eq!(merging.weighted_templates().len(), 1);
	assert_eq!(merging.weighted_templates()[0].weight(), 2);

	merging.add_templates([(template, 3)]);
	assert_eq!(merging.weighted_templates()[0].weight(), 5);

	let mut keeping = seeded(Configuration::new().templates([template]), 1);
	keeping.add_templates([template]);
	assert_eq!(keeping.weighted_templates().len(), 2);
}

#[test]
fn article_and_plural_modifiers() {
	let mut articles = seeded(
		Configuration::new()
			.templates(["{a-animal}"])
			.vocabulary([("animal", vec!["owl", "duck"])])
			.options(OptionsPatch::new().capitalize(false)),
		11,
	);
	let mut plurals = seeded(
		Configuration::new()
			.templates(["{adjective-s}"])
			.vocabulary([("adjective", vec!["big", "small"])])
			.options(OptionsPatch::new().capitalize(false)),
		11,
	);

	for _ in 0..50 {
		let article = articles.generate().unwrap().get().to_owned();
		assert!(article == "an owl" || article == "a duck", "{article}");

		let plural = plurals.generate().unwrap().get().to_owned();
		assert!(plural == "bigs" || plural == "smalls", "{plural}");
	}
}

#[test]
fn end_to_end_sentence_matches_the_template() {
	let mut engine = seeded(
		Configuration::new()
			.templates(["Let's {verb} this, and hope for the {adjective}."])
			.vocabulary([("adjective", vec!["best", "worst", "hilarious"]), ("verb", vec!["try", "do"])]),
		3,
	);
	let expected = Regex::new(r"^Let's (try|do) this, and hope for the (best|worst|hilarious)\.$").unwrap();

	for _ in 0..100 {
		let value = engine.generate().unwrap().get().to_owned();
		assert!(expected.is_match(&value), "{value}");
	}
}

#[test]
fn preserved_notation_wraps_the_replacement() {
	let mut engine = seeded(
		Configuration::new()
			.templates(["{test}"])
			.vocabulary([("test", vec!["Yup, just a test."])])
			.options(OptionsPatch::new().preserve_placeholder_notation(true)),
		1,
	);
	assert_eq!(engine.generate().unwrap().get(), "{Yup, just a test.}");
}

#[test]
fn json_configuration_drives_the_engine() {
	let config = Configuration::from_json(
		r#"{
			"templates": [{"entry": "<<animal>> says <<sound>>", "weight": 2}],
			"vocabulary": {"animal": ["cow"], "sound": ["moo"]},
			"options": {"placeholderNotation": "<< >>"}
		}"#,
	)
	.unwrap();

	let mut engine = seeded(config, 8);
	assert_eq!(engine.generate().unwrap().get(), "Cow says moo");
}

#[test]
fn malformed_notation_fails_at_configuration() {
	let result = Configuration::from_json(r#"{"options": {"placeholderNotation": "{"}}"#);
	assert!(matches!(result, Err(SentenceError::Configuration(_))));
}

#[test]
fn computed_entries_run_once_per_selection() {
	let calls = Arc::new(AtomicUsize::new(0));
	let counters: Vec<Entry> = (0..3)
		.map(|i| {
			let calls = calls.clone();
			Entry::computed(move || {
				calls.fetch_add(1, Ordering::SeqCst);
				format!("value{i}")
			})
		})
		.collect();

	let mut engine = seeded(
		Configuration::new()
			.templates(["{lazy}"])
			.vocabulary([("lazy", counters)])
			.options(OptionsPatch::new().capitalize(false)),
		4,
	);

	for round in 1..=5 {
		let value = engine.generate().unwrap().get().to_owned();
		assert!(value.starts_with("value"), "{value}");
		assert_eq!(calls.load(Ordering::SeqCst), round);
	}
}

#[test]
fn computed_templates_are_resolved_when_picked() {
	let mut engine = seeded(
		Configuration::new()
			.templates([Entry::computed(|| "Computed {noun}".to_owned())])
			.vocabulary(vocabulary_from([("noun", ["template"])])),
		2,
	);
	assert_eq!(engine.generate().unwrap().get(), "Computed template");
}
