use sentence_engine_core::collections::weighted::{pick_uniform, Entry, WeightedEntry};
use sentence_engine_core::sentence::config::{vocabulary_from, Configuration};
use sentence_engine_core::sentence::factory::SentenceFactory;
use sentence_engine_core::sentence::options::OptionsPatch;
use sentence_engine_core::sentence::placeholder::PlaceholderNotation;

const VILLAGERS: [&str; 4] = ["Tom Nook", "Isabelle", "Blathers", "K.K. Slider"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // A factory holds defaults; without arguments it uses the built-in ones
    let mut factory = SentenceFactory::default();
    let mut sentence = factory.create_sentence(Configuration::new())?;
    println!("Default: {}", sentence.get());

    // Templates and vocabulary entries can be weighted: "a {adjective} day"
    // comes out three times as often as the other template
    let config = Configuration::new()
        .templates([
            WeightedEntry::new("What {a-adjective} day!", 3),
            WeightedEntry::new("{animal-s} are {adjective}.", 1),
        ])
        .vocabulary([
            ("adjective", vec![("odd", 1), ("lovely", 5), ("grey", 1)]),
            ("animal", vec![("owl", 1), ("duck", 1)]),
        ]);
    let mut weighted = factory.create_sentence(config)?;
    for i in 0..5 {
        println!("Weighted sentence {}: {}", i + 1, weighted.generate()?.get());
    }

    // Computed entries are evaluated each time they are selected
    let villager = Entry::computed(|| {
        pick_uniform(&VILLAGERS, &mut rand::rng())
            .copied()
            .unwrap_or_default()
            .to_owned()
    });
    sentence.configure(
        Configuration::new()
            .templates(["{villager} says hi to {villager}."])
            .vocabulary([("villager", vec![villager])]),
    )?;
    for i in 0..3 {
        println!("Computed {}: {}", i + 1, sentence.generate()?.get());
    }

    // Custom notation, keeping the delimiters around replacements
    sentence.configure(
        Configuration::new()
            .templates(["Tag: [mood, a-mood]"])
            .vocabulary([("mood", vec!["angry", "calm"])])
            .options(
                OptionsPatch::new()
                    .placeholder_notation(PlaceholderNotation::parse("[ ]")?)
                    .preserve_placeholder_notation(true),
            ),
    )?;
    println!("Preserved notation: {}", sentence.generate()?.get());
    sentence.restore_default_options()?;

    // Force a different sentence at each call when one is reachable
    sentence.configure(
        Configuration::new()
            .templates(["{coin}!"])
            .vocabulary([("coin", vec!["heads", "tails"])])
            .options(OptionsPatch::new().force_new_sentence(true)),
    )?;
    for i in 0..4 {
        println!("Coin flip {}: {}", i + 1, sentence.generate()?.get());
    }

    // Factory defaults can be extended
    factory
        .add_default_templates(["Goodbye, {noun}."])
        .add_default_vocabulary(vocabulary_from([("noun", ["island"])]));
    println!("Extended defaults: {}", factory.create_sentence(Configuration::new())?.get());

    // A placeholder whose keys are all unknown cannot be resolved
    match factory.create_sentence(Configuration::new().templates(["{unknown}"])) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Expected failure: {e}"),
    }

    // An empty delimiter is rejected at configuration time
    match PlaceholderNotation::new("", "}") {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Expected failure: {e}"),
    }

    Ok(())
}
