use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::info;
use rs_markov_core::io::{read_corpus, read_corpus_dir};
use rs_markov_core::resources::{ResourceSet, StaticResources};
use rs_markov_core::{MarkovConfig, MarkovModel};

/// Corpus bundled with the binary, used by the `sample` command.
const SAMPLE_CORPUS: &[u8] = include_bytes!("../data/sample.txt");
static RESOURCE_ENTRIES: [(&str, &[u8]); 1] = [("data/sample.txt", SAMPLE_CORPUS)];
static RESOURCES: StaticResources<'static> = StaticResources::new(&RESOURCE_ENTRIES);

/// Train word-level Markov models and generate text from them
#[derive(Parser)]
#[command(name = "rs-markov")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train a model from a corpus file or a directory of .txt files
    Train(TrainArgs),

    /// Generate text from a saved model
    Generate(GenerateArgs),

    /// Train on the bundled sample corpus and print generated text
    Sample {
        /// Number of words to generate
        #[arg(short, long, default_value_t = 100)]
        words: usize,
    },
}

#[derive(Args)]
struct TrainArgs {
    /// Corpus file, or directory whose .txt files are concatenated
    #[arg(short, long)]
    corpus: PathBuf,

    /// Where to write the model
    #[arg(short, long)]
    output: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args)]
struct GenerateArgs {
    /// Model file written by `train`
    #[arg(short, long)]
    model: PathBuf,

    /// Number of words to generate
    #[arg(short, long, default_value_t = 100)]
    words: usize,

    /// Text to start from instead of a random prefix
    #[arg(short, long)]
    seed: Option<String>,
}

/// Model configuration flags, defaults match `MarkovConfig::default()`
#[derive(Args)]
struct ConfigArgs {
    /// Chain order (words of context)
    #[arg(long, default_value_t = 2)]
    order: usize,

    /// Maximum consecutive repeats of a word
    #[arg(long, default_value_t = 2)]
    max_repeat: usize,

    /// Minimum words per sentence
    #[arg(long, default_value_t = 5)]
    min_sentence: usize,

    /// Maximum words per sentence
    #[arg(long, default_value_t = 25)]
    max_sentence: usize,

    /// Sentences per paragraph
    #[arg(long, default_value_t = 5)]
    paragraph: usize,

    /// Sentence-ending punctuation
    #[arg(long, default_value = ".!?")]
    stop_tokens: String,
}

impl ConfigArgs {
    fn to_config(&self) -> MarkovConfig {
        MarkovConfig::default()
            .with_order(self.order)
            .with_max_repeat(self.max_repeat)
            .with_sentence_len(self.min_sentence, self.max_sentence)
            .with_paragraph_break(self.paragraph)
            .with_stop_tokens(&self.stop_tokens)
    }
}

/// Reads a single corpus file, or every `.txt` file of a directory.
fn load_corpus(path: &Path) -> anyhow::Result<String> {
    if path.is_dir() {
        Ok(read_corpus_dir(path)?)
    } else {
        Ok(read_corpus(path)?)
    }
}

fn train(args: TrainArgs) -> anyhow::Result<()> {
    let corpus = load_corpus(&args.corpus)
        .with_context(|| format!("failed to read corpus {}", args.corpus.display()))?;

    // Training runs in parallel over chunks of the corpus
    let model = MarkovModel::new(args.config.to_config());
    model.build(&corpus);
    info!("model has {} prefixes", model.prefix_count());

    // Written to a temporary file first, then renamed into place
    model
        .save_to_file(&args.output)
        .with_context(|| format!("failed to save model {}", args.output.display()))?;
    println!("Model trained and saved to {}", args.output.display());
    Ok(())
}

fn generate(args: GenerateArgs) -> anyhow::Result<()> {
    let model = MarkovModel::from_file(&args.model)
        .with_context(|| format!("failed to load model {}", args.model.display()))?;

    let text = match &args.seed {
        Some(seed) => model.generate_from(seed, args.words)?,
        None => model.generate(args.words)?,
    };
    println!("{text} ...");
    Ok(())
}

fn sample(words: usize) -> anyhow::Result<()> {
    // The bundled corpus is looked up like any other resource
    let corpus = RESOURCES
        .get("data/sample.txt")
        .context("sample corpus is missing")?;
    let corpus = std::str::from_utf8(corpus)?;

    let model = MarkovModel::new(MarkovConfig::default().with_sentence_len(5, 15).with_paragraph_break(3));
    model.build(corpus);
    println!("{} ...", model.generate(words)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Train(args) => train(args),
        Command::Generate(args) => generate(args),
        Command::Sample { words } => sample(words),
    }
}
