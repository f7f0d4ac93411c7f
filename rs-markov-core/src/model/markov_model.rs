use std::path::Path;
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::builder::ChainBuilder;
use super::chain::Chain;
use super::config::MarkovConfig;
use super::generator::{Generator, StartSeed};
use crate::error::{MarkovError, Result};
use crate::io::{build_output_path, read_corpus, write_atomic};
use crate::resources::ResourceSet;
use crate::store;

/// A word-level Markov text model.
///
/// This struct owns:
/// - `config`: the sanitized configuration (order, sentence shaping, ...)
/// - `chain`: the prefix → suffix table, behind a read/write lock
/// - `rng`: the master random source, only used to seed each generation
///
/// # Concurrency
/// - [`generate`](MarkovModel::generate) only takes the read lock, so several
///   threads can generate from the same model at once.
/// - [`build`](MarkovModel::build) takes the write lock once, after the
///   corpus has been fully scanned: readers see either the old chain or the
///   complete new one.
/// - The master random source sits behind its own mutex. A generation holds
///   it just long enough to seed a private generator, then walks without it.
///
/// # Reproducibility
/// Two models built from the same corpus with the same seed produce the same
/// sequence of outputs, provided the calls happen in the same order.
#[derive(Debug)]
pub struct MarkovModel<R = StdRng> {
	config: MarkovConfig,
	chain: RwLock<Chain>,
	rng: Mutex<R>,
}

impl MarkovModel<StdRng> {
	/// Creates an untrained model seeded from the system clock.
	pub fn new(config: MarkovConfig) -> Self {
		let seed = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|elapsed| elapsed.as_nanos() as u64)
			.unwrap_or_default();
		Self::with_rng(config, StdRng::seed_from_u64(seed))
	}

	/// Decodes a model produced by [`to_bytes`](MarkovModel::to_bytes).
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		let mut model = Self::new(MarkovConfig::default());
		model.load(bytes)?;
		Ok(model)
	}

	/// Loads a model file written by [`save_to_file`](MarkovModel::save_to_file).
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		let bytes = std::fs::read(path)?;
		Self::from_bytes(&bytes)
	}

	/// Loads a model bundled in a [`ResourceSet`].
	///
	/// # Errors
	/// Returns [`MarkovError::ResourceNotFound`] if nothing is stored under
	/// `path`, or a decoding error if the bytes are not a model.
	pub fn from_resource<S: ResourceSet + ?Sized>(resources: &S, path: &str) -> Result<Self> {
		let bytes = resources.get(path).ok_or_else(|| MarkovError::ResourceNotFound(path.to_owned()))?;
		Self::from_bytes(bytes)
	}

	/// Loads the cached model next to a corpus, or trains and caches it.
	///
	/// - `corpus/file.txt` is cached as `corpus/file.bin`.
	/// - If the cache exists it is decoded and `config` is ignored.
	/// - Otherwise the corpus is read, a model is trained with `config`, and
	///   the result is written atomically to the cache path.
	pub fn from_corpus_cached<P: AsRef<Path>>(corpus_path: P, config: MarkovConfig) -> Result<Self> {
		let binary_data_path = build_output_path(&corpus_path, "bin")?;
		if binary_data_path.exists() {
			info!("loading cached model {}", binary_data_path.display());
			return Self::from_file(&binary_data_path);
		}

		let model = Self::new(config);
		model.build(&read_corpus(&corpus_path)?);
		model.save_to_file(&binary_data_path)?;
		Ok(model)
	}
}

impl<R: Rng + SeedableRng> MarkovModel<R> {
	/// Creates an untrained model using the given random source.
	///
	/// Use a seeded generator for reproducible output.
	pub fn with_rng(config: MarkovConfig, rng: R) -> Self {
		Self {
			config: config.sanitized(),
			chain: RwLock::new(Chain::new()),
			rng: Mutex::new(rng),
		}
	}

	/// Returns the model configuration.
	pub fn config(&self) -> &MarkovConfig {
		&self.config
	}

	/// Trains the model on `text`.
	///
	/// Transitions are added to whatever the chain already holds.
	pub fn build(&self, text: &str) {
		let partial = ChainBuilder::new(self.config.order).build(text);
		self.chain.write().unwrap_or_else(PoisonError::into_inner).merge(partial);
	}

	/// Generates `word_count` words of text.
	///
	/// # Errors
	/// - [`MarkovError::UntrainedModel`] if the model has not been trained
	/// - [`MarkovError::BrokenChain`] if the walk cannot find any suffix
	pub fn generate(&self, word_count: usize) -> Result<String> {
		let mut rng = self.call_rng();
		let chain = self.chain.read().unwrap_or_else(PoisonError::into_inner);
		Generator::new(&chain, &self.config).generate(word_count, &mut rng)
	}

	/// Generates `word_count` words starting with `seed`.
	///
	/// The seed is normalized like the corpus and counts toward `word_count`.
	/// If its last `order` words are not a known prefix, the walk restarts
	/// from a random one.
	pub fn generate_from(&self, seed: &str, word_count: usize) -> Result<String> {
		let mut rng = self.call_rng();
		let chain = self.chain.read().unwrap_or_else(PoisonError::into_inner);
		Generator::new(&chain, &self.config).generate_with(StartSeed::Custom(seed), word_count, &mut rng)
	}

	/// Seeds a generator for one call from the master random source.
	fn call_rng(&self) -> R {
		let mut master = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
		R::from_rng(&mut *master)
	}

	/// Encodes the configuration and chain.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		let chain = self.chain.read().unwrap_or_else(PoisonError::into_inner);
		store::serialize(&self.config, &chain)
	}

	/// Replaces the configuration and chain with the decoded `bytes`.
	///
	/// The model is left untouched if decoding fails.
	pub fn load(&mut self, bytes: &[u8]) -> Result<()> {
		let (config, chain) = store::deserialize(bytes)?;
		self.config = config;
		*self.chain.get_mut().unwrap_or_else(PoisonError::into_inner) = chain;
		Ok(())
	}

	/// Saves the model to `path` atomically, creating parent directories.
	pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let bytes = self.to_bytes()?;
		write_atomic(path, &bytes)?;
		Ok(())
	}

	/// Returns `true` once the chain holds at least one prefix.
	pub fn is_trained(&self) -> bool {
		!self.chain.read().unwrap_or_else(PoisonError::into_inner).is_empty()
	}

	/// Number of distinct prefixes in the chain.
	pub fn prefix_count(&self) -> usize {
		self.chain.read().unwrap_or_else(PoisonError::into_inner).len()
	}

	/// Returns a copy of the current chain.
	pub fn chain_snapshot(&self) -> Chain {
		self.chain.read().unwrap_or_else(PoisonError::into_inner).clone()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::generator::generate;

	#[test]
	fn invalid_order_is_clamped() {
		let model = MarkovModel::new(MarkovConfig::default().with_order(0));
		assert_eq!(model.config().order, 2);
		assert!(!model.is_trained());
	}

	#[test]
	fn load_keeps_model_on_error() {
		let mut model = MarkovModel::with_rng(MarkovConfig::default(), StdRng::seed_from_u64(1));
		model.build("a b c d e");
		assert!(model.load(b"garbage").is_err());
		assert_eq!(model.prefix_count(), 3);
	}

	#[test]
	fn each_call_walks_with_a_seeded_copy() {
		let model = MarkovModel::with_rng(MarkovConfig::default(), StdRng::seed_from_u64(42));
		model.build("one two three one two four one three two one four three two");

		let mut master = StdRng::seed_from_u64(42);
		let chain = model.chain_snapshot();
		for _ in 0..3 {
			let mut call = StdRng::from_rng(&mut master);
			let expected = generate(&chain, model.config(), 30, &mut call).unwrap();
			assert_eq!(model.generate(30).unwrap(), expected);
		}
	}

	#[test]
	fn same_seed_same_output() {
		let corpus: String = (0..40).map(|i| format!("{} ", char::from(b'a' + (i * 7 % 26) as u8))).collect();
		let outputs: Vec<String> = (0..10)
			.map(|_| {
				let model = MarkovModel::with_rng(MarkovConfig::default(), StdRng::seed_from_u64(42));
				model.build(&corpus);
				model.generate(15).unwrap()
			})
			.collect();
		assert!(outputs.iter().all(|text| *text == outputs[0]), "{outputs:?}");

		// A reloaded model keeps the same prefix order
		let model = MarkovModel::with_rng(MarkovConfig::default(), StdRng::seed_from_u64(42));
		model.build(&corpus);
		let mut reloaded = MarkovModel::with_rng(MarkovConfig::default(), StdRng::seed_from_u64(42));
		reloaded.load(&model.to_bytes().unwrap()).unwrap();
		assert_eq!(reloaded.generate(15).unwrap(), outputs[0]);
	}

	#[test]
	fn build_accumulates() {
		let model = MarkovModel::with_rng(MarkovConfig::default().with_order(1), StdRng::seed_from_u64(1));
		model.build("a b");
		model.build("a c");
		let mut suffixes = model.chain_snapshot().suffixes("a").unwrap().to_vec();
		suffixes.sort();
		assert_eq!(suffixes, vec!["b", "c"]);
	}
}
