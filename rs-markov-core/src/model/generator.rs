use std::collections::VecDeque;

use log::debug;
use rand::Rng;

use super::chain::Chain;
use super::config::MarkovConfig;
use super::rules::RuleEngine;
use crate::error::{MarkovError, Result};
use crate::normalize::normalize;

/// Strategy used to pick the words a generation starts from.
///
/// # Variants
/// - `Random`: a uniformly random prefix of the chain.
/// - `Custom(&str)`: the given text, normalized like the corpus. Its last
///   `order` words form the first lookup key; an unknown key falls back to a
///   random prefix like any other dead end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartSeed<'s> {
	Random,
	Custom(&'s str),
}

/// Random walk over a trained [`Chain`].
///
/// # Responsibilities
/// - Pick a starting prefix and emit its words
/// - Repeatedly look up the current prefix and pick one of its suffixes
/// - Restart from a random prefix when the walk reaches a dead end
/// - Hand every picked word to the generation rules for formatting
///
/// The prefix window always holds the words picked by the chain, never the
/// words actually written (which may be substituted or capitalized).
pub struct Generator<'a> {
	chain: &'a Chain,
	config: &'a MarkovConfig,
	/// Sliding window of the last `order` chain words, lowercased.
	window: VecDeque<String>,
	/// Scratch buffer reused for prefix keys.
	key: String,
}

impl<'a> Generator<'a> {
	pub fn new(chain: &'a Chain, config: &'a MarkovConfig) -> Self {
		Self {
			chain,
			config,
			window: VecDeque::with_capacity(config.order + 1),
			key: String::new(),
		}
	}

	/// Generates `word_count` words of text from a random prefix.
	///
	/// # Errors
	/// - [`MarkovError::UntrainedModel`] if the chain is empty
	/// - [`MarkovError::BrokenChain`] if neither the current prefix nor a fresh
	///   random prefix has any suffix
	///
	/// # Notes
	/// - A `word_count` of zero yields an empty string.
	/// - If `word_count` is smaller than the starting prefix, only its first
	///   `word_count` words are emitted.
	pub fn generate<R: Rng + ?Sized>(&mut self, word_count: usize, rng: &mut R) -> Result<String> {
		self.generate_with(StartSeed::Random, word_count, rng)
	}

	/// Generates `word_count` words of text from the given start.
	///
	/// The seed words count toward `word_count`. See [`generate`](Generator::generate)
	/// for errors and edge cases.
	pub fn generate_with<R: Rng + ?Sized>(
		&mut self,
		start: StartSeed<'_>,
		word_count: usize,
		rng: &mut R,
	) -> Result<String> {
		let chain = self.chain;
		if chain.is_empty() {
			return Err(MarkovError::UntrainedModel);
		}
		if word_count == 0 {
			return Ok(String::new());
		}

		let custom = match start {
			StartSeed::Custom(text) => normalize(text),
			StartSeed::Random => String::new(),
		};
		let seed = if custom.trim().is_empty() {
			chain.random_prefix(rng).ok_or(MarkovError::UntrainedModel)?
		} else {
			custom.as_str()
		};

		let mut rules = RuleEngine::new(self.config, word_count);
		self.reset_window(seed);
		for word in seed.split_whitespace().take(word_count) {
			rules.emit(word, rng);
		}

		while rules.emitted() < word_count {
			self.fill_key();
			let next = match chain.pick_suffix(&self.key, rng) {
				Some(word) => word,
				None => {
					debug!("no suffix for prefix {:?}, restarting from a random prefix", self.key);
					let restart = chain.random_prefix(rng).ok_or(MarkovError::UntrainedModel)?;
					self.reset_window(restart);
					chain
						.pick_suffix(restart, rng)
						.ok_or_else(|| MarkovError::BrokenChain { prefix: restart.to_owned() })?
				}
			};

			rules.emit(next, rng);
			self.push_word(next);
		}

		Ok(rules.finish())
	}

	fn reset_window(&mut self, prefix: &str) {
		self.window.clear();
		for word in prefix.split_whitespace() {
			self.push_word(word);
		}
	}

	fn push_word(&mut self, word: &str) {
		self.window.push_back(word.to_lowercase());
		while self.window.len() > self.config.order {
			self.window.pop_front();
		}
	}

	fn fill_key(&mut self) {
		self.key.clear();
		for (i, word) in self.window.iter().enumerate() {
			if i > 0 {
				self.key.push(' ');
			}
			self.key.push_str(word);
		}
	}
}

/// Convenience wrapper around [`Generator`] for one-off calls.
pub fn generate<R: Rng + ?Sized>(
	chain: &Chain,
	config: &MarkovConfig,
	word_count: usize,
	rng: &mut R,
) -> Result<String> {
	Generator::new(chain, config).generate(word_count, rng)
}
