use rand::Rng;

use super::config::MarkovConfig;

/// Per-call generation state and output buffer.
///
/// Every word picked by the walk goes through [`RuleEngine::emit`], which
/// applies, in order:
/// 1. the repetition guard (long runs of the same chain word are broken by
///    substituting a random word already emitted),
/// 2. sentence-length enforcement (a terminator is inserted once the current
///    sentence holds `max_sentence_len` words, the next word is capitalized
///    and every `paragraph_break` sentences a blank line is inserted).
///
/// Punctuation carried by corpus words is copied as-is and never ends a
/// sentence. The state lives for one `generate` call only.
///
/// # Notes
/// - `min_sentence_len` is not checked.
/// - [`finish`](RuleEngine::finish) collapses every whitespace run, paragraph
///   breaks included, into a single space.
pub(crate) struct RuleEngine<'c> {
	config: &'c MarkovConfig,
	output: String,
	/// Words emitted so far, before capitalization.
	emitted: Vec<String>,
	sentence_words: usize,
	sentences: usize,
	last_word: Option<String>,
	repeats: usize,
	capitalize_next: bool,
}

impl<'c> RuleEngine<'c> {
	pub(crate) fn new(config: &'c MarkovConfig, word_count: usize) -> Self {
		Self {
			config,
			output: String::with_capacity(word_count * 6),
			emitted: Vec::with_capacity(word_count),
			sentence_words: 0,
			sentences: 0,
			last_word: None,
			repeats: 0,
			capitalize_next: false,
		}
	}

	/// Number of words written so far.
	pub(crate) fn emitted(&self) -> usize {
		self.emitted.len()
	}

	/// Applies the rules to `chain_word` and appends the result to the output.
	///
	/// Returns the word as written (after substitution and capitalization).
	pub(crate) fn emit<R: Rng + ?Sized>(&mut self, chain_word: &str, rng: &mut R) -> String {
		let word = self.guard_repetition(chain_word, rng);

		if self.sentence_words >= self.config.max_sentence_len {
			self.output.push(self.config.terminator());
			self.end_sentence();
		}

		let display = if self.capitalize_next {
			self.capitalize_next = false;
			capitalize(&word)
		} else {
			word.clone()
		};

		if !self.output.is_empty() {
			self.output.push(' ');
		}
		self.output.push_str(&display);
		self.sentence_words += 1;
		self.emitted.push(word);
		display
	}

	/// Reflows the output and returns it.
	pub(crate) fn finish(self) -> String {
		reflow(&self.output)
	}

	fn guard_repetition<R: Rng + ?Sized>(&mut self, chain_word: &str, rng: &mut R) -> String {
		let repeated = self.last_word.as_deref() == Some(chain_word);
		self.last_word = Some(chain_word.to_owned());

		if !repeated {
			self.repeats = 0;
			return chain_word.to_owned();
		}

		self.repeats += 1;
		if self.repeats > self.config.max_repeat && !self.emitted.is_empty() {
			let index = rng.random_range(0..self.emitted.len());
			return self.emitted[index].clone();
		}
		chain_word.to_owned()
	}

	fn end_sentence(&mut self) {
		self.sentence_words = 0;
		self.sentences += 1;
		self.capitalize_next = true;
		if self.sentences % self.config.paragraph_break == 0 {
			self.output.push_str("\n\n");
		}
	}
}

/// Uppercases the first character of `word`.
pub(crate) fn capitalize(word: &str) -> String {
	let mut chars = word.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

/// Collapses every whitespace run into a single space and trims the ends.
pub(crate) fn reflow(text: &str) -> String {
	text.split_whitespace().collect::<Vec<_>>().join(" ")
}
