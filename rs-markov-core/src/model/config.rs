use serde::{Deserialize, Serialize};

/// Default chain order used when the requested one is invalid.
pub const DEFAULT_ORDER: usize = 2;
/// Default maximum number of consecutive repeats of the same word.
pub const DEFAULT_MAX_REPEAT: usize = 2;
/// Default minimum sentence length (not enforced during generation).
pub const DEFAULT_MIN_SENTENCE_LEN: usize = 5;
/// Default maximum sentence length, in words.
pub const DEFAULT_MAX_SENTENCE_LEN: usize = 25;
/// Default number of sentences per paragraph.
pub const DEFAULT_PARAGRAPH_BREAK: usize = 5;
/// Default sentence-terminating punctuation.
pub const DEFAULT_STOP_TOKENS: &str = ".!?";

/// Configuration held by a Markov model.
///
/// `MarkovConfig` carries both the **training parameter** (`order`) and the
/// **generation parameters** (repeat limit, sentence and paragraph shaping).
/// It is persisted alongside the chain so a reloaded model behaves exactly
/// like the one that was saved.
///
/// # Invariants
/// - A model only ever holds a [`sanitized`](MarkovConfig::sanitized) config:
///   invalid values are clamped to their defaults, never rejected.
///
/// # Notes
/// - `min_sentence_len` is stored and persisted but the generator does not
///   enforce it: a sentence is only ever cut at `max_sentence_len`, even
///   when that is the smaller of the two.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MarkovConfig {
	/// Number of preceding words used as context (prefix length). Must be >= 1.
	pub order: usize,

	/// Maximum consecutive repeats of the same chain word before substitution.
	pub max_repeat: usize,

	/// Minimum words per sentence.
	pub min_sentence_len: usize,

	/// Maximum words per sentence. Must be >= 1.
	pub max_sentence_len: usize,

	/// Sentences per paragraph. Must be >= 1.
	pub paragraph_break: usize,

	/// Sentence punctuation. The first one terminates sentences cut at
	/// `max_sentence_len`.
	pub stop_tokens: String,
}

impl Default for MarkovConfig {
	fn default() -> Self {
		Self {
			order: DEFAULT_ORDER,
			max_repeat: DEFAULT_MAX_REPEAT,
			min_sentence_len: DEFAULT_MIN_SENTENCE_LEN,
			max_sentence_len: DEFAULT_MAX_SENTENCE_LEN,
			paragraph_break: DEFAULT_PARAGRAPH_BREAK,
			stop_tokens: DEFAULT_STOP_TOKENS.to_owned(),
		}
	}
}

impl MarkovConfig {
	/// Returns a copy with every invalid value clamped to its default.
	///
	/// - `order < 1` → [`DEFAULT_ORDER`]
	/// - `max_sentence_len < 1` → [`DEFAULT_MAX_SENTENCE_LEN`]
	/// - `paragraph_break < 1` → [`DEFAULT_PARAGRAPH_BREAK`]
	/// - empty `stop_tokens` → [`DEFAULT_STOP_TOKENS`]
	///
	/// Sanitizing an already sanitized config is a no-op.
	pub fn sanitized(mut self) -> Self {
		if self.order < 1 {
			self.order = DEFAULT_ORDER;
		}
		if self.max_sentence_len < 1 {
			self.max_sentence_len = DEFAULT_MAX_SENTENCE_LEN;
		}
		if self.paragraph_break < 1 {
			self.paragraph_break = DEFAULT_PARAGRAPH_BREAK;
		}
		if self.stop_tokens.is_empty() {
			self.stop_tokens = DEFAULT_STOP_TOKENS.to_owned();
		}
		self
	}

	/// Punctuation appended when a sentence is cut at `max_sentence_len`.
	pub fn terminator(&self) -> char {
		self.stop_tokens.chars().next().unwrap_or('.')
	}

	pub fn with_order(mut self, order: usize) -> Self {
		self.order = order;
		self
	}

	pub fn with_max_repeat(mut self, max_repeat: usize) -> Self {
		self.max_repeat = max_repeat;
		self
	}

	pub fn with_sentence_len(mut self, min: usize, max: usize) -> Self {
		self.min_sentence_len = min;
		self.max_sentence_len = max;
		self
	}

	pub fn with_paragraph_break(mut self, paragraph_break: usize) -> Self {
		self.paragraph_break = paragraph_break;
		self
	}

	pub fn with_stop_tokens(mut self, stop_tokens: &str) -> Self {
		self.stop_tokens = stop_tokens.to_owned();
		self
	}
}
