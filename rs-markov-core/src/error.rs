use std::io;

/// Reason a model blob could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeFailure {
	#[error("missing or invalid magic header")]
	BadMagic,
	#[error("unsupported model format version {found} (expected {expected})")]
	UnsupportedVersion { found: u16, expected: u16 },
	#[error("malformed or truncated model data: {0}")]
	Malformed(#[source] postcard::Error),
	#[error("prefix {prefix:?} has no suffixes")]
	EmptySuffixes { prefix: String },
}

/// Errors surfaced by training, generation and model persistence.
///
/// Every failure is reported as a distinct variant so callers can match on
/// it; nothing is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum MarkovError {
	/// The chain is empty: train or load a model first.
	#[error("model not trained")]
	UntrainedModel,

	/// Neither the current prefix nor a fresh random prefix had a suffix.
	#[error("broken chain: no suffix recorded for prefix {prefix:?}")]
	BrokenChain { prefix: String },

	#[error("failed to encode model: {0}")]
	Encoding(#[source] postcard::Error),

	#[error("failed to decode model: {0}")]
	Decoding(#[from] DecodeFailure),

	#[error("resource not found: {0}")]
	ResourceNotFound(String),

	#[error(transparent)]
	Io(#[from] io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, MarkovError>;
