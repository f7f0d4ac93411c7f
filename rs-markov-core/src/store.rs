//! Binary encoding of a trained model.
//!
//! A model file is a `postcard` encoding of a small envelope holding a magic
//! tag, a format version, the configuration and the chain. The magic and
//! version are checked before the payload is trusted, so blobs written by an
//! incompatible encoder fail loudly instead of decoding into garbage.

use serde::{Deserialize, Serialize};

use crate::error::{DecodeFailure, MarkovError, Result};
use crate::model::chain::Chain;
use crate::model::config::MarkovConfig;

/// Tag opening every model file.
pub const MAGIC: [u8; 4] = *b"MKVC";
/// Current model format version.
pub const FORMAT_VERSION: u16 = 1;

/// Borrowed view used for encoding, avoids cloning the chain.
#[derive(Serialize)]
struct ModelFileRef<'a> {
	magic: [u8; 4],
	version: u16,
	config: &'a MarkovConfig,
	chain: &'a Chain,
}

#[derive(Deserialize)]
struct Header {
	magic: [u8; 4],
	version: u16,
}

#[derive(Deserialize)]
struct ModelFile {
	magic: [u8; 4],
	version: u16,
	config: MarkovConfig,
	chain: Chain,
}

/// Encodes a configuration and its chain.
///
/// # Errors
/// Returns [`MarkovError::Encoding`] on an internal encoder failure.
pub fn serialize(config: &MarkovConfig, chain: &Chain) -> Result<Vec<u8>> {
	let file = ModelFileRef { magic: MAGIC, version: FORMAT_VERSION, config, chain };
	postcard::to_stdvec(&file).map_err(MarkovError::Encoding)
}

/// Decodes bytes produced by [`serialize`].
///
/// The returned configuration is sanitized.
///
/// # Errors
/// Returns [`MarkovError::Decoding`] if the magic tag is missing, the format
/// version is unknown, the payload is malformed or truncated, or a prefix
/// carries an empty suffix list.
pub fn deserialize(bytes: &[u8]) -> Result<(MarkovConfig, Chain)> {
	// Check the envelope first so foreign blobs get a precise error
	let (header, _) = postcard::take_from_bytes::<Header>(bytes).map_err(|_| DecodeFailure::BadMagic)?;
	if header.magic != MAGIC {
		return Err(DecodeFailure::BadMagic.into());
	}
	if header.version != FORMAT_VERSION {
		return Err(DecodeFailure::UnsupportedVersion { found: header.version, expected: FORMAT_VERSION }.into());
	}

	let file: ModelFile = postcard::from_bytes(bytes).map_err(DecodeFailure::Malformed)?;
	debug_assert_eq!(file.magic, header.magic);
	debug_assert_eq!(file.version, header.version);
	if let Some(prefix) = file.chain.prefix_without_suffixes() {
		return Err(DecodeFailure::EmptySuffixes { prefix: prefix.to_owned() }.into());
	}
	Ok((file.config.sanitized(), file.chain))
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeMap;

	use super::*;
	use crate::model::builder::ChainBuilder;

	/// Same layout as a model file, with a chain written by hand.
	#[derive(Serialize)]
	struct RawModelFile<'a> {
		magic: [u8; 4],
		version: u16,
		config: &'a MarkovConfig,
		transitions: BTreeMap<&'a str, Vec<&'a str>>,
	}

	fn trained() -> (MarkovConfig, Chain) {
		let config = MarkovConfig::default().with_order(1).with_max_repeat(4);
		let chain = ChainBuilder::new(1).build("a b a c a b d");
		(config, chain)
	}

	#[test]
	fn round_trip_preserves_everything() {
		let (config, chain) = trained();
		let bytes = serialize(&config, &chain).unwrap();
		let (decoded_config, decoded_chain) = deserialize(&bytes).unwrap();

		assert_eq!(decoded_config, config);
		assert!(decoded_chain.same_multiset(&chain));
	}

	#[test]
	fn empty_chain_round_trips() {
		let bytes = serialize(&MarkovConfig::default(), &Chain::new()).unwrap();
		let (_, chain) = deserialize(&bytes).unwrap();
		assert!(chain.is_empty());
	}

	#[test]
	fn foreign_bytes_are_rejected() {
		let result = deserialize(b"definitely not a model");
		assert!(matches!(result, Err(MarkovError::Decoding(DecodeFailure::BadMagic))));

		let result = deserialize(&[]);
		assert!(matches!(result, Err(MarkovError::Decoding(DecodeFailure::BadMagic))));
	}

	#[test]
	fn unknown_version_is_rejected() {
		let (config, chain) = trained();
		let mut bytes = serialize(&config, &chain).unwrap();
		// Version is a varint right after the 4 magic bytes
		bytes[4] = 9;
		let result = deserialize(&bytes);
		assert!(matches!(
			result,
			Err(MarkovError::Decoding(DecodeFailure::UnsupportedVersion { found: 9, expected: FORMAT_VERSION }))
		));
	}

	#[test]
	fn truncated_bytes_are_rejected() {
		let (config, chain) = trained();
		let bytes = serialize(&config, &chain).unwrap();
		let result = deserialize(&bytes[..bytes.len() - 3]);
		assert!(matches!(result, Err(MarkovError::Decoding(DecodeFailure::Malformed(_)))));
	}

	#[test]
	fn empty_suffix_list_is_rejected() {
		let config = MarkovConfig::default();
		let file = RawModelFile {
			magic: MAGIC,
			version: FORMAT_VERSION,
			config: &config,
			transitions: BTreeMap::from([("a b", vec!["c"]), ("b c", vec![])]),
		};
		let bytes = postcard::to_stdvec(&file).unwrap();

		let result = deserialize(&bytes);
		assert!(matches!(
			result,
			Err(MarkovError::Decoding(DecodeFailure::EmptySuffixes { prefix })) if prefix == "b c"
		));
	}

	#[test]
	fn hand_written_file_decodes() {
		let config = MarkovConfig::default().with_order(2);
		let file = RawModelFile {
			magic: MAGIC,
			version: FORMAT_VERSION,
			config: &config,
			transitions: BTreeMap::from([("a b", vec!["c", "c"])]),
		};
		let (_, chain) = deserialize(&postcard::to_stdvec(&file).unwrap()).unwrap();
		assert_eq!(chain.suffixes("a b").map(<[String]>::len), Some(2));
	}
}
