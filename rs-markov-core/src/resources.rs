use std::collections::HashMap;

/// A read-only set of bundled files keyed by logical path.
///
/// Used to load models shipped inside a binary instead of read from disk.
pub trait ResourceSet {
	/// Returns the bytes stored under `path`, if any.
	fn get(&self, path: &str) -> Option<&[u8]>;
}

/// Resource table built from `include_bytes!` entries.
///
/// ```
/// use rs_markov_core::resources::{ResourceSet, StaticResources};
///
/// static ENTRIES: [(&str, &[u8]); 1] = [("models/empty.bin", b"")];
/// static MODELS: StaticResources<'static> = StaticResources::new(&ENTRIES);
/// assert!(MODELS.get("models/empty.bin").is_some());
/// assert!(MODELS.get("models/other.bin").is_none());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct StaticResources<'a> {
	entries: &'a [(&'a str, &'a [u8])],
}

impl<'a> StaticResources<'a> {
	pub const fn new(entries: &'a [(&'a str, &'a [u8])]) -> Self {
		Self { entries }
	}

	/// Logical paths of every bundled resource.
	pub fn paths(&self) -> impl Iterator<Item = &'a str> {
		self.entries.iter().map(|(path, _)| *path)
	}
}

impl ResourceSet for StaticResources<'_> {
	fn get(&self, path: &str) -> Option<&[u8]> {
		let path = path.trim_start_matches("./");
		self.entries
			.iter()
			.find(|(name, _)| name.trim_start_matches("./") == path)
			.map(|(_, bytes)| *bytes)
	}
}

impl ResourceSet for HashMap<String, Vec<u8>> {
	fn get(&self, path: &str) -> Option<&[u8]> {
		HashMap::get(self, path).map(Vec::as_slice)
	}
}
