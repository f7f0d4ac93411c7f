use std::collections::BTreeMap;

use rand::Rng;
use rand::prelude::IteratorRandom;
use serde::{Deserialize, Serialize};

/// Word-level Markov chain: prefix → observed suffixes.
///
/// A prefix is `order` consecutive words joined by a single space, in
/// lowercase. Each observation of a suffix is kept as its own entry, so a
/// word seen three times after a prefix appears three times in its list and
/// uniform indexing picks it proportionally more often.
///
/// ## Responsibilities:
/// - Accumulate transitions during training
/// - Merge with another chain (parallel training support)
/// - Pick a random prefix or a random suffix for generation
///
/// ## Invariants
/// - Every stored suffix list is non-empty
/// - Prefixes are kept sorted, so a seeded random source always picks the
///   same prefix for the same chain
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Chain {
	/// Mapping from a prefix to every suffix observed after it.
	transitions: BTreeMap<String, Vec<String>>,
}

impl Chain {
	/// Creates an empty chain.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records one observation of `suffix` following `prefix`.
	pub fn add_transition(&mut self, prefix: String, suffix: String) {
		self.transitions.entry(prefix).or_default().push(suffix);
	}

	/// Merges another chain into this one.
	///
	/// Suffix lists of matching prefixes are concatenated, so multiplicities
	/// add up. Prefixes unknown to `self` are moved in as-is.
	pub fn merge(&mut self, other: Chain) {
		for (prefix, suffixes) in other.transitions {
			if suffixes.is_empty() {
				continue;
			}
			self.transitions.entry(prefix).or_default().extend(suffixes);
		}
	}

	/// Returns the suffixes recorded for `prefix`, if any.
	pub fn suffixes(&self, prefix: &str) -> Option<&[String]> {
		self.transitions
			.get(prefix)
			.map(Vec::as_slice)
			.filter(|suffixes| !suffixes.is_empty())
	}

	/// Picks a uniformly random prefix.
	///
	/// Returns `None` if the chain is empty.
	pub fn random_prefix<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		self.transitions.keys().choose(rng).map(String::as_str)
	}

	/// Picks a suffix of `prefix` by uniform index into its suffix list.
	///
	/// Returns `None` if the prefix is unknown.
	pub fn pick_suffix<R: Rng + ?Sized>(&self, prefix: &str, rng: &mut R) -> Option<&str> {
		let suffixes = self.suffixes(prefix)?;
		Some(suffixes[rng.random_range(0..suffixes.len())].as_str())
	}

	/// Number of distinct prefixes.
	pub fn len(&self) -> usize {
		self.transitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.transitions.is_empty()
	}

	/// Iterates over every stored prefix, in sorted order.
	pub fn prefixes(&self) -> impl Iterator<Item = &str> {
		self.transitions.keys().map(String::as_str)
	}

	/// Returns the first prefix whose suffix list is empty, if any.
	///
	/// Chains built here never hold one; decoded chains are checked with it.
	pub(crate) fn prefix_without_suffixes(&self) -> Option<&str> {
		self.transitions
			.iter()
			.find(|(_, suffixes)| suffixes.is_empty())
			.map(|(prefix, _)| prefix.as_str())
	}

	/// Total number of recorded transitions (sum of all suffix list lengths).
	pub fn total_transitions(&self) -> usize {
		self.transitions.values().map(Vec::len).sum()
	}

	/// Compares two chains as multiset-valued mappings.
	///
	/// Suffix order inside a list is ignored; multiplicities are not.
	pub fn same_multiset(&self, other: &Chain) -> bool {
		if self.transitions.len() != other.transitions.len() {
			return false;
		}
		self.transitions.iter().all(|(prefix, suffixes)| {
			let Some(theirs) = other.transitions.get(prefix) else {
				return false;
			};
			let mut mine = suffixes.clone();
			let mut theirs = theirs.clone();
			mine.sort_unstable();
			theirs.sort_unstable();
			mine == theirs
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn chain_of(pairs: &[(&str, &str)]) -> Chain {
		let mut chain = Chain::new();
		for (prefix, suffix) in pairs {
			chain.add_transition((*prefix).to_owned(), (*suffix).to_owned());
		}
		chain
	}

	#[test]
	fn duplicates_are_kept() {
		let chain = chain_of(&[("a b", "c"), ("a b", "c"), ("a b", "d")]);
		assert_eq!(chain.len(), 1);
		assert_eq!(chain.suffixes("a b"), Some(&["c".to_owned(), "c".to_owned(), "d".to_owned()][..]));
		assert_eq!(chain.total_transitions(), 3);
	}

	#[test]
	fn merge_adds_multiplicities() {
		let mut left = chain_of(&[("a b", "c"), ("b c", "d")]);
		let right = chain_of(&[("a b", "c"), ("x y", "z")]);
		left.merge(right);

		assert_eq!(left.len(), 3);
		assert_eq!(left.suffixes("a b").map(<[String]>::len), Some(2));
		assert_eq!(left.suffixes("x y"), Some(&["z".to_owned()][..]));
	}

	#[test]
	fn same_multiset_ignores_suffix_order() {
		let left = chain_of(&[("a b", "c"), ("a b", "d")]);
		let right = chain_of(&[("a b", "d"), ("a b", "c")]);
		let other = chain_of(&[("a b", "d"), ("a b", "d")]);

		assert!(left.same_multiset(&right));
		assert!(!left.same_multiset(&other));
		assert!(!left.same_multiset(&Chain::new()));
	}

	#[test]
	fn random_picks_stay_inside_the_chain() {
		let chain = chain_of(&[("a b", "c"), ("b c", "d"), ("c d", "e")]);
		let mut rng = StdRng::seed_from_u64(7);
		for _ in 0..50 {
			let prefix = chain.random_prefix(&mut rng).unwrap();
			assert!(chain.suffixes(prefix).is_some());
			assert!(chain.pick_suffix(prefix, &mut rng).is_some());
		}
		assert_eq!(chain.pick_suffix("nope", &mut rng), None);
		assert_eq!(Chain::new().random_prefix(&mut rng), None);
	}

	#[test]
	fn prefix_pick_depends_on_seed_only() {
		let pairs: Vec<(String, String)> = (0..40).map(|i| (format!("p{i}"), format!("s{i}"))).collect();
		let build = |reversed: bool| {
			let mut chain = Chain::new();
			let mut ordered = pairs.clone();
			if reversed {
				ordered.reverse();
			}
			for (prefix, suffix) in ordered {
				chain.add_transition(prefix, suffix);
			}
			chain
		};

		let (left, right) = (build(false), build(true));
		let mut left_rng = StdRng::seed_from_u64(42);
		let mut right_rng = StdRng::seed_from_u64(42);
		for _ in 0..20 {
			assert_eq!(left.random_prefix(&mut left_rng), right.random_prefix(&mut right_rng));
		}
		assert_eq!(left.prefix_without_suffixes(), None);
	}
}
