use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use log::{debug, info};

use super::chain::Chain;
use crate::normalize::normalize;

/// Number of words scanned by one training task.
pub const CHUNK_SIZE: usize = 4096;

/// Builds a [`Chain`] from raw corpus text.
///
/// # Behavior
/// - Normalizes the text and splits it on whitespace.
/// - Cuts the word sequence into chunks of `chunk_size` words, each extended
///   by `order` words of overlap so no transition across a boundary is lost.
/// - Scans every chunk independently into a chunk-local chain. Each chunk is
///   one task; tasks are pulled from a shared cursor by a pool of scoped
///   worker threads sized from the number of CPUs, so a large corpus never
///   spawns one OS thread per chunk.
/// - Merges the partial chains in chunk order once all workers are done.
///
/// # Notes
/// - Chunks finish in any order, but merging by chunk index makes every
///   suffix list identical from one build to the next.
/// - A corpus of `order` words or fewer produces an empty chain.
#[derive(Debug, Clone)]
pub struct ChainBuilder {
	order: usize,
	chunk_size: usize,
}

impl ChainBuilder {
	/// Creates a builder for the given chain order (clamped to at least 1).
	pub fn new(order: usize) -> Self {
		Self { order: order.max(1), chunk_size: CHUNK_SIZE }
	}

	/// Overrides the chunk size (clamped to at least 1).
	pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
		self.chunk_size = chunk_size.max(1);
		self
	}

	/// Builds a chain from `text`.
	pub fn build(&self, text: &str) -> Chain {
		let text = normalize(text);
		let words: Vec<&str> = text.split_whitespace().collect();
		self.build_from_words(&words)
	}

	/// Splits `words` into overlapping chunk ranges.
	///
	/// Chunk `k` starts at `k * chunk_size` and ends `order` words past the
	/// next chunk start (or at the end of the corpus).
	fn chunk_ranges(&self, total: usize) -> Vec<(usize, usize)> {
		let mut ranges = Vec::new();
		let mut start = 0;
		while start + self.order < total {
			let end = (start + self.chunk_size + self.order).min(total);
			ranges.push((start, end));
			start += self.chunk_size;
		}
		ranges
	}

	/// Records every (prefix, suffix) pair of one chunk.
	fn scan_chunk(&self, chunk: &[&str]) -> Chain {
		let mut local = Chain::new();
		for window in chunk.windows(self.order + 1) {
			let prefix = window[..self.order].join(" ");
			let suffix = window[self.order].to_owned();
			local.add_transition(prefix, suffix);
		}
		local
	}

	fn build_from_words(&self, words: &[&str]) -> Chain {
		let ranges = self.chunk_ranges(words.len());
		let mut chain = Chain::new();
		if ranges.is_empty() {
			debug!("corpus of {} words is too short for order {}", words.len(), self.order);
			return chain;
		}

		let workers = num_cpus::get().clamp(1, ranges.len());
		let cursor = AtomicUsize::new(0);
		let (tx, rx) = mpsc::channel();

		thread::scope(|scope| {
			for _ in 0..workers {
				let tx = tx.clone();
				let cursor = &cursor;
				let ranges = &ranges;
				scope.spawn(move || {
					loop {
						let index = cursor.fetch_add(1, Ordering::Relaxed);
						let Some(&(start, end)) = ranges.get(index) else {
							break;
						};
						// Only fails once the receiver is gone
						if tx.send((index, self.scan_chunk(&words[start..end]))).is_err() {
							break;
						}
					}
				});
			}
			drop(tx);
		});

		let mut partials: Vec<(usize, Chain)> = rx.into_iter().collect();
		partials.sort_unstable_by_key(|(index, _)| *index);
		for (_, partial) in partials {
			chain.merge(partial);
		}

		info!(
			"built chain of order {}: {} words, {} chunks, {} workers, {} prefixes",
			self.order,
			words.len(),
			ranges.len(),
			workers,
			chain.len()
		);
		chain
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn records_every_transition() {
		let chain = ChainBuilder::new(2).build("the cat sat on the mat the cat ran");

		let mut after_the_cat = chain.suffixes("the cat").unwrap().to_vec();
		after_the_cat.sort();
		assert_eq!(after_the_cat, vec!["ran", "sat"]);
		assert_eq!(chain.suffixes("cat sat"), Some(&["on".to_owned()][..]));
		// "cat ran" is never followed by anything
		assert_eq!(chain.suffixes("cat ran"), None);
		assert_eq!(chain.total_transitions(), 7);
	}

	#[test]
	fn corpus_too_short_gives_empty_chain() {
		assert!(ChainBuilder::new(3).build("two words").is_empty());
		assert!(ChainBuilder::new(2).build("two words").is_empty());
		assert!(ChainBuilder::new(1).build("").is_empty());
		assert_eq!(ChainBuilder::new(1).build("two words").len(), 1);
	}

	#[test]
	fn prefixes_are_normalized() {
		let chain = ChainBuilder::new(1).build("Élan  ÉLAN\télan");
		assert_eq!(chain.suffixes("elan"), Some(&["elan".to_owned(), "elan".to_owned()][..]));
	}

	#[test]
	fn chunk_ranges_overlap_by_order() {
		let builder = ChainBuilder::new(2).with_chunk_size(4);
		assert_eq!(builder.chunk_ranges(10), vec![(0, 6), (4, 10)]);
		assert!(builder.chunk_ranges(2).is_empty());
		assert_eq!(builder.chunk_ranges(3), vec![(0, 3)]);
	}

	#[test]
	fn chunking_does_not_change_the_chain() {
		let text: String = (0..500).map(|i| format!("w{} ", (i * 7) % 23)).collect();

		let single = ChainBuilder::new(2).build(&text);
		for chunk_size in [1, 3, 17, 64] {
			let chunked = ChainBuilder::new(2).with_chunk_size(chunk_size).build(&text);
			assert!(single.same_multiset(&chunked), "chunk size {chunk_size}");
		}
	}

	#[test]
	fn suffix_order_follows_the_corpus() {
		let text: String = (0..300).map(|i| format!("k{} v{} ", i % 2, i)).collect();
		let builder = ChainBuilder::new(1).with_chunk_size(5);

		let first = builder.build(&text);
		let second = builder.build(&text);
		assert_eq!(first, second);

		let expected: Vec<String> = (0..300).filter(|i| i % 2 == 0).map(|i| format!("v{i}")).collect();
		assert_eq!(first.suffixes("k0"), Some(&expected[..]));
	}
}
