//! Word-level Markov chain text generation library.
//!
//! This crate provides:
//! - Corpus normalization (diacritic stripping, case folding)
//! - Parallel construction of fixed-order word chains
//! - Stochastic text generation with repetition and sentence control
//! - A compact, versioned binary model format with atomic file persistence
//! - Loading of models bundled as embedded resources
//!
//! ```
//! use rs_markov_core::{MarkovConfig, MarkovModel};
//!
//! let model = MarkovModel::new(MarkovConfig::default());
//! model.build("the cat sat on the mat and the cat ran off");
//! let text = model.generate(12).unwrap();
//! assert_eq!(text.split_whitespace().count(), 12);
//! ```

/// Error type shared by every fallible operation.
pub mod error;

/// Corpus loading and atomic file writes.
pub mod io;

/// Chain, builder, generator and the owning model.
pub mod model;

/// Text canonicalization applied before tokenization.
pub mod normalize;

/// Bundled, read-only model resources.
pub mod resources;

/// Binary model encoding.
pub mod store;

pub use error::{DecodeFailure, MarkovError, Result};
pub use model::chain::Chain;
pub use model::config::MarkovConfig;
pub use model::markov_model::MarkovModel;
pub use normalize::normalize;
