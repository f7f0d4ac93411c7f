//! Top-level module for the Markov text model.
//!
//! This module provides a word-level Markov chain text generator, including:
//! - The prefix → suffix table (`Chain`)
//! - Parallel chain construction from a corpus (`ChainBuilder`)
//! - The random walk producing text (`Generator`) and its formatting rules
//! - Model configuration (`MarkovConfig`)
//! - The owning, thread-safe model (`MarkovModel`)

/// Parallel, chunked construction of a chain from corpus text.
pub mod builder;

/// Prefix → suffix table with duplicate-based frequencies.
///
/// Supports merging (parallel training) and uniform random picks.
pub mod chain;

/// Model configuration and its clamping rules.
pub mod config;

/// Random walk over a trained chain.
pub mod generator;

/// Owning model: configuration, locked chain and random source.
///
/// Handles training, generation, persistence and cached loading.
pub mod markov_model;

/// Per-call generation rules (repetition guard, sentence and paragraph
/// shaping). Not exposed publicly.
mod rules;
