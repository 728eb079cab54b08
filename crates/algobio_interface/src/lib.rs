//! Trait definitions shared by the AlgoBio crates.
//!
//! The service talks to the predictor and the classification store only
//! through these traits, so either side can be swapped for an in-memory or
//! fixed implementation in tests.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod predictor;
mod repository;

pub use predictor::{Predictor, PredictorMetadata, rank_probabilities};
pub use repository::ClassificationRepository;
