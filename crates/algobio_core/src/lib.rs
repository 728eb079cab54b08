//! Core data types for the AlgoBio sequence classifier.
//!
//! This crate holds what every other crate agrees on: the nucleotide
//! sanitizer, the ranked prediction types with the confidence gate, the
//! stored classification record, and tracing/metrics initialization.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod classification;
mod observability;
mod record;
mod sanitizer;

pub use classification::{
    LOW_CONFIDENCE_REASON, LabelScore, Prediction, UNKNOWN_LABEL, apply_confidence_gate,
};
pub use observability::{LogFormat, init_observability, init_tracing, shutdown_observability};
pub use record::{ClassificationRecord, NewClassification, NewClassificationBuilder};
pub use sanitizer::{NUCLEOTIDE_ALPHABET, SequenceSanitizer};
