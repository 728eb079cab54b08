//! Predictor adapter for exported linear text classifiers.
//!
//! A trained artifact is a directory holding three JSON documents:
//!
//! - `meta.json`: label taxonomy and input length bounds
//! - `vectorizer.json`: character n-gram hashing parameters
//! - `model.json`: class labels, sparse coefficients, intercepts and link
//!
//! [`ArtifactPredictor`] evaluates the forward pass of that artifact and
//! [`SharedPredictor`] shares the loaded value across requests.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod artifact;
mod linear;
mod murmur;
mod shared;
mod vectorizer;

pub use artifact::{ArtifactPredictor, META_FILE, MODEL_FILE, VECTORIZER_FILE};
pub use linear::{CoefRow, LinearClassifier, LinearClassifierSpec, LinkFunction};
pub use murmur::murmur3_32;
pub use shared::SharedPredictor;
pub use vectorizer::{FeatureNorm, HashingVectorizer, SparseFeatures};
