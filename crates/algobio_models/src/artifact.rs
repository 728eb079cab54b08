//! Loading trained artifacts from disk.

use crate::linear::{LinearClassifier, LinearClassifierSpec};
use crate::vectorizer::HashingVectorizer;
use algobio_error::{ModelError, ModelResult};
use algobio_interface::{Predictor, PredictorMetadata};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Artifact metadata file name.
pub const META_FILE: &str = "meta.json";
/// Vectorizer parameters file name.
pub const VECTORIZER_FILE: &str = "vectorizer.json";
/// Classifier weights file name.
pub const MODEL_FILE: &str = "model.json";

/// Predictor backed by an exported hashing vectorizer and linear classifier.
///
/// Immutable after loading; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ArtifactPredictor {
    metadata: PredictorMetadata,
    vectorizer: HashingVectorizer,
    classifier: LinearClassifier,
}

impl ArtifactPredictor {
    /// Assemble a predictor from already-parsed parts.
    pub fn new(
        metadata: PredictorMetadata,
        vectorizer: HashingVectorizer,
        spec: LinearClassifierSpec,
    ) -> ModelResult<Self> {
        vectorizer.validate()?;
        if metadata.max_len() < metadata.min_len() || *metadata.max_len() == 0 {
            return Err(ModelError::load(format!(
                "invalid length bounds min_len={} max_len={}",
                metadata.min_len(),
                metadata.max_len()
            )));
        }
        let classifier = LinearClassifier::from_spec(spec, *vectorizer.n_features())?;
        Ok(Self {
            metadata,
            vectorizer,
            classifier,
        })
    }

    /// Load the three artifact documents from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`algobio_error::ModelErrorKind::Load`] when a file is missing,
    /// malformed, or inconsistent with the others.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn load(dir: impl AsRef<Path>) -> ModelResult<Self> {
        let dir = dir.as_ref();
        info!("Loading predictor artifacts");

        let metadata: PredictorMetadata = read_json(&dir.join(META_FILE))?;
        let vectorizer: HashingVectorizer = read_json(&dir.join(VECTORIZER_FILE))?;
        let spec: LinearClassifierSpec = read_json(&dir.join(MODEL_FILE))?;

        let predictor = Self::new(metadata, vectorizer, spec)?;
        info!(
            label_type = %predictor.metadata.label_type(),
            classes = predictor.classifier.classes().len(),
            n_features = predictor.vectorizer.n_features(),
            min_len = predictor.metadata.min_len(),
            max_len = predictor.metadata.max_len(),
            "Predictor artifacts loaded"
        );
        Ok(predictor)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> ModelResult<T> {
    debug!(path = %path.display(), "Reading artifact file");
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ModelError::load(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| ModelError::load(format!("{}: {}", path.display(), e)))
}

impl Predictor for ArtifactPredictor {
    fn metadata(&self) -> &PredictorMetadata {
        &self.metadata
    }

    fn classes(&self) -> &[String] {
        self.classifier.classes()
    }

    fn predict_proba(&self, cleaned: &str) -> ModelResult<Vec<f64>> {
        let features = self.vectorizer.transform(cleaned);
        self.classifier.predict_proba(&features)
    }
}
