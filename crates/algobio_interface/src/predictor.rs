//! Predictor trait and ranking.

use algobio_core::LabelScore;
use algobio_error::{ModelError, ModelErrorKind, ModelResult};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Metadata shipped alongside a trained predictor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct PredictorMetadata {
    /// Taxonomy name of the predicted labels (e.g. "family")
    #[serde(alias = "label_col")]
    label_type: String,
    /// Minimum number of residues after cleaning
    min_len: usize,
    /// Maximum number of residues fed to the predictor
    max_len: usize,
}

impl PredictorMetadata {
    /// Create new predictor metadata.
    pub fn new(label_type: impl Into<String>, min_len: usize, max_len: usize) -> Self {
        Self {
            label_type: label_type.into(),
            min_len,
            max_len,
        }
    }
}

/// A trained probabilistic classifier over cleaned sequences.
///
/// Implementations are immutable once constructed and safe to share across
/// concurrent requests.
pub trait Predictor: Send + Sync {
    /// Metadata the predictor was trained with.
    fn metadata(&self) -> &PredictorMetadata;

    /// Known class labels, in the order `predict_proba` reports them.
    fn classes(&self) -> &[String];

    /// Per-class probabilities for one cleaned sequence.
    fn predict_proba(&self, cleaned: &str) -> ModelResult<Vec<f64>>;

    /// The `top_k` most probable labels, descending by probability.
    ///
    /// `top_k` larger than the number of classes returns every class.
    ///
    /// # Errors
    ///
    /// Returns [`ModelErrorKind::InvalidTopK`] when `top_k` is zero, before
    /// any inference runs.
    fn classify(&self, cleaned: &str, top_k: usize) -> ModelResult<Vec<LabelScore>> {
        if top_k == 0 {
            return Err(ModelError::new(ModelErrorKind::InvalidTopK(top_k)));
        }
        let probabilities = self.predict_proba(cleaned)?;
        rank_probabilities(self.classes(), &probabilities, top_k)
    }
}

/// Pair labels with probabilities, sort descending and keep `top_k`.
///
/// The sort is stable, so equal probabilities keep class order.
///
/// # Errors
///
/// Returns [`ModelErrorKind::Inference`] when the lengths differ or a
/// probability is NaN.
pub fn rank_probabilities(
    classes: &[String],
    probabilities: &[f64],
    top_k: usize,
) -> ModelResult<Vec<LabelScore>> {
    if classes.len() != probabilities.len() {
        return Err(ModelError::new(ModelErrorKind::Inference(format!(
            "{} probabilities for {} classes",
            probabilities.len(),
            classes.len()
        ))));
    }
    if probabilities.iter().any(|p| p.is_nan()) {
        return Err(ModelError::new(ModelErrorKind::Inference(
            "probability vector contains NaN".to_string(),
        )));
    }

    let mut ranked: Vec<LabelScore> = classes
        .iter()
        .zip(probabilities)
        .map(|(label, prob)| LabelScore::new(label.clone(), *prob))
        .collect();
    ranked.sort_by(|a, b| b.prob.total_cmp(&a.prob));
    ranked.truncate(top_k);

    tracing::trace!(returned = ranked.len(), "Ranked class probabilities");
    Ok(ranked)
}
