//! Ranked predictions and the confidence gate.

use algobio_error::{ModelError, ModelErrorKind, ModelResult};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Label reported when the top probability falls below the threshold.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Reason attached when the confidence gate suppresses a prediction.
pub const LOW_CONFIDENCE_REASON: &str = "low_confidence";

/// One candidate label with its probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    /// Class label
    pub label: String,
    /// Probability in [0, 1]
    pub prob: f64,
}

impl LabelScore {
    /// Create a new label score.
    pub fn new(label: impl Into<String>, prob: f64) -> Self {
        Self {
            label: label.into(),
            prob,
        }
    }
}

/// Outcome of classifying one sequence after the confidence gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct Prediction {
    /// Taxonomy the labels belong to (e.g. "family")
    label_type: String,
    /// Winning label, or [`UNKNOWN_LABEL`]
    prediction: String,
    /// Probability of the top-ranked label
    prob: f64,
    /// Ranked candidates, descending by probability
    top_k: Vec<LabelScore>,
    /// Set only when the gate suppressed the prediction
    reason: Option<String>,
}

impl Prediction {
    /// Whether the confidence gate replaced the top label.
    pub fn is_suppressed(&self) -> bool {
        self.reason.is_some()
    }
}

/// Apply the confidence gate to a ranked candidate list.
///
/// The top entry wins unless its probability is below `min_prob`, in which
/// case the prediction becomes [`UNKNOWN_LABEL`] with reason
/// [`LOW_CONFIDENCE_REASON`]. The ranked list and `prob` are kept as-is either
/// way.
///
/// # Errors
///
/// Returns [`ModelErrorKind::Inference`] if `ranked` is empty.
///
/// # Examples
///
/// ```
/// use algobio_core::{LabelScore, apply_confidence_gate};
///
/// let ranked = vec![LabelScore::new("Siphoviridae", 0.02)];
/// let prediction = apply_confidence_gate("family", ranked, 0.05).unwrap();
/// assert_eq!(prediction.prediction(), "unknown");
/// assert_eq!(prediction.reason().as_deref(), Some("low_confidence"));
/// ```
pub fn apply_confidence_gate(
    label_type: impl Into<String>,
    ranked: Vec<LabelScore>,
    min_prob: f64,
) -> ModelResult<Prediction> {
    let top = ranked.first().ok_or_else(|| {
        ModelError::new(ModelErrorKind::Inference(
            "predictor returned no candidates".to_string(),
        ))
    })?;

    let prob = top.prob;
    let (prediction, reason) = if prob < min_prob {
        (
            UNKNOWN_LABEL.to_string(),
            Some(LOW_CONFIDENCE_REASON.to_string()),
        )
    } else {
        (top.label.clone(), None)
    };

    Ok(Prediction {
        label_type: label_type.into(),
        prediction,
        prob,
        top_k: ranked,
        reason,
    })
}
