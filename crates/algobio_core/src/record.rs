//! Stored classification records.

use crate::{LabelScore, Prediction, UNKNOWN_LABEL};
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A persisted prediction event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    /// Server-assigned identifier
    pub id: i32,
    /// Sanitized input sequence
    pub sequence: String,
    /// Taxonomy name
    pub label_type: String,
    /// Winning label or the unknown sentinel
    pub prediction: String,
    /// Probability of the top-ranked label
    pub prob: f64,
    /// Ranked candidates, descending by probability
    pub top_k: Vec<LabelScore>,
    /// Set only when the confidence gate fired
    pub reason: Option<String>,
    /// Write timestamp
    pub created_at: DateTime<Utc>,
}

/// A classification about to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into))]
pub struct NewClassification {
    /// Sanitized input sequence
    sequence: String,
    /// Taxonomy name
    label_type: String,
    /// Winning label or the unknown sentinel
    prediction: String,
    /// Probability of the top-ranked label
    prob: f64,
    /// Ranked candidates, descending by probability
    top_k: Vec<LabelScore>,
    /// Set only when the confidence gate fired
    #[builder(default)]
    reason: Option<String>,
}

impl NewClassification {
    /// Build the record for a gated prediction over a cleaned sequence.
    pub fn from_prediction(sequence: impl Into<String>, prediction: &Prediction) -> Self {
        Self {
            sequence: sequence.into(),
            label_type: prediction.label_type().clone(),
            prediction: prediction.prediction().clone(),
            prob: *prediction.prob(),
            top_k: prediction.top_k().clone(),
            reason: prediction.reason().clone(),
        }
    }

    /// Check the ordering invariants a stored record must satisfy.
    ///
    /// `top_k` must be sorted non-increasing, every probability must lie in
    /// [0, 1], and a non-sentinel prediction must match the first entry.
    pub fn check_invariants(&self) -> Result<(), String> {
        let in_range = |p: f64| (0.0..=1.0).contains(&p);

        if !in_range(self.prob) {
            return Err(format!("prob {} is outside [0, 1]", self.prob));
        }
        if let Some(bad) = self.top_k.iter().find(|s| !in_range(s.prob)) {
            return Err(format!(
                "top_k entry '{}' has probability {} outside [0, 1]",
                bad.label, bad.prob
            ));
        }
        if self.top_k.windows(2).any(|w| w[0].prob < w[1].prob) {
            return Err("top_k is not sorted by descending probability".to_string());
        }
        if self.prediction != UNKNOWN_LABEL {
            match self.top_k.first() {
                Some(first) if first.prob == self.prob && first.label == self.prediction => {}
                Some(first) => {
                    return Err(format!(
                        "prediction '{}' ({}) does not match top entry '{}' ({})",
                        self.prediction, self.prob, first.label, first.prob
                    ));
                }
                None => return Err("top_k is empty".to_string()),
            }
        }
        Ok(())
    }
}
