//! Response bodies.

use crate::RegistrationStatus;
use algobio_core::{LabelScore, Prediction};
use serde::{Deserialize, Serialize};

/// Body of a successful `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Taxonomy the labels belong to
    pub label_type: String,
    /// Winning label or `"unknown"`
    pub prediction: String,
    /// Probability of the top-ranked label
    pub prob: f64,
    /// Ranked candidates, descending
    pub top_k: Vec<LabelScore>,
    /// Present only when the confidence gate fired
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Store id, `null` when nothing was persisted
    pub saved_id: Option<i32>,
}

impl PredictResponse {
    /// Build from a gated prediction.
    pub fn new(prediction: &Prediction, saved_id: Option<i32>) -> Self {
        Self {
            label_type: prediction.label_type().clone(),
            prediction: prediction.prediction().clone(),
            prob: *prediction.prob(),
            top_k: prediction.top_k().clone(),
            reason: prediction.reason().clone(),
            saved_id,
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"UP"` while the process serves requests
    pub status: String,
    /// Registered application name
    pub service: String,
}

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootResponse {
    /// Always `"ok"`
    pub status: String,
    /// Human-readable service name
    pub service: String,
}

/// Body of `GET /registry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryStatusResponse {
    /// Whether registration is configured
    pub enabled: bool,
    /// Registered application name
    pub app: String,
    /// Current registration state
    #[serde(flatten)]
    pub status: RegistrationStatus,
}

/// Error body returned when a handler fails or an extractor rejects the
/// request. A request that exceeds the deadline gets 408 with an empty body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable machine-readable code
    pub error: String,
    /// Human-readable explanation
    pub detail: String,
}
