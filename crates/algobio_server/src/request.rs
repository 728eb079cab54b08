//! Request bodies and query parameters.

use algobio_error::ValidationError;
use serde::{Deserialize, Serialize};

/// Default number of ranked candidates returned.
pub const DEFAULT_TOP_K: usize = 5;

/// Default confidence threshold.
pub const DEFAULT_MIN_PROB: f64 = 0.05;

/// Default page size for listing classifications.
pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// Body of `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Raw nucleotide text
    pub sequence: String,
    /// Number of ranked candidates to return
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Confidence threshold for the top label
    #[serde(default = "default_min_prob")]
    pub min_prob: f64,
    /// Whether to persist the outcome
    #[serde(default = "default_save")]
    pub save: bool,
}

impl PredictRequest {
    /// Request with default parameters.
    pub fn new(sequence: impl Into<String>) -> Self {
        Self {
            sequence: sequence.into(),
            top_k: DEFAULT_TOP_K,
            min_prob: DEFAULT_MIN_PROB,
            save: true,
        }
    }

    /// Check parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if `top_k` is zero or `min_prob` lies
    /// outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.top_k == 0 {
            return Err(ValidationError::invalid_parameter("top_k", "must be at least 1"));
        }
        if !self.min_prob.is_finite() || !(0.0..=1.0).contains(&self.min_prob) {
            return Err(ValidationError::invalid_parameter(
                "min_prob",
                format!("must be within [0, 1], got {}", self.min_prob),
            ));
        }
        Ok(())
    }
}

/// Query parameters of `GET /classifications`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    /// Maximum number of records, newest first
    pub limit: Option<i64>,
}

impl ListParams {
    /// Effective limit.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the limit is below 1.
    pub fn resolve(&self) -> Result<usize, ValidationError> {
        let limit = self.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        usize::try_from(limit)
            .ok()
            .filter(|l| *l >= 1)
            .ok_or_else(|| {
                ValidationError::invalid_parameter(
                    "limit",
                    format!("must be at least 1, got {}", limit),
                )
            })
    }
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_min_prob() -> f64 {
    DEFAULT_MIN_PROB
}

fn default_save() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let request: PredictRequest = serde_json::from_str(r#"{"sequence": "ACGT"}"#).unwrap();
        assert_eq!(request, PredictRequest::new("ACGT"));
    }

    #[test]
    fn test_parameter_ranges() {
        let mut request = PredictRequest::new("ACGT");
        assert!(request.validate().is_ok());

        request.top_k = 0;
        assert!(request.validate().is_err());

        request.top_k = 3;
        request.min_prob = 1.5;
        assert!(request.validate().is_err());

        request.min_prob = f64::NAN;
        assert!(request.validate().is_err());

        request.min_prob = 1.0;
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_list_limit() {
        assert_eq!(ListParams::default().resolve().unwrap(), 50);
        assert_eq!(ListParams { limit: Some(3) }.resolve().unwrap(), 3);
        assert!(ListParams { limit: Some(0) }.resolve().is_err());
        assert!(ListParams { limit: Some(-4) }.resolve().is_err());
    }
}
