//! Linear classifier forward pass.

use crate::vectorizer::SparseFeatures;
use algobio_error::{ModelError, ModelErrorKind, ModelResult};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How decision values become probabilities.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum LinkFunction {
    /// Per-class logistic, normalized to sum to one (one-vs-rest log loss)
    #[default]
    #[display("ovr_logistic")]
    OvrLogistic,
    /// Multinomial softmax
    #[display("softmax")]
    Softmax,
}

/// One coefficient row as stored in `model.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoefRow {
    /// `[[index, weight], ...]`
    Sparse(Vec<(usize, f64)>),
    /// One weight per feature
    Dense(Vec<f64>),
}

/// Serialized form of a linear classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifierSpec {
    /// Class labels in output order
    pub classes: Vec<String>,
    /// One intercept per coefficient row
    pub intercept: Vec<f64>,
    /// One row per class, or a single row for binary problems
    pub coef: Vec<CoefRow>,
    /// Probability link
    #[serde(default)]
    pub link: LinkFunction,
}

/// Validated linear classifier ready for inference.
#[derive(Debug, Clone, Getters)]
pub struct LinearClassifier {
    /// Class labels in output order
    classes: Vec<String>,
    /// One intercept per row
    #[getter(skip)]
    intercept: Vec<f64>,
    /// Non-zero weights per row
    #[getter(skip)]
    weights: Vec<HashMap<usize, f64>>,
    /// Probability link
    link: LinkFunction,
}

impl LinearClassifier {
    /// Validate a loaded spec against the feature space size.
    pub fn from_spec(spec: LinearClassifierSpec, n_features: usize) -> ModelResult<Self> {
        let LinearClassifierSpec {
            classes,
            intercept,
            coef,
            link,
        } = spec;

        if classes.is_empty() {
            return Err(ModelError::load("model has no classes"));
        }
        if coef.len() != intercept.len() {
            return Err(ModelError::load(format!(
                "{} coefficient rows but {} intercepts",
                coef.len(),
                intercept.len()
            )));
        }
        let binary = classes.len() == 2 && coef.len() == 1;
        if coef.len() != classes.len() && !binary {
            return Err(ModelError::load(format!(
                "{} coefficient rows for {} classes",
                coef.len(),
                classes.len()
            )));
        }
        if binary && link == LinkFunction::Softmax {
            return Err(ModelError::load("softmax link needs one coefficient row per class"));
        }

        let mut weights = Vec::with_capacity(coef.len());
        for (row_index, row) in coef.into_iter().enumerate() {
            let entries: Vec<(usize, f64)> = match row {
                CoefRow::Sparse(entries) => entries,
                CoefRow::Dense(values) => {
                    if values.len() != n_features {
                        return Err(ModelError::load(format!(
                            "dense row {} has {} weights, expected {}",
                            row_index,
                            values.len(),
                            n_features
                        )));
                    }
                    values.into_iter().enumerate().collect()
                }
            };

            let mut row_weights = HashMap::new();
            for (index, weight) in entries {
                if index >= n_features {
                    return Err(ModelError::load(format!(
                        "row {} references feature {} outside {} features",
                        row_index, index, n_features
                    )));
                }
                if weight != 0.0 {
                    *row_weights.entry(index).or_insert(0.0) += weight;
                }
            }
            weights.push(row_weights);
        }

        Ok(Self {
            classes,
            intercept,
            weights,
            link,
        })
    }

    /// Raw decision value per coefficient row.
    pub fn decision_function(&self, features: &SparseFeatures) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.intercept)
            .map(|(row, bias)| {
                features
                    .iter()
                    .filter_map(|(index, value)| row.get(index).map(|w| w * value))
                    .sum::<f64>()
                    + bias
            })
            .collect()
    }

    /// Probability per class, in class order.
    pub fn predict_proba(&self, features: &SparseFeatures) -> ModelResult<Vec<f64>> {
        let decision = self.decision_function(features);
        if decision.iter().any(|d| !d.is_finite()) {
            return Err(ModelError::new(ModelErrorKind::Inference(
                "non-finite decision value".to_string(),
            )));
        }

        let probabilities = match self.link {
            LinkFunction::OvrLogistic if decision.len() == 1 => {
                let p = expit(decision[0]);
                vec![1.0 - p, p]
            }
            LinkFunction::OvrLogistic => {
                let raw: Vec<f64> = decision.iter().map(|d| expit(*d)).collect();
                let total: f64 = raw.iter().sum();
                if total > 0.0 {
                    raw.iter().map(|p| p / total).collect()
                } else {
                    vec![1.0 / raw.len() as f64; raw.len()]
                }
            }
            LinkFunction::Softmax => {
                let max = decision.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let exp: Vec<f64> = decision.iter().map(|d| (d - max).exp()).collect();
                let total: f64 = exp.iter().sum();
                exp.iter().map(|e| e / total).collect()
            }
        };
        Ok(probabilities)
    }
}

fn expit(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}
