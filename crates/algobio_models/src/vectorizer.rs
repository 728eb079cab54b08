//! Character n-gram feature hashing.

use crate::murmur::murmur3_32;
use algobio_error::{ModelError, ModelResult};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Row normalization applied after hashing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum FeatureNorm {
    /// Divide by the Euclidean norm
    #[default]
    #[display("l2")]
    L2,
    /// Divide by the sum of absolute values
    #[display("l1")]
    L1,
}

/// Sparse feature vector, sorted by index.
pub type SparseFeatures = Vec<(usize, f64)>;

/// Stateless character n-gram hashing vectorizer.
///
/// Every n-gram of length `ngram_range.0..=ngram_range.1` is hashed with
/// signed MurmurHash3 (seed 0) into `n_features` buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct HashingVectorizer {
    /// Inclusive n-gram length bounds
    ngram_range: (usize, usize),
    /// Size of the hashed feature space
    n_features: usize,
    /// Use the hash sign as the feature sign
    #[serde(default)]
    alternate_sign: bool,
    /// Row normalization, `None` keeps raw counts
    #[serde(default = "default_norm")]
    norm: Option<FeatureNorm>,
    /// Lowercase input before extracting n-grams
    #[serde(default = "default_lowercase")]
    lowercase: bool,
}

fn default_norm() -> Option<FeatureNorm> {
    Some(FeatureNorm::L2)
}

fn default_lowercase() -> bool {
    true
}

impl HashingVectorizer {
    /// Create a vectorizer, checking its parameters.
    pub fn new(
        ngram_range: (usize, usize),
        n_features: usize,
        alternate_sign: bool,
        norm: Option<FeatureNorm>,
        lowercase: bool,
    ) -> ModelResult<Self> {
        let vectorizer = Self {
            ngram_range,
            n_features,
            alternate_sign,
            norm,
            lowercase,
        };
        vectorizer.validate()?;
        Ok(vectorizer)
    }

    /// Check parameters loaded from an artifact.
    pub fn validate(&self) -> ModelResult<()> {
        let (lo, hi) = self.ngram_range;
        if lo == 0 || lo > hi {
            return Err(ModelError::load(format!("invalid ngram_range ({}, {})", lo, hi)));
        }
        if self.n_features == 0 {
            return Err(ModelError::load("n_features must be greater than zero"));
        }
        Ok(())
    }

    /// Bucket index and sign for one n-gram.
    fn bucket(&self, ngram: &str) -> (usize, f64) {
        let h = murmur3_32(ngram.as_bytes(), 0) as i32;
        // Widen first so |i32::MIN| does not overflow.
        let index = (i64::from(h).unsigned_abs() % self.n_features as u64) as usize;
        let sign = if self.alternate_sign && h < 0 { -1.0 } else { 1.0 };
        (index, sign)
    }

    /// Hash one document into a normalized sparse row.
    pub fn transform(&self, text: &str) -> SparseFeatures {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        bounds.push(text.len());
        let char_count = bounds.len() - 1;

        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        let (lo, hi) = self.ngram_range;
        for n in lo..=hi.min(char_count) {
            for start in 0..=(char_count - n) {
                let ngram = &text[bounds[start]..bounds[start + n]];
                let (index, sign) = self.bucket(ngram);
                *counts.entry(index).or_insert(0.0) += sign;
            }
        }

        let mut row: SparseFeatures = counts.into_iter().filter(|(_, v)| *v != 0.0).collect();

        let scale = match self.norm {
            Some(FeatureNorm::L2) => row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
            Some(FeatureNorm::L1) => row.iter().map(|(_, v)| v.abs()).sum::<f64>(),
            None => 1.0,
        };
        if scale > 0.0 && scale != 1.0 {
            for (_, value) in &mut row {
                *value /= scale;
            }
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_ngram_range_rejected() {
        assert!(HashingVectorizer::new((0, 3), 16, false, None, true).is_err());
        assert!(HashingVectorizer::new((4, 3), 16, false, None, true).is_err());
        assert!(HashingVectorizer::new((3, 5), 0, false, None, true).is_err());
    }

    #[test]
    fn test_ngram_count_without_norm() {
        let vectorizer = HashingVectorizer::new((3, 5), 1 << 18, false, None, true).unwrap();
        let row = vectorizer.transform("ACGTACGT");
        // 6 trigrams + 5 four-grams + 4 five-grams, some repeated.
        let total: f64 = row.iter().map(|(_, v)| v).sum();
        assert_eq!(total, 15.0);
    }

    #[test]
    fn test_short_text_yields_empty_row() {
        let vectorizer =
            HashingVectorizer::new((3, 5), 1024, false, Some(FeatureNorm::L2), true).unwrap();
        assert!(vectorizer.transform("AC").is_empty());
    }

    #[test]
    fn test_l2_row_has_unit_norm() {
        let vectorizer =
            HashingVectorizer::new((3, 5), 1 << 18, false, Some(FeatureNorm::L2), true).unwrap();
        let row = vectorizer.transform("GATTACAGATTACA");
        let norm: f64 = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_lowercase_makes_case_irrelevant() {
        let vectorizer =
            HashingVectorizer::new((3, 4), 4096, false, Some(FeatureNorm::L2), true).unwrap();
        assert_eq!(vectorizer.transform("ACGTN"), vectorizer.transform("acgtn"));
    }

    #[test]
    fn test_known_bucket() {
        // murmur3("acg", 0) = 0x3108d63b, which is positive as i32.
        let vectorizer = HashingVectorizer::new((3, 3), 1000, true, None, true).unwrap();
        let row = vectorizer.transform("ACG");
        assert_eq!(row, vec![((0x3108_d63b_u32 % 1000) as usize, 1.0)]);
    }
}
