//! Diesel models for the classifications table.

use crate::DatabaseResult;
use algobio_core::{ClassificationRecord, LabelScore, NewClassification};
use chrono::NaiveDateTime;
use derive_getters::Getters;
use diesel::prelude::*;

/// Database row for the classifications table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = crate::schema::classifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ClassificationRow {
    /// Record id
    pub id: i32,
    /// Sanitized sequence
    pub sequence: String,
    /// Taxonomy name
    pub label_type: String,
    /// Winning label or the unknown sentinel
    pub prediction: String,
    /// Probability of the top-ranked label
    pub prob: f64,
    /// Ranked candidates as a JSON array of `{label, prob}`
    pub top_k_json: String,
    /// Set only when the confidence gate fired
    pub reason: Option<String>,
    /// Write timestamp (UTC)
    pub created_at: NaiveDateTime,
}

impl ClassificationRow {
    /// Decode the row into the domain record.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if `top_k_json` is not a valid ranking.
    pub fn into_record(self) -> DatabaseResult<ClassificationRecord> {
        let top_k: Vec<LabelScore> = serde_json::from_str(&self.top_k_json)?;
        Ok(ClassificationRecord {
            id: self.id,
            sequence: self.sequence,
            label_type: self.label_type,
            prediction: self.prediction,
            prob: self.prob,
            top_k,
            reason: self.reason,
            created_at: self.created_at.and_utc(),
        })
    }
}

/// Insertable struct for the classifications table.
#[derive(Debug, Clone, Insertable, Getters)]
#[diesel(table_name = crate::schema::classifications)]
pub struct NewClassificationRow {
    /// Sanitized sequence
    sequence: String,
    /// Taxonomy name
    label_type: String,
    /// Winning label or the unknown sentinel
    prediction: String,
    /// Probability of the top-ranked label
    prob: f64,
    /// Ranked candidates as JSON
    top_k_json: String,
    /// Set only when the confidence gate fired
    reason: Option<String>,
    /// Write timestamp (UTC)
    created_at: NaiveDateTime,
}

impl NewClassificationRow {
    /// Encode a domain record, stamping it with `created_at`.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the ranking cannot be encoded.
    pub fn from_new(
        record: &NewClassification,
        created_at: NaiveDateTime,
    ) -> DatabaseResult<Self> {
        Ok(Self {
            sequence: record.sequence().clone(),
            label_type: record.label_type().clone(),
            prediction: record.prediction().clone(),
            prob: *record.prob(),
            top_k_json: serde_json::to_string(record.top_k())?,
            reason: record.reason().clone(),
            created_at,
        })
    }
}
