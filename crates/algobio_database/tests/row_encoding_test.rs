//! Tests for the row encoding used by the PostgreSQL store.
//!
//! These exercise the `top_k_json` column codec without a database.

use algobio_core::{ClassificationRecord, LabelScore, NewClassification, apply_confidence_gate};
use algobio_database::{ClassificationRow, DatabaseErrorKind, NewClassificationRow};
use chrono::{NaiveDate, NaiveDateTime};

fn stamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(12, 30, 0)
        .unwrap()
}

/// Encode as for an insert, then read back as a select would.
fn store_and_load(new: &NewClassification, id: i32) -> ClassificationRecord {
    let row = NewClassificationRow::from_new(new, stamp()).unwrap();
    let loaded = ClassificationRow {
        id,
        sequence: row.sequence().clone(),
        label_type: row.label_type().clone(),
        prediction: row.prediction().clone(),
        prob: *row.prob(),
        top_k_json: row.top_k_json().clone(),
        reason: row.reason().clone(),
        created_at: *row.created_at(),
    };
    loaded.into_record().unwrap()
}

fn record(probs: &[f64], min_prob: f64) -> NewClassification {
    let ranked = probs
        .iter()
        .enumerate()
        .map(|(i, p)| LabelScore::new(format!("family_{}", i), *p))
        .collect();
    let prediction = apply_confidence_gate("family", ranked, min_prob).unwrap();
    NewClassification::from_prediction("ACGTNNACGT", &prediction)
}

/// xorshift64, mapped onto [0, 1) with full mantissa precision.
struct Floats(u64);

impl Iterator for Floats {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        Some((self.0 >> 11) as f64 / (1u64 << 53) as f64)
    }
}

#[test]
fn test_row_round_trip_preserves_fields() {
    let new = record(&[0.5, 0.3, 0.15, 0.05], 0.05);
    let stored = store_and_load(&new, 7);

    assert_eq!(stored.id, 7);
    assert_eq!(&stored.sequence, new.sequence());
    assert_eq!(&stored.label_type, new.label_type());
    assert_eq!(&stored.prediction, new.prediction());
    assert_eq!(stored.prob, *new.prob());
    assert_eq!(&stored.top_k, new.top_k());
    assert_eq!(&stored.reason, new.reason());
    assert_eq!(stored.created_at, stamp().and_utc());
}

#[test]
fn test_probability_bits_survive_json_column() {
    let new = record(&[0.38566829194149443, 0.2], 0.05);
    let stored = store_and_load(&new, 1);

    assert_eq!(
        stored.top_k[0].prob.to_bits(),
        0.38566829194149443_f64.to_bits()
    );
    assert_eq!(stored.top_k[0].prob, stored.prob);
}

#[test]
fn test_arbitrary_probabilities_round_trip_exactly() {
    let mut floats = Floats(0x9e37_79b9_7f4a_7c15);

    for id in 0..5_000 {
        let mut probs: Vec<f64> = floats.by_ref().take(4).collect();
        probs.sort_by(|a, b| b.total_cmp(a));

        let new = record(&probs, 0.0);
        let stored = store_and_load(&new, id);

        assert_eq!(&stored.top_k, new.top_k(), "ranking changed for {:?}", probs);
        assert_eq!(stored.top_k[0].prob, stored.prob);
    }
}

#[test]
fn test_malformed_ranking_is_serialization_error() {
    let row = ClassificationRow {
        id: 1,
        sequence: "ACGT".to_string(),
        label_type: "family".to_string(),
        prediction: "unknown".to_string(),
        prob: 0.0,
        top_k_json: "not json".to_string(),
        reason: None,
        created_at: stamp(),
    };

    let err = row.into_record().unwrap_err();
    assert!(matches!(err.kind, DatabaseErrorKind::Serialization(_)));
}
