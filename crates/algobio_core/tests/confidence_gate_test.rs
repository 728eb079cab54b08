//! Tests for the confidence gate and stored record invariants.

use algobio_core::{
    LOW_CONFIDENCE_REASON, LabelScore, NewClassification, NewClassificationBuilder, UNKNOWN_LABEL,
    apply_confidence_gate,
};

fn ranked(probs: &[f64]) -> Vec<LabelScore> {
    probs
        .iter()
        .enumerate()
        .map(|(i, p)| LabelScore::new(format!("family_{}", i), *p))
        .collect()
}

#[test]
fn test_top_label_wins_above_threshold() {
    let prediction = apply_confidence_gate("family", ranked(&[0.5, 0.3, 0.15]), 0.05).unwrap();
    assert_eq!(prediction.prediction(), "family_0");
    assert_eq!(*prediction.prob(), 0.5);
    assert!(prediction.reason().is_none());
    assert!(!prediction.is_suppressed());
    assert_eq!(prediction.label_type(), "family");
}

#[test]
fn test_below_threshold_reports_unknown_and_keeps_ranking() {
    let candidates = ranked(&[0.04, 0.03, 0.02]);
    let prediction = apply_confidence_gate("family", candidates.clone(), 0.05).unwrap();
    assert_eq!(prediction.prediction(), UNKNOWN_LABEL);
    assert_eq!(prediction.reason().as_deref(), Some(LOW_CONFIDENCE_REASON));
    assert_eq!(*prediction.prob(), 0.04);
    assert_eq!(prediction.top_k(), &candidates);
}

#[test]
fn test_threshold_is_exclusive() {
    let at = apply_confidence_gate("family", ranked(&[0.05]), 0.05).unwrap();
    assert_eq!(at.prediction(), "family_0");

    let below = apply_confidence_gate("family", ranked(&[0.0499]), 0.05).unwrap();
    assert_eq!(below.prediction(), UNKNOWN_LABEL);
}

#[test]
fn test_gate_iff_probability_below_threshold() {
    for p in [0.0, 0.1, 0.25, 0.5, 0.75, 1.0] {
        for min_prob in [0.0, 0.05, 0.25, 0.5, 0.9, 1.0] {
            let prediction = apply_confidence_gate("family", ranked(&[p]), min_prob).unwrap();
            assert_eq!(
                prediction.is_suppressed(),
                p < min_prob,
                "p={} min_prob={}",
                p,
                min_prob
            );
        }
    }
}

#[test]
fn test_empty_ranking_is_an_error() {
    assert!(apply_confidence_gate("family", Vec::new(), 0.05).is_err());
}

#[test]
fn test_record_from_prediction_satisfies_invariants() {
    for probs in [[0.5, 0.3, 0.2], [0.01, 0.005, 0.001]] {
        let prediction = apply_confidence_gate("family", ranked(&probs), 0.05).unwrap();
        let record = NewClassification::from_prediction("ACGT", &prediction);
        assert_eq!(record.sequence(), "ACGT");
        assert_eq!(record.reason(), prediction.reason());
        assert!(record.check_invariants().is_ok());
    }
}

#[test]
fn test_unsorted_top_k_violates_invariants() {
    let record = NewClassificationBuilder::default()
        .sequence("ACGT")
        .label_type("family")
        .prediction("family_1")
        .prob(0.6)
        .top_k(vec![
            LabelScore::new("family_0", 0.3),
            LabelScore::new("family_1", 0.6),
        ])
        .build()
        .unwrap();
    assert!(record.check_invariants().is_err());
}

#[test]
fn test_mismatched_prob_violates_invariants() {
    let record = NewClassificationBuilder::default()
        .sequence("ACGT")
        .label_type("family")
        .prediction("family_0")
        .prob(0.9)
        .top_k(ranked(&[0.6, 0.4]))
        .build()
        .unwrap();
    assert!(record.check_invariants().is_err());
}
