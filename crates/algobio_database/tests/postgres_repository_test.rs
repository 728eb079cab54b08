//! Tests for the PostgreSQL classification repository.
//!
//! These need a live database: `DATABASE_URL=postgres://... cargo test -- --ignored`.

use algobio_core::{LabelScore, NewClassification, apply_confidence_gate};
use algobio_database::{DatabaseErrorKind, PgClassificationRepository};
use algobio_interface::ClassificationRepository;

fn connect() -> PgClassificationRepository {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for this test");
    PgClassificationRepository::connect(&url, 2).expect("database reachable")
}

fn record(probs: &[f64]) -> NewClassification {
    let ranked = probs
        .iter()
        .enumerate()
        .map(|(i, p)| LabelScore::new(format!("family_{}", i), *p))
        .collect();
    let prediction = apply_confidence_gate("family", ranked, 0.05).unwrap();
    NewClassification::from_prediction("ACGTACGTNNACGT", &prediction)
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_round_trip_preserves_fields() {
    let repo = connect();
    let new = record(&[0.5, 0.3, 0.15, 0.05]);

    let id = repo.save(&new).await.unwrap();
    let stored = repo.get(id).await.unwrap();

    assert_eq!(&stored.sequence, new.sequence());
    assert_eq!(&stored.label_type, new.label_type());
    assert_eq!(&stored.prediction, new.prediction());
    assert_eq!(stored.prob, *new.prob());
    assert_eq!(&stored.top_k, new.top_k());
    assert_eq!(&stored.reason, new.reason());
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_list_orders_by_descending_id() {
    let repo = connect();
    for _ in 0..3 {
        repo.save(&record(&[0.9, 0.1])).await.unwrap();
    }

    let listed = repo.list(3).await.unwrap();
    assert_eq!(listed.len(), 3);
    assert!(listed.windows(2).all(|w| w[0].id > w[1].id));
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_missing_id_is_not_found() {
    let repo = connect();
    let err = repo.get(i32::MAX).await.unwrap_err();
    assert_eq!(err.kind, DatabaseErrorKind::NotFound);
}
