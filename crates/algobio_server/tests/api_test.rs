//! In-process tests for the HTTP surface.

use algobio_core::{ClassificationRecord, NewClassification};
use algobio_database::InMemoryClassificationRepository;
use algobio_error::{DatabaseError, DatabaseErrorKind, DatabaseResult, ModelResult};
use algobio_interface::{ClassificationRepository, Predictor, PredictorMetadata};
use algobio_models::SharedPredictor;
use algobio_server::{
    AppState, ClassificationService, PredictResponse, RegistryHandle, ServiceInfo,
    ServiceMetrics, create_router,
};
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tower::ServiceExt;

const CLASSES: [&str; 4] = ["Siphoviridae", "Myoviridae", "Podoviridae", "Herpesviridae"];

/// Predictor returning the same distribution for every input.
struct FixedPredictor {
    metadata: PredictorMetadata,
    classes: Vec<String>,
    probabilities: Vec<f64>,
    calls: AtomicUsize,
}

impl FixedPredictor {
    fn new(probabilities: Vec<f64>) -> Arc<Self> {
        Arc::new(Self {
            metadata: PredictorMetadata::new("family", 150, 2000),
            classes: CLASSES.iter().map(|c| c.to_string()).collect(),
            probabilities,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Predictor for FixedPredictor {
    fn metadata(&self) -> &PredictorMetadata {
        &self.metadata
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, _cleaned: &str) -> ModelResult<Vec<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.probabilities.clone())
    }
}

/// Store whose every call fails as if the database were down.
struct UnreachableRepository;

fn refused() -> DatabaseError {
    DatabaseError::new(DatabaseErrorKind::Connection("connection refused".to_string()))
}

#[async_trait]
impl ClassificationRepository for UnreachableRepository {
    async fn save(&self, _record: &NewClassification) -> DatabaseResult<i32> {
        Err(refused())
    }

    async fn get(&self, _id: i32) -> DatabaseResult<ClassificationRecord> {
        Err(refused())
    }

    async fn list(&self, _limit: usize) -> DatabaseResult<Vec<ClassificationRecord>> {
        Err(refused())
    }
}

fn app(
    predictor: Arc<dyn Predictor>,
    repository: Option<Arc<dyn ClassificationRepository>>,
) -> Router {
    let service = Arc::new(ClassificationService::new(
        SharedPredictor::loaded(predictor),
        repository,
        ServiceMetrics::new(),
    ));
    let state = AppState::new(
        service,
        ServiceInfo {
            app_name: "AI-CLASSIFIER".to_string(),
            service_title: "Virus DNA Classifier (with DB)".to_string(),
        },
        RegistryHandle::disabled("AI-CLASSIFIER").status(),
    );
    create_router(state, Duration::from_secs(5))
}

fn default_app() -> (
    Router,
    Arc<FixedPredictor>,
    Arc<InMemoryClassificationRepository>,
) {
    let predictor = FixedPredictor::new(vec![0.5, 0.3, 0.15, 0.05]);
    let repository = Arc::new(InMemoryClassificationRepository::new());
    let store: Arc<dyn ClassificationRepository> = repository.clone();
    let router = app(predictor.clone(), Some(store));
    (router, predictor, repository)
}

fn long_sequence() -> String {
    "ACGT".repeat(50)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(
        router,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

async fn post_predict(router: &Router, body: Value) -> (StatusCode, Value) {
    send(
        router,
        Request::builder()
            .method("POST")
            .uri("/predict")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

#[tokio::test]
async fn test_health_reports_app_name() {
    let (router, _, _) = default_app();
    let (status, body) = get(&router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "UP", "service": "AI-CLASSIFIER"}));
}

#[tokio::test]
async fn test_root_reports_service_title() {
    let (router, _, _) = default_app();
    let (status, body) = get(&router, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "ok", "service": "Virus DNA Classifier (with DB)"})
    );
}

#[tokio::test]
async fn test_predict_returns_top_three_and_saves() {
    let (router, _, repository) = default_app();
    let (status, body) =
        post_predict(&router, json!({"sequence": long_sequence(), "top_k": 3})).await;

    assert_eq!(status, StatusCode::OK);
    let response: PredictResponse = serde_json::from_value(body.clone()).unwrap();
    assert_eq!(response.label_type, "family");
    assert_eq!(response.prediction, "Siphoviridae");
    assert_eq!(response.prob, 0.5);
    let labels: Vec<&str> = response.top_k.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["Siphoviridae", "Myoviridae", "Podoviridae"]);
    assert_eq!(response.saved_id, Some(1));
    assert!(body.get("reason").is_none());
    assert_eq!(repository.len().await, 1);
}

#[tokio::test]
async fn test_short_sequence_rejected_before_inference() {
    let (router, predictor, repository) = default_app();
    let (status, body) = post_predict(&router, json!({"sequence": "acgtACGTxyz\n"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["detail"].as_str().unwrap().contains("8 valid residues"));
    assert_eq!(predictor.calls(), 0);
    assert!(repository.is_empty().await);
}

#[tokio::test]
async fn test_invalid_parameters_rejected() {
    let (router, predictor, _) = default_app();

    let (status, body) =
        post_predict(&router, json!({"sequence": long_sequence(), "top_k": 0})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _) =
        post_predict(&router, json!({"sequence": long_sequence(), "min_prob": 2.0})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(predictor.calls(), 0);
}

#[tokio::test]
async fn test_negative_top_k_gets_error_body() {
    let (router, predictor, _) = default_app();
    let (status, body) =
        post_predict(&router, json!({"sequence": long_sequence(), "top_k": -1})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["detail"].as_str().unwrap().contains("top_k"));
    assert_eq!(predictor.calls(), 0);
}

#[tokio::test]
async fn test_malformed_json_body_gets_error_body() {
    let (router, _, _) = default_app();
    let (status, body) = send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/predict")
            .header("Content-Type", "application/json")
            .body(Body::from("{\"sequence\": "))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_low_confidence_reports_unknown() {
    let (router, _, repository) = default_app();
    let (status, body) = post_predict(
        &router,
        json!({"sequence": long_sequence(), "min_prob": 0.6}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "unknown");
    assert_eq!(body["reason"], "low_confidence");
    assert_eq!(body["prob"], 0.5);
    assert_eq!(body["top_k"][0]["label"], "Siphoviridae");

    let stored = repository.get(1).await.unwrap();
    assert_eq!(stored.prediction, "unknown");
    assert_eq!(stored.reason.as_deref(), Some("low_confidence"));
}

#[tokio::test]
async fn test_threshold_equal_to_top_probability_passes() {
    let (router, _, _) = default_app();
    let (status, body) = post_predict(
        &router,
        json!({"sequence": long_sequence(), "min_prob": 0.5}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "Siphoviridae");
    assert!(body.get("reason").is_none());
}

#[tokio::test]
async fn test_save_false_leaves_store_untouched() {
    let (router, _, repository) = default_app();
    let (status, body) =
        post_predict(&router, json!({"sequence": long_sequence(), "save": false})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["saved_id"], Value::Null);
    assert!(repository.is_empty().await);
}

#[tokio::test]
async fn test_storage_fault_surfaces_as_unavailable() {
    let predictor = FixedPredictor::new(vec![0.5, 0.3, 0.15, 0.05]);
    let store: Arc<dyn ClassificationRepository> = Arc::new(UnreachableRepository);
    let router = app(predictor, Some(store));

    let (status, body) = post_predict(&router, json!({"sequence": long_sequence()})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "storage_unavailable");

    let (status, body) =
        post_predict(&router, json!({"sequence": long_sequence(), "save": false})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["saved_id"], Value::Null);
}

#[tokio::test]
async fn test_without_store_predictions_are_served_unsaved() {
    let predictor = FixedPredictor::new(vec![0.5, 0.3, 0.15, 0.05]);
    let router = app(predictor, None);

    let (status, body) = post_predict(&router, json!({"sequence": long_sequence()})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["saved_id"], Value::Null);

    let (status, body) = get(&router, "/classifications").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "storage_unavailable");
}

#[tokio::test]
async fn test_list_and_get_classifications() {
    let (router, _, _) = default_app();
    for _ in 0..3 {
        let (status, _) = post_predict(&router, json!({"sequence": long_sequence()})).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = get(&router, "/classifications?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    let records: Vec<ClassificationRecord> = serde_json::from_value(body).unwrap();
    let ids: Vec<i32> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![3, 2]);
    assert_eq!(records[0].sequence, long_sequence());

    let (status, body) = get(&router, "/classifications").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) = get(&router, "/classifications/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 2);
    assert_eq!(body["prediction"], "Siphoviridae");
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let (router, _, _) = default_app();
    let (status, body) = get(&router, "/classifications/42").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_zero_limit_rejected() {
    let (router, _, _) = default_app();
    let (status, body) = get(&router, "/classifications?limit=0").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_non_numeric_limit_gets_error_body() {
    let (router, _, _) = default_app();
    let (status, body) = get(&router, "/classifications?limit=abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Malformed request")
    );
}

#[tokio::test]
async fn test_non_numeric_id_gets_error_body() {
    let (router, _, _) = default_app();
    let (status, body) = get(&router, "/classifications/xyz").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_predictor_unavailable_until_installed() {
    let service = Arc::new(ClassificationService::new(
        SharedPredictor::empty(),
        None,
        ServiceMetrics::new(),
    ));
    let state = AppState::new(
        service.clone(),
        ServiceInfo {
            app_name: "AI-CLASSIFIER".to_string(),
            service_title: "Virus DNA Classifier (with DB)".to_string(),
        },
        RegistryHandle::disabled("AI-CLASSIFIER").status(),
    );
    let router = create_router(state, Duration::from_secs(5));

    let (status, body) = post_predict(&router, json!({"sequence": long_sequence()})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "model_unavailable");

    let replaced = service
        .predictor()
        .swap(FixedPredictor::new(vec![0.1, 0.7, 0.15, 0.05]));
    assert!(replaced.is_none());

    let (status, body) = post_predict(&router, json!({"sequence": long_sequence()})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "Myoviridae");
    assert_eq!(body["prob"], 0.7);
}

#[tokio::test]
async fn test_registry_status_when_disabled() {
    let (router, _, _) = default_app();
    let (status, body) = get(&router, "/registry").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"enabled": false, "app": "AI-CLASSIFIER", "state": "disabled"})
    );
}
