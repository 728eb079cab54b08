//! HTTP routes.

use crate::{
    ApiError, ClassificationService, HealthResponse, ListParams, PredictRequest, PredictResponse,
    RegistrationStatus, RegistryStatusResponse, RootResponse,
};
use algobio_core::ClassificationRecord;
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::instrument;

/// Names the service reports about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    /// Application name, as registered with the registry
    pub app_name: String,
    /// Human-readable title returned by `GET /`
    pub service_title: String,
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    service: Arc<ClassificationService>,
    info: Arc<ServiceInfo>,
    registry: watch::Receiver<RegistrationStatus>,
}

impl AppState {
    /// Create handler state.
    pub fn new(
        service: Arc<ClassificationService>,
        info: ServiceInfo,
        registry: watch::Receiver<RegistrationStatus>,
    ) -> Self {
        Self {
            service,
            info: Arc::new(info),
            registry,
        }
    }
}

/// Build the router with CORS, request tracing and a per-request deadline.
///
/// A request exceeding `timeout` is answered with 408.
pub fn create_router(state: AppState, timeout: Duration) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/classifications", get(list_classifications))
        .route("/classifications/:id", get(get_classification))
        .route("/registry", get(registry_status))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[instrument(skip_all)]
async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok".to_string(),
        service: state.info.service_title.clone(),
    })
}

/// Liveness only; does not touch the model or the store.
#[instrument(skip_all)]
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".to_string(),
        service: state.info.app_name.clone(),
    })
}

// Extractor rejections become `ApiError::Validation` (400).

#[instrument(skip_all)]
async fn predict(
    State(state): State<AppState>,
    request: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = request?;
    state.service.predict(request).await.map(Json)
}

#[instrument(skip_all)]
async fn list_classifications(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<ClassificationRecord>>, ApiError> {
    let Query(params) = params?;
    state.service.list(params).await.map(Json)
}

#[instrument(skip_all)]
async fn get_classification(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<ClassificationRecord>, ApiError> {
    let Path(id) = id?;
    state.service.get(id).await.map(Json)
}

#[instrument(skip_all)]
async fn registry_status(State(state): State<AppState>) -> Json<RegistryStatusResponse> {
    let status = state.registry.borrow().clone();
    Json(RegistryStatusResponse {
        enabled: status != RegistrationStatus::Disabled,
        app: state.info.app_name.clone(),
        status,
    })
}
