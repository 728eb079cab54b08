//! Classification request flow.

use crate::{ApiError, ListParams, PredictRequest, PredictResponse, ServiceMetrics};
use algobio_core::{
    ClassificationRecord, NewClassification, SequenceSanitizer, apply_confidence_gate,
};
use algobio_interface::ClassificationRepository;
use algobio_models::SharedPredictor;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Sanitize, classify, gate and optionally persist sequences.
///
/// The store is optional: without one, `save` requests are answered with
/// `saved_id: null`.
#[derive(Clone)]
pub struct ClassificationService {
    predictor: SharedPredictor,
    repository: Option<Arc<dyn ClassificationRepository>>,
    metrics: ServiceMetrics,
}

impl ClassificationService {
    /// Create a service over a predictor and an optional store.
    pub fn new(
        predictor: SharedPredictor,
        repository: Option<Arc<dyn ClassificationRepository>>,
        metrics: ServiceMetrics,
    ) -> Self {
        Self {
            predictor,
            repository,
            metrics,
        }
    }

    /// Predictor handle; swapping through it reloads the model for all requests.
    pub fn predictor(&self) -> &SharedPredictor {
        &self.predictor
    }

    /// Classify one sequence.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Validation`] for bad parameters or too few residues
    /// - [`ApiError::Model`] if no predictor is loaded or inference fails
    /// - [`ApiError::Database`] if persistence was requested and failed
    #[instrument(
        skip(self, request),
        fields(
            raw_len = request.sequence.len(),
            top_k = request.top_k,
            min_prob = request.min_prob,
            save = request.save
        )
    )]
    pub async fn predict(&self, request: PredictRequest) -> Result<PredictResponse, ApiError> {
        if let Err(e) = request.validate() {
            self.metrics.record_rejection("invalid_parameter");
            return Err(e.into());
        }

        let predictor = self.predictor.current()?;
        let metadata = predictor.metadata();
        let sanitizer = SequenceSanitizer::new(*metadata.min_len(), *metadata.max_len())
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let cleaned = match sanitizer.clean(&request.sequence) {
            Ok(cleaned) => cleaned,
            Err(e) => {
                self.metrics.record_rejection("too_short");
                return Err(e.into());
            }
        };
        debug!(cleaned_len = cleaned.len(), "Sequence sanitized");

        let started = Instant::now();
        let ranked = predictor.classify(&cleaned, request.top_k)?;
        let prediction = apply_confidence_gate(metadata.label_type(), ranked, request.min_prob)?;
        self.metrics.record_prediction(
            prediction.label_type(),
            prediction.is_suppressed(),
            started.elapsed().as_secs_f64(),
        );
        debug!(
            prediction = %prediction.prediction(),
            prob = prediction.prob(),
            "Sequence classified"
        );

        let saved_id = if request.save {
            self.persist(NewClassification::from_prediction(&cleaned, &prediction))
                .await?
        } else {
            None
        };

        info!(
            prediction = %prediction.prediction(),
            prob = prediction.prob(),
            saved_id,
            "Prediction served"
        );
        Ok(PredictResponse::new(&prediction, saved_id))
    }

    async fn persist(&self, record: NewClassification) -> Result<Option<i32>, ApiError> {
        let Some(repository) = &self.repository else {
            warn!("Persistence requested but no classification store is configured");
            return Ok(None);
        };

        match repository.save(&record).await {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                self.metrics.record_storage_failure("save");
                Err(e.into())
            }
        }
    }

    /// Fetch one stored classification.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] with a not-found kind for unknown ids,
    /// or a store error.
    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<ClassificationRecord, ApiError> {
        let repository = self.require_repository()?;
        repository.get(id).await.map_err(|e| {
            if !e.is_not_found() {
                self.metrics.record_storage_failure("get");
            }
            e.into()
        })
    }

    /// List stored classifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a bad limit or a store error.
    #[instrument(skip(self))]
    pub async fn list(&self, params: ListParams) -> Result<Vec<ClassificationRecord>, ApiError> {
        let limit = params.resolve()?;
        let repository = self.require_repository()?;
        repository.list(limit).await.map_err(|e| {
            self.metrics.record_storage_failure("list");
            e.into()
        })
    }

    fn require_repository(&self) -> Result<&Arc<dyn ClassificationRepository>, ApiError> {
        self.repository.as_ref().ok_or_else(|| {
            ApiError::Database(algobio_error::DatabaseError::new(
                algobio_error::DatabaseErrorKind::Connection(
                    "no classification store is configured".to_string(),
                ),
            ))
        })
    }
}

impl std::fmt::Debug for ClassificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationService")
            .field("predictor", &self.predictor)
            .field("repository", &self.repository.is_some())
            .field("metrics", &self.metrics)
            .finish()
    }
}
