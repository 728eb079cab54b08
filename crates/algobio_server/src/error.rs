//! HTTP error mapping.

use crate::ErrorBody;
use algobio_error::{
    DatabaseError, DatabaseErrorKind, ModelError, ModelErrorKind, ValidationError,
    ValidationErrorKind,
};
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

/// Error returned by request handlers.
#[derive(Debug, derive_more::Display)]
pub enum ApiError {
    /// Input rejected before inference
    #[display("{}", _0)]
    Validation(ValidationError),
    /// Predictor missing or failing
    #[display("{}", _0)]
    Model(ModelError),
    /// Store failure
    #[display("{}", _0)]
    Database(DatabaseError),
    /// Anything else
    #[display("Internal error: {}", _0)]
    Internal(String),
}

impl ApiError {
    /// Status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Model(e) => match e.kind() {
                ModelErrorKind::InvalidTopK(_) => StatusCode::BAD_REQUEST,
                ModelErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
                ModelErrorKind::Load(_) | ModelErrorKind::Inference(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Database(e) => match e.kind {
                DatabaseErrorKind::NotFound => StatusCode::NOT_FOUND,
                DatabaseErrorKind::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::SERVICE_UNAVAILABLE,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::Model(e) => match e.kind() {
                ModelErrorKind::InvalidTopK(_) => "validation_error",
                ModelErrorKind::Unavailable => "model_unavailable",
                ModelErrorKind::Load(_) | ModelErrorKind::Inference(_) => "internal",
            },
            ApiError::Database(e) => match e.kind {
                DatabaseErrorKind::NotFound => "not_found",
                DatabaseErrorKind::Serialization(_) => "internal",
                _ => "storage_unavailable",
            },
            ApiError::Internal(_) => "internal",
        }
    }

    /// Request body, query string or path that failed to decode.
    fn malformed(detail: String) -> Self {
        let kind = ValidationErrorKind::MalformedRequest(detail);
        ApiError::Validation(ValidationError::new(kind))
    }

    /// Client-facing detail, without source locations.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Validation(e) => e.kind().to_string(),
            ApiError::Model(e) => e.kind().to_string(),
            ApiError::Database(e) if e.is_not_found() => "Classification not found".to_string(),
            ApiError::Database(_) => "Classification store is unavailable".to_string(),
            ApiError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        ApiError::Model(err)
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Database(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::malformed(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::malformed(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::malformed(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), error = %self, "Request failed");
        } else {
            warn!(code = self.code(), error = %self, "Request rejected");
        }

        let body = ErrorBody {
            error: self.code().to_string(),
            detail: self.detail(),
        };
        (status, Json(body)).into_response()
    }
}
