//! Crate-level error aggregating every error kind.

use crate::{ConfigError, DatabaseError, HttpError, ModelError, ValidationError};

/// Crate-level error variants.
#[derive(Debug, derive_more::From)]
pub enum AlgobioErrorKind {
    /// Input rejected by sanitization or parameter checks
    Validation(ValidationError),
    /// Predictor unavailable or failed
    Model(ModelError),
    /// Persistence failure
    Database(DatabaseError),
    /// Configuration error
    Config(ConfigError),
    /// Outbound HTTP error
    Http(HttpError),
}

impl std::fmt::Display for AlgobioErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlgobioErrorKind::Validation(e) => write!(f, "{}", e),
            AlgobioErrorKind::Model(e) => write!(f, "{}", e),
            AlgobioErrorKind::Database(e) => write!(f, "{}", e),
            AlgobioErrorKind::Config(e) => write!(f, "{}", e),
            AlgobioErrorKind::Http(e) => write!(f, "{}", e),
        }
    }
}

/// AlgoBio error with kind discrimination.
#[derive(Debug)]
pub struct AlgobioError(Box<AlgobioErrorKind>);

impl AlgobioError {
    /// Create a new error from a kind.
    pub fn new(kind: AlgobioErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &AlgobioErrorKind {
        &self.0
    }
}

impl std::fmt::Display for AlgobioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AlgoBio Error: {}", self.0)
    }
}

impl std::error::Error for AlgobioError {}

impl<T> From<T> for AlgobioError
where
    T: Into<AlgobioErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for AlgoBio operations.
pub type AlgobioResult<T> = std::result::Result<T, AlgobioError>;
