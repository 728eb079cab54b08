//! Predictor error types.

/// Predictor failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ModelErrorKind {
    /// Artifacts have not been loaded yet
    #[display("Model artifacts are not loaded")]
    Unavailable,
    /// Artifact files are missing, unreadable, or inconsistent
    #[display("Failed to load model artifact: {}", _0)]
    Load(String),
    /// `top_k` was zero
    #[display("top_k must be at least 1, got {}", _0)]
    InvalidTopK(usize),
    /// The forward pass produced something unusable
    #[display("Inference failed: {}", _0)]
    Inference(String),
}

/// Predictor error with location tracking.
///
/// # Examples
///
/// ```
/// use algobio_error::{ModelError, ModelErrorKind};
///
/// let err = ModelError::new(ModelErrorKind::Unavailable);
/// assert!(format!("{}", err).contains("not loaded"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Model Error: {} at line {} in {}", kind, line, file)]
pub struct ModelError {
    /// The kind of error that occurred
    pub kind: ModelErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ModelError {
    /// Create a new model error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ModelErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for an artifact loading failure.
    #[track_caller]
    pub fn load(message: impl Into<String>) -> Self {
        Self::new(ModelErrorKind::Load(message.into()))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ModelErrorKind {
        &self.kind
    }
}

/// Result type for predictor operations.
pub type ModelResult<T> = Result<T, ModelError>;
