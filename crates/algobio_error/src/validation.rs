//! Input validation error types.

/// Reasons a request is rejected before it reaches the predictor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ValidationErrorKind {
    /// Fewer valid residues than the minimum after cleaning
    #[display("Sequence too short: {} valid residues, minimum is {}", length, min_len)]
    SequenceTooShort {
        /// Residues left after cleaning
        length: usize,
        /// Configured minimum
        min_len: usize,
    },
    /// A request parameter is out of range
    #[display("Invalid parameter '{}': {}", name, reason)]
    InvalidParameter {
        /// Parameter name as it appears in the request
        name: String,
        /// Why the value was rejected
        reason: String,
    },
    /// Body, query string or path could not be decoded
    #[display("Malformed request: {}", _0)]
    MalformedRequest(String),
}

/// Validation error with location tracking.
///
/// # Examples
///
/// ```
/// use algobio_error::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new(ValidationErrorKind::SequenceTooShort {
///     length: 8,
///     min_len: 150,
/// });
/// assert!(format!("{}", err).contains("minimum is 150"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", kind, line, file)]
pub struct ValidationError {
    /// The kind of error that occurred
    pub kind: ValidationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new validation error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ValidationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for an out-of-range request parameter.
    #[track_caller]
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        })
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ValidationErrorKind {
        &self.kind
    }
}
