//! Error types for the AlgoBio sequence classifier.
//!
//! Every error carries the source location where it was created, so a log line
//! points straight at the failing call site.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod database;
mod error;
mod http;
mod model;
mod validation;

pub use config::ConfigError;
pub use database::{DatabaseError, DatabaseErrorKind, DatabaseResult};
pub use error::{AlgobioError, AlgobioErrorKind, AlgobioResult};
pub use http::HttpError;
pub use model::{ModelError, ModelErrorKind, ModelResult};
pub use validation::{ValidationError, ValidationErrorKind};
