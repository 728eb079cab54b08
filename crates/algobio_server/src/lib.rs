//! HTTP service for DNA sequence classification.
//!
//! Requests flow through the sanitizer, the shared predictor and the
//! confidence gate, and are optionally persisted to the classification store.
//! An optional Eureka registration runs beside the server and never blocks it.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod api;
mod config;
mod error;
mod metrics;
mod registry;
mod request;
mod response;
mod server;
mod service;

pub use api::{AppState, ServiceInfo, create_router};
pub use config::{
    DatabaseSettings, LoggingSettings, ModelSettings, RegistrySettings, ServerSettings,
    ServiceConfig,
};
pub use error::ApiError;
pub use metrics::ServiceMetrics;
pub use registry::{EurekaClient, RegistrationStatus, RegistryHandle};
pub use request::{ListParams, PredictRequest};
pub use response::{
    ErrorBody, HealthResponse, PredictResponse, RegistryStatusResponse, RootResponse,
};
pub use server::{run, shutdown_signal};
pub use service::ClassificationService;
