//! Process lifecycle: load, connect, register, serve, shut down.

use crate::{
    AppState, ClassificationService, EurekaClient, RegistryHandle, ServiceConfig, ServiceInfo,
    ServiceMetrics, create_router,
};
use algobio_database::PgClassificationRepository;
use algobio_error::{AlgobioResult, ConfigError, DatabaseError, DatabaseErrorKind};
use algobio_interface::{ClassificationRepository, Predictor};
use algobio_models::{ArtifactPredictor, SharedPredictor};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

/// Run the service until a shutdown signal arrives.
///
/// Artifact loading and store connection happen before the listener binds;
/// either failing aborts startup. Registration runs in the background and
/// is removed again after the server drains.
///
/// # Errors
///
/// Returns an error if the model cannot be loaded, the store cannot be
/// reached, or the listener cannot bind.
#[instrument(skip_all, fields(host = %config.server.host, port = config.server.port))]
pub async fn run(config: ServiceConfig) -> AlgobioResult<()> {
    let predictor = ArtifactPredictor::load(&config.model.dir)?;
    info!(
        dir = %config.model.dir.display(),
        classes = predictor.classes().len(),
        "Model artifacts loaded"
    );
    let predictor = SharedPredictor::loaded(Arc::new(predictor));

    let repository = connect_store(&config).await?;
    let metrics = ServiceMetrics::new();
    let service = Arc::new(ClassificationService::new(predictor, repository, metrics.clone()));

    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .map_err(|e| {
            ConfigError::new(format!(
                "Cannot bind {}:{}: {}",
                config.server.host, config.server.port, e
            ))
        })?;

    let registry = if config.registry.enabled {
        let host = config
            .registry
            .instance_host
            .as_deref()
            .unwrap_or(&config.server.host);
        let client = EurekaClient::new(&config.registry, host, config.server.port)?;
        info!(
            server = %config.registry.server_url,
            instance_id = client.instance_id(),
            "Starting registry client"
        );
        RegistryHandle::spawn(client, config.registry.heartbeat_interval(), metrics)
    } else {
        RegistryHandle::disabled(config.registry.app_name.clone())
    };

    let state = AppState::new(
        service,
        ServiceInfo {
            app_name: config.registry.app_name.clone(),
            service_title: config.server.service_title.clone(),
        },
        registry.status(),
    );
    let app = create_router(state, config.server.request_timeout());

    info!("Listening for requests");
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    registry.shutdown().await;
    served.map_err(|e| ConfigError::new(format!("Server error: {}", e)))?;
    info!("Server stopped");
    Ok(())
}

async fn connect_store(
    config: &ServiceConfig,
) -> AlgobioResult<Option<Arc<dyn ClassificationRepository>>> {
    if !config.database.enabled {
        warn!("Classification store disabled, predictions will not be persisted");
        return Ok(None);
    }

    let url = config.database.connection_url();
    let pool_size = config.database.pool_size;
    let repository =
        tokio::task::spawn_blocking(move || PgClassificationRepository::connect(&url, pool_size))
            .await
            .map_err(|e| {
                DatabaseError::new(DatabaseErrorKind::Connection(format!(
                    "Connect task failed: {}",
                    e
                )))
            })??;
    let repository: Arc<dyn ClassificationRepository> = Arc::new(repository);
    Ok(Some(repository))
}

/// Resolve when the process receives Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
