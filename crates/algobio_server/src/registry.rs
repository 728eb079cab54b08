//! Eureka service registration.
//!
//! Registration is best-effort: failures are logged and exposed through
//! [`RegistrationStatus`], and the HTTP service keeps serving regardless.

use crate::{RegistrySettings, ServiceMetrics};
use algobio_error::HttpError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

const DATA_CENTER_CLASS: &str = "com.netflix.appinfo.InstanceInfo$DefaultDataCenterInfo";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Registration state of this instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum RegistrationStatus {
    /// Registration turned off by configuration
    Disabled,
    /// Registration not attempted yet
    Pending,
    /// Registered and renewing the lease
    Registered,
    /// Last registry call failed
    Failed {
        /// Failure description
        detail: String,
    },
    /// Removed from the registry at shutdown
    Deregistered,
}

#[derive(Debug, Clone, Serialize)]
struct PortInfo {
    #[serde(rename = "$")]
    port: u16,
    #[serde(rename = "@enabled")]
    enabled: String,
}

#[derive(Debug, Clone, Serialize)]
struct DataCenterInfo {
    #[serde(rename = "@class")]
    class: &'static str,
    name: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct LeaseInfo {
    renewal_interval_in_secs: u64,
    duration_in_secs: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct InstanceInfo {
    instance_id: String,
    host_name: String,
    app: String,
    ip_addr: String,
    vip_address: String,
    secure_vip_address: String,
    status: &'static str,
    port: PortInfo,
    secure_port: PortInfo,
    home_page_url: String,
    status_page_url: String,
    health_check_url: String,
    data_center_info: DataCenterInfo,
    lease_info: LeaseInfo,
}

#[derive(Debug, Serialize)]
struct Registration<'a> {
    instance: &'a InstanceInfo,
}

/// Client for the Eureka REST API.
#[derive(Debug, Clone)]
pub struct EurekaClient {
    http: reqwest::Client,
    server_url: String,
    instance: InstanceInfo,
}

impl EurekaClient {
    /// Build a client advertising `host:port`.
    ///
    /// The instance id is `host:app:port`; the health check URL is
    /// `http://host:port/health`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the HTTP client cannot be built.
    pub fn new(settings: &RegistrySettings, host: &str, port: u16) -> Result<Self, HttpError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| HttpError::new(format!("Failed to build registry client: {}", e)))?;

        let app = settings.app_name.to_uppercase();
        let base = format!("http://{}:{}", host, port);
        let lease = settings.heartbeat_interval_secs;
        let instance = InstanceInfo {
            instance_id: format!("{}:{}:{}", host, settings.app_name.to_lowercase(), port),
            host_name: host.to_string(),
            app: app.clone(),
            ip_addr: host.to_string(),
            vip_address: settings.app_name.to_lowercase(),
            secure_vip_address: settings.app_name.to_lowercase(),
            status: "UP",
            port: PortInfo {
                port,
                enabled: "true".to_string(),
            },
            secure_port: PortInfo {
                port: 443,
                enabled: "false".to_string(),
            },
            home_page_url: format!("{}/", base),
            status_page_url: format!("{}/", base),
            health_check_url: format!("{}/health", base),
            data_center_info: DataCenterInfo {
                class: DATA_CENTER_CLASS,
                name: "MyOwn",
            },
            lease_info: LeaseInfo {
                renewal_interval_in_secs: lease,
                duration_in_secs: lease * 3,
            },
        };

        Ok(Self {
            http,
            server_url: settings.server_url.trim_end_matches('/').to_string(),
            instance,
        })
    }

    /// Registered application name.
    pub fn app(&self) -> &str {
        &self.instance.app
    }

    /// Instance id under which this process registers.
    pub fn instance_id(&self) -> &str {
        &self.instance.instance_id
    }

    fn app_url(&self) -> String {
        format!("{}/apps/{}", self.server_url, self.instance.app)
    }

    fn instance_url(&self) -> String {
        format!(
            "{}/{}",
            self.app_url(),
            urlencoding::encode(&self.instance.instance_id)
        )
    }

    /// Register this instance.
    #[instrument(skip(self), fields(instance_id = %self.instance.instance_id))]
    pub async fn register(&self) -> Result<(), HttpError> {
        let response = self
            .http
            .post(self.app_url())
            .json(&Registration {
                instance: &self.instance,
            })
            .send()
            .await
            .map_err(|e| HttpError::new(format!("Registration request failed: {}", e)))?;
        check_status(response, "register")
    }

    /// Renew the lease.
    ///
    /// A 404 means the registry forgot this instance; the caller should
    /// register again.
    #[instrument(skip(self), fields(instance_id = %self.instance.instance_id))]
    pub async fn heartbeat(&self) -> Result<(), HttpError> {
        let response = self
            .http
            .put(self.instance_url())
            .query(&[("status", "UP")])
            .send()
            .await
            .map_err(|e| HttpError::new(format!("Heartbeat request failed: {}", e)))?;
        check_status(response, "heartbeat")
    }

    /// Remove this instance from the registry.
    #[instrument(skip(self), fields(instance_id = %self.instance.instance_id))]
    pub async fn deregister(&self) -> Result<(), HttpError> {
        let response = self
            .http
            .delete(self.instance_url())
            .send()
            .await
            .map_err(|e| HttpError::new(format!("Deregistration request failed: {}", e)))?;
        check_status(response, "deregister")
    }
}

#[track_caller]
fn check_status(response: reqwest::Response, operation: &str) -> Result<(), HttpError> {
    let status = response.status();
    if status.is_success() {
        debug!(operation, status = status.as_u16(), "Registry call succeeded");
        Ok(())
    } else {
        Err(HttpError::status(
            status.as_u16(),
            format!("Registry {} returned {}", operation, status),
        ))
    }
}

/// Handle to the background registration task.
#[derive(Debug)]
pub struct RegistryHandle {
    app: String,
    status: watch::Receiver<RegistrationStatus>,
    stop: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl RegistryHandle {
    /// Handle for a process that does not register.
    pub fn disabled(app: impl Into<String>) -> Self {
        let (_tx, status) = watch::channel(RegistrationStatus::Disabled);
        Self {
            app: app.into(),
            status,
            stop: None,
            task: None,
        }
    }

    /// Register in the background and renew the lease every `interval`.
    pub fn spawn(client: EurekaClient, interval: Duration, metrics: ServiceMetrics) -> Self {
        let (status_tx, status) = watch::channel(RegistrationStatus::Pending);
        let (stop_tx, stop_rx) = watch::channel(false);
        let app = client.app().to_string();
        let task = tokio::spawn(run_registration(client, interval, metrics, status_tx, stop_rx));
        Self {
            app,
            status,
            stop: Some(stop_tx),
            task: Some(task),
        }
    }

    /// Registered application name.
    pub fn app(&self) -> &str {
        &self.app
    }

    /// Receiver tracking the registration state.
    pub fn status(&self) -> watch::Receiver<RegistrationStatus> {
        self.status.clone()
    }

    /// Stop renewing and deregister, waiting for the task to finish.
    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(true);
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Registry task ended abnormally");
            }
        }
    }
}

async fn run_registration(
    client: EurekaClient,
    interval: Duration,
    metrics: ServiceMetrics,
    status: watch::Sender<RegistrationStatus>,
    mut stop: watch::Receiver<bool>,
) {
    let mut registered = attempt_register(&client, &metrics, &status).await;

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !registered {
                    registered = attempt_register(&client, &metrics, &status).await;
                    continue;
                }
                match client.heartbeat().await {
                    Ok(()) => {
                        metrics.record_registry_event("heartbeat");
                        status.send_replace(RegistrationStatus::Registered);
                    }
                    Err(e) if e.status == Some(404) => {
                        warn!(
                            instance_id = client.instance_id(),
                            "Registry lost this instance, registering again"
                        );
                        registered = attempt_register(&client, &metrics, &status).await;
                    }
                    Err(e) => {
                        warn!(error = %e, "Registry heartbeat failed");
                        metrics.record_registry_event("heartbeat_failed");
                        status.send_replace(RegistrationStatus::Failed { detail: e.message });
                    }
                }
            }
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }
        }
    }

    if registered {
        match client.deregister().await {
            Ok(()) => {
                info!(instance_id = client.instance_id(), "Deregistered from registry");
                metrics.record_registry_event("deregistered");
                status.send_replace(RegistrationStatus::Deregistered);
            }
            Err(e) => {
                warn!(error = %e, "Registry deregistration failed");
                metrics.record_registry_event("deregister_failed");
                status.send_replace(RegistrationStatus::Failed { detail: e.message });
            }
        }
    }
}

async fn attempt_register(
    client: &EurekaClient,
    metrics: &ServiceMetrics,
    status: &watch::Sender<RegistrationStatus>,
) -> bool {
    match client.register().await {
        Ok(()) => {
            info!(
                app = client.app(),
                instance_id = client.instance_id(),
                "Registered with registry"
            );
            metrics.record_registry_event("registered");
            status.send_replace(RegistrationStatus::Registered);
            true
        }
        Err(e) => {
            warn!(error = %e, "Registry registration failed, will retry");
            metrics.record_registry_event("register_failed");
            status.send_replace(RegistrationStatus::Failed { detail: e.message });
            false
        }
    }
}
