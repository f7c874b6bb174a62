//! Admission Webhook for ManagedMachinePool
//!
//! This module exposes the admission engine over HTTP the way the API server
//! calls it:
//! - Mutating webhook: applies defaults on create and answers with a JSON patch
//! - Validating webhook: runs create or update validation; deletes pass
//!
//! Each request is evaluated independently; handlers share no mutable state.

pub mod pool;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tracing::info;

use crate::admission::PoolAdmission;
use crate::config::ServerConfig;
use crate::Error;

/// Path of the mutating (defaulting) webhook
pub const MUTATE_PATH: &str = "/mutate-infrastructure-cluster-x-k8s-io-v1beta1-managedmachinepool";

/// Path of the validating webhook
pub const VALIDATE_PATH: &str =
    "/validate-infrastructure-cluster-x-k8s-io-v1beta1-managedmachinepool";

/// Shared state for webhook handlers
#[derive(Clone)]
pub struct WebhookState {
    /// Defaulting and validation engine
    pub admission: PoolAdmission,
}

impl WebhookState {
    /// Create a new webhook state around the admission engine
    pub fn new(admission: PoolAdmission) -> Self {
        Self { admission }
    }
}

/// Create the webhook router with all admission endpoints
///
/// - POST [`MUTATE_PATH`] - default ManagedMachinePools on create
/// - POST [`VALIDATE_PATH`] - validate ManagedMachinePool create/update
/// - GET /healthz - liveness probe
pub fn webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route(MUTATE_PATH, post(pool::mutate_handler))
        .route(VALIDATE_PATH, post(pool::validate_handler))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state)
}

/// Serve the router until the process receives Ctrl-C
pub async fn serve(config: &ServerConfig, router: Router) -> Result<(), Error> {
    match &config.tls {
        Some(tls) => {
            let tls_config =
                axum_server::tls_rustls::RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                    .await
                    .map_err(|e| Error::server("tls", e.to_string()))?;

            let handle = axum_server::Handle::new();
            let shutdown = handle.clone();
            tokio::spawn(async move {
                let _ = tokio::signal::ctrl_c().await;
                shutdown.graceful_shutdown(None);
            });

            info!(addr = %config.addr, "Starting HTTPS admission webhook");
            axum_server::bind_rustls(config.addr, tls_config)
                .handle(handle)
                .serve(router.into_make_service())
                .await
                .map_err(|e| Error::server("listener", e.to_string()))
        }
        None => {
            let listener = tokio::net::TcpListener::bind(config.addr)
                .await
                .map_err(|e| Error::server("listener", e.to_string()))?;

            info!(addr = %config.addr, "Starting HTTP admission webhook");
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await
                .map_err(|e| Error::server("listener", e.to_string()))
        }
    }
}
