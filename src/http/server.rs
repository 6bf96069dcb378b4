//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all relay handler
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener
//! - Dispatch every request to the relay
//! - Drain in-flight streams on shutdown

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::SetRequestIdLayer,
    trace::TraceLayer,
};

use crate::config::{ConfigError, RelayConfig};
use crate::http::request::{MakeRequestUuidV4, RequestIdExt, X_REQUEST_ID};
use crate::policy::PolicyTable;
use crate::relay::Relay;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server with the compiled-in source policy.
    pub fn new(config: RelayConfig) -> Result<Self, ConfigError> {
        Self::with_policy(config, PolicyTable::builtin())
    }

    /// Create a server with a caller-supplied policy table.
    pub fn with_policy(config: RelayConfig, policy: PolicyTable) -> Result<Self, ConfigError> {
        let relay = Relay::from_config(&config.upstream, policy)?;

        tracing::debug!(
            sources = relay.policy().sources().len(),
            allowed_hosts = relay.policy().aggregate().len(),
            api_base = %relay.api_base(),
            "Relay initialized"
        );

        let state = AppState {
            relay: Arc::new(relay),
        };
        let router = Self::build_router(state);

        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(relay_handler))
            .route("/{*path}", any(relay_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request.request_id(),
                )
            }))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
    }

    /// Run the server until a shutdown signal is received.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The underlying router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Single entry point: every path and method goes through the dispatcher.
async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.relay.dispatch(request).await
}
