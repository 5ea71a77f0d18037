//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the relay and health handlers
//! - Wire up middleware (request ID, tracing)
//! - Buffer the inbound body up to the configured limit
//! - Swap the settings snapshot when the config file changes
//! - Serve until the shutdown broadcast fires

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use hyper::body::Bytes;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::request::{request_id, MakeRequestUuidV4};
use crate::observability::metrics;
use crate::relay::{Relay, RelayError, RelaySettings, Relayed};
use crate::upstream::{AnyClient, TransportError, UpstreamClient};

/// Path of the liveness endpoint.
pub const HEALTH_PATH: &str = "/healthz";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState<C> {
    pub relay: Relay<C>,
    pub settings: Arc<ArcSwap<RelaySettings>>,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
    settings: Arc<ArcSwap<RelaySettings>>,
}

impl HttpServer {
    /// Create a server using the client strategy named in the config.
    pub fn new(config: RelayConfig) -> Result<Self, TransportError> {
        let client = AnyClient::from_kind(config.upstream.client)?;
        tracing::info!(client = ?client.kind(), "Upstream client initialized");
        Ok(Self::with_client(config, client))
    }

    /// Create a server around an explicit upstream client.
    pub fn with_client<C: UpstreamClient>(config: RelayConfig, client: C) -> Self {
        let settings = Arc::new(ArcSwap::from_pointee(RelaySettings::from(&config)));
        let state = AppState {
            relay: Relay::new(client),
            settings: settings.clone(),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            settings,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router<C: UpstreamClient>(config: &RelayConfig, state: AppState<C>) -> Router {
        Router::new()
            .route(&config.listener.route, any(relay_handler::<C>))
            .route(HEALTH_PATH, get(health_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            request_id = %request_id(request.headers()),
                            method = %request.method(),
                            path = %request.uri().path(),
                        )
                    }))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configs received on `config_updates` replace the settings snapshot;
    /// the server stops when `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<RelayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            route = %self.config.listener.route,
            "HTTP server starting"
        );

        let settings = self.settings.clone();
        let startup_config = self.config.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                reload(&settings, &startup_config, &new_config);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Handle to the live settings snapshot.
    pub fn settings(&self) -> Arc<ArcSwap<RelaySettings>> {
        self.settings.clone()
    }

    /// Get a reference to the startup config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

/// Replace the settings snapshot from a reloaded config.
///
/// Listener, route and client strategy are bound at startup and are not
/// affected.
pub fn reload(settings: &ArcSwap<RelaySettings>, startup: &RelayConfig, new_config: &RelayConfig) {
    if new_config.listener != startup.listener || new_config.upstream.client != startup.upstream.client {
        tracing::warn!("Listener and client changes require a restart; ignoring them");
    }
    settings.store(Arc::new(RelaySettings::from(new_config)));
    tracing::info!(
        endpoint_configured = new_config.upstream.endpoint.is_some(),
        policy = ?new_config.upstream.missing_endpoint,
        "Relay settings reloaded"
    );
}

/// Relay handler: buffers the body and hands it to [`Relay::handle`].
async fn relay_handler<C: UpstreamClient>(
    State(state): State<AppState<C>>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    // One snapshot per request, even if a reload lands mid-flight.
    let settings = state.settings.load_full();
    let (parts, body) = request.into_parts();

    tracing::info!(method = %parts.method, "Relay function triggered");

    // Non-POST requests are rejected before the body is read.
    let body = if parts.method == Method::POST {
        match axum::body::to_bytes(body, settings.max_body_bytes).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let err = RelayError::failure(e.to_string());
                tracing::error!(error = %err, "Failed to read request body");
                metrics::record_request(err.kind(), err.status().as_u16(), start);
                return Relayed::from(err).into_response();
            }
        }
    } else {
        Bytes::new()
    };

    state
        .relay
        .handle(&settings, &parts.method, &body)
        .await
        .into_response()
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
