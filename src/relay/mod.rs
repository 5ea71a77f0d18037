//! Forwarding handler subsystem.
//!
//! # Data Flow
//! ```text
//! inbound (method, body bytes)
//!     → method gate (POST only)
//!     → target.rs (configured / fallback / not configured)
//!     → body decode + JSON encode
//!     → UpstreamClient::post_json (exactly one call)
//!     → outcome classification
//!     → Relayed { status, json }  (error.rs renders failures)
//! ```
//!
//! Every path produces exactly one [`Relayed`]; nothing is retried.

pub mod error;
pub mod handler;
pub mod target;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::config::{MissingEndpointPolicy, RelayConfig};

pub use error::RelayError;
pub use handler::Relay;
pub use target::{Sanitized, UpstreamTarget};

/// The slice of configuration the handler reads on each request.
#[derive(Debug, Clone, PartialEq)]
pub struct RelaySettings {
    pub endpoint: Option<String>,
    pub missing_endpoint: MissingEndpointPolicy,
    pub fallback_endpoint: String,
    pub auth_hints: bool,
    pub pass_through_success_status: bool,
    pub max_body_bytes: usize,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self::from(&RelayConfig::default())
    }
}

impl From<&RelayConfig> for RelaySettings {
    fn from(config: &RelayConfig) -> Self {
        Self {
            endpoint: config.upstream.endpoint.clone(),
            missing_endpoint: config.upstream.missing_endpoint,
            fallback_endpoint: config.upstream.fallback_endpoint.clone(),
            auth_hints: config.upstream.auth_hints,
            pass_through_success_status: config.upstream.pass_through_success_status,
            max_body_bytes: config.limits.max_body_bytes,
        }
    }
}

/// The single response produced for an inbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct Relayed {
    pub status: StatusCode,
    pub body: Value,
}

impl IntoResponse for Relayed {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
