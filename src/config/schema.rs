//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Default upstream used when `missing_endpoint = "fallback"`.
pub const DEFAULT_FALLBACK_ENDPOINT: &str = "http://localhost:7071/api/ai_agent";

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address, route).
    pub listener: ListenerConfig,

    /// Upstream endpoint and outbound-call strategy.
    pub upstream: UpstreamConfig,

    /// Inbound request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Path the forwarding handler is mounted on.
    pub route: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            route: "/api/ai_agent".to_string(),
        }
    }
}

/// What to do when no upstream endpoint is configured.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingEndpointPolicy {
    /// Fail every request with a configuration error.
    #[default]
    Require,
    /// Forward to `fallback_endpoint` instead.
    Fallback,
}

/// Which outbound-call strategy to use.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClientKind {
    /// Connection-level hyper client over a plain or TLS socket.
    #[default]
    Raw,
    /// Pooled reqwest client.
    Fetch,
}

/// Upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Full upstream URL, optionally carrying auth query parameters.
    pub endpoint: Option<String>,

    /// Environment variable that overrides `endpoint` when set.
    pub endpoint_env: String,

    /// Behavior when no endpoint is configured.
    pub missing_endpoint: MissingEndpointPolicy,

    /// Endpoint used under [`MissingEndpointPolicy::Fallback`].
    pub fallback_endpoint: String,

    /// Outbound-call strategy. Fixed at startup.
    pub client: ClientKind,

    /// Append a hint to 401/403 upstream errors.
    pub auth_hints: bool,

    /// Return the upstream 2xx code instead of normalizing to 200.
    pub pass_through_success_status: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            endpoint_env: "API_ENDPOINT".to_string(),
            missing_endpoint: MissingEndpointPolicy::Require,
            fallback_endpoint: DEFAULT_FALLBACK_ENDPOINT.to_string(),
            client: ClientKind::Raw,
            auth_hints: true,
            pass_through_success_status: false,
        }
    }
}

/// Inbound request limits.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum buffered inbound body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
