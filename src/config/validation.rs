//! Configuration validation.
//!
//! Serde handles syntax; this module checks values that parse but cannot
//! work (unparseable addresses, non-http upstreams, zero limits). All errors
//! are collected rather than stopping at the first.

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;
use crate::http::server::HEALTH_PATH;
use crate::relay::Sanitized;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("listener.route '{0}' must start with '/' and must not be /healthz")]
    Route(String),

    #[error("{field} '{value}' is not a valid http(s) URL")]
    Endpoint { field: &'static str, value: String },

    #[error("limits.max_body_bytes must be greater than zero")]
    BodyLimit,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if !config.listener.route.starts_with('/') || config.listener.route == HEALTH_PATH {
        errors.push(ValidationError::Route(config.listener.route.clone()));
    }

    if let Some(endpoint) = config.upstream.endpoint.as_deref() {
        if !is_http_url(endpoint) {
            errors.push(ValidationError::Endpoint {
                field: "upstream.endpoint",
                value: redacted(endpoint),
            });
        }
    }

    if !is_http_url(&config.upstream.fallback_endpoint) {
        errors.push(ValidationError::Endpoint {
            field: "upstream.fallback_endpoint",
            value: config.upstream.fallback_endpoint.clone(),
        });
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::BodyLimit);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Endpoint as it may appear in error output, query values hidden.
fn redacted(value: &str) -> String {
    match Url::parse(value) {
        Ok(url) => Sanitized(&url).to_string(),
        Err(_) => value.to_string(),
    }
}

fn is_http_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false)
}
