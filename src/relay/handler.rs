//! The forwarding handler.

use axum::http::{Method, StatusCode};
use serde_json::Value;
use std::time::Instant;

use crate::observability::metrics;
use crate::relay::target::{Sanitized, UpstreamTarget};
use crate::relay::{RelayError, RelaySettings, Relayed};
use crate::upstream::UpstreamClient;

/// Forwards one POST body to the upstream and maps the outcome.
///
/// Generic over the outbound strategy so the same decision sequence runs
/// whether the call goes through [`crate::upstream::RawClient`],
/// [`crate::upstream::FetchClient`] or a test double.
#[derive(Debug, Clone)]
pub struct Relay<C> {
    client: C,
}

impl<C: UpstreamClient> Relay<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Handle one inbound request. Never fails: errors become envelopes.
    pub async fn handle(&self, settings: &RelaySettings, method: &Method, body: &[u8]) -> Relayed {
        let start = Instant::now();
        match self.forward(settings, method, body).await {
            Ok(relayed) => {
                metrics::record_request("success", relayed.status.as_u16(), start);
                relayed
            }
            Err(err) => {
                match &err {
                    RelayError::MethodNotAllowed => {
                        tracing::warn!(method = %method, "Rejected non-POST request");
                    }
                    RelayError::Upstream { status, .. } => {
                        tracing::warn!(status = status.as_u16(), error = %err, "Upstream returned an error");
                    }
                    _ => tracing::error!(kind = err.kind(), error = %err, "Relay failed"),
                }
                metrics::record_request(err.kind(), err.status().as_u16(), start);
                err.into()
            }
        }
    }

    async fn forward(
        &self,
        settings: &RelaySettings,
        method: &Method,
        body: &[u8],
    ) -> Result<Relayed, RelayError> {
        if method != Method::POST {
            return Err(RelayError::MethodNotAllowed);
        }

        let target = UpstreamTarget::resolve(settings)
            .map_err(|e| RelayError::failure(format!("Invalid API endpoint URL: {e}")))?;
        let Some(url) = target.url() else {
            tracing::error!("Upstream endpoint is not set");
            return Err(RelayError::NotConfigured);
        };
        if matches!(target, UpstreamTarget::Fallback(_)) {
            tracing::debug!("No endpoint configured, using fallback");
        }

        tracing::info!(upstream = %Sanitized(url), "Calling upstream");

        let payload = encode_body(body)?;
        let response = self
            .client
            .post_json(url, payload)
            .await
            .map_err(|e| RelayError::failure(e.to_string()))?;

        if !response.is_success() {
            tracing::debug!(status = response.status, body = %response.body, "Upstream error body");
            return Err(RelayError::upstream(
                response.status,
                &response.status_text,
                settings.auth_hints,
            ));
        }

        let data: Value = serde_json::from_str(&response.body).map_err(|e| {
            tracing::debug!(error = %e, "Error parsing upstream JSON");
            RelayError::InvalidJson
        })?;

        let status = if settings.pass_through_success_status {
            StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK)
        } else {
            StatusCode::OK
        };

        Ok(Relayed { status, body: data })
    }
}

/// Decode the inbound body as JSON and re-encode it compactly.
///
/// An empty (or all-whitespace) body is forwarded as `null`.
pub fn encode_body(body: &[u8]) -> Result<String, RelayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok("null".to_string());
    }
    let value: Value =
        serde_json::from_slice(body).map_err(|e| RelayError::failure(e.to_string()))?;
    serde_json::to_string(&value).map_err(|e| RelayError::failure(e.to_string()))
}
