//! Outbound-call subsystem.
//!
//! # Data Flow
//! ```text
//! relay handler
//!     → UpstreamClient::post_json(url, json)
//!         ├─ raw.rs   (TcpStream [+ TLS] → hyper http1 connection)
//!         └─ fetch.rs (pooled reqwest client)
//!     → UpstreamResponse { status, status_text, body }
//! ```
//!
//! # Design Decisions
//! - One buffered POST per call; the body is fully read before returning
//! - No retries and no timeouts beyond the transport defaults
//! - The strategy is picked once at startup via [`AnyClient`]

pub mod fetch;
pub mod raw;
pub mod tls;

use std::future::Future;
use thiserror::Error;
use url::Url;

use crate::config::ClientKind;

pub use fetch::FetchClient;
pub use raw::RawClient;

/// A fully buffered upstream response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl UpstreamResponse {
    /// Whether the status is in the inclusive range [200, 299].
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// Errors that prevent a response from being received at all.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,

    #[error("connect {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TLS server name '{0}'")]
    ServerName(String),

    #[error("TLS handshake failed: {0}")]
    Tls(#[source] std::io::Error),

    #[error("TLS setup failed: {0}")]
    TlsConfig(#[from] rustls::Error),

    #[error("failed to build request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("{0}")]
    Fetch(reqwest::Error),
}

/// The outbound-call interface: one buffered JSON POST.
pub trait UpstreamClient: Clone + Send + Sync + 'static {
    /// POST `body` (already JSON-encoded) to `url`.
    fn post_json(
        &self,
        url: &Url,
        body: String,
    ) -> impl Future<Output = Result<UpstreamResponse, TransportError>> + Send;
}

/// Client strategy chosen from configuration.
#[derive(Debug, Clone)]
pub enum AnyClient {
    Raw(RawClient),
    Fetch(FetchClient),
}

impl AnyClient {
    /// Build the client named by `kind`.
    pub fn from_kind(kind: ClientKind) -> Result<Self, TransportError> {
        Ok(match kind {
            ClientKind::Raw => AnyClient::Raw(RawClient::new()?),
            ClientKind::Fetch => AnyClient::Fetch(FetchClient::new()?),
        })
    }

    pub fn kind(&self) -> ClientKind {
        match self {
            AnyClient::Raw(_) => ClientKind::Raw,
            AnyClient::Fetch(_) => ClientKind::Fetch,
        }
    }
}

impl UpstreamClient for AnyClient {
    async fn post_json(&self, url: &Url, body: String) -> Result<UpstreamResponse, TransportError> {
        match self {
            AnyClient::Raw(client) => client.post_json(url, body).await,
            AnyClient::Fetch(client) => client.post_json(url, body).await,
        }
    }
}

/// Reason phrase for a status code, or an empty string for unknown codes.
pub(crate) fn canonical_reason(status: u16) -> String {
    hyper::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range_is_inclusive() {
        let resp = |status| UpstreamResponse {
            status,
            status_text: String::new(),
            body: String::new(),
        };
        assert!(!resp(199).is_success());
        assert!(resp(200).is_success());
        assert!(resp(299).is_success());
        assert!(!resp(300).is_success());
    }

    #[test]
    fn test_canonical_reason() {
        assert_eq!(canonical_reason(404), "Not Found");
        assert_eq!(canonical_reason(599), "");
    }

    #[test]
    fn test_from_kind() {
        assert_eq!(AnyClient::from_kind(ClientKind::Raw).unwrap().kind(), ClientKind::Raw);
        assert_eq!(AnyClient::from_kind(ClientKind::Fetch).unwrap().kind(), ClientKind::Fetch);
    }
}
