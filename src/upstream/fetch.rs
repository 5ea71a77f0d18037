//! Fetch-style upstream client backed by reqwest.

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use url::Url;

use crate::upstream::{canonical_reason, TransportError, UpstreamClient, UpstreamResponse};

/// Pooled client shared by all requests.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
}

impl FetchClient {
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("agent-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(TransportError::Fetch)?;
        Ok(Self { client })
    }
}

impl UpstreamClient for FetchClient {
    async fn post_json(&self, url: &Url, body: String) -> Result<UpstreamResponse, TransportError> {
        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(redact)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(redact)?;

        Ok(UpstreamResponse {
            status,
            status_text: canonical_reason(status),
            body: text,
        })
    }
}

/// reqwest renders the request URL into its errors; the query may hold the
/// upstream's auth code.
fn redact(err: reqwest::Error) -> TransportError {
    TransportError::Fetch(err.without_url())
}
