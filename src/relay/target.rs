//! Upstream target resolution and log-safe rendering.

use std::fmt;
use url::Url;

use crate::config::MissingEndpointPolicy;
use crate::relay::RelaySettings;

/// Where a request will be forwarded, as resolved from the settings snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamTarget {
    /// An endpoint was configured explicitly.
    Configured(Url),
    /// Nothing configured; the fallback policy supplied this one.
    Fallback(Url),
    /// Nothing configured and no fallback allowed.
    NotConfigured,
}

impl UpstreamTarget {
    pub fn resolve(settings: &RelaySettings) -> Result<Self, url::ParseError> {
        match settings.endpoint.as_deref() {
            Some(endpoint) => Url::parse(endpoint).map(UpstreamTarget::Configured),
            None => match settings.missing_endpoint {
                MissingEndpointPolicy::Require => Ok(UpstreamTarget::NotConfigured),
                MissingEndpointPolicy::Fallback => {
                    Url::parse(&settings.fallback_endpoint).map(UpstreamTarget::Fallback)
                }
            },
        }
    }

    pub fn url(&self) -> Option<&Url> {
        match self {
            UpstreamTarget::Configured(url) | UpstreamTarget::Fallback(url) => Some(url),
            UpstreamTarget::NotConfigured => None,
        }
    }
}

/// Displays a URL without credentials or query values.
///
/// Query strings often carry the upstream's auth code, so only `?...` is shown.
pub struct Sanitized<'a>(pub &'a Url);

impl fmt::Display for Sanitized<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let url = self.0;
        write!(f, "{}://{}", url.scheme(), url.host_str().unwrap_or_default())?;
        if let Some(port) = url.port() {
            write!(f, ":{port}")?;
        }
        f.write_str(url.path())?;
        if url.query().is_some() {
            f.write_str("?...")?;
        }
        Ok(())
    }
}
