//! JSON forwarding relay.
//!
//! Accepts `POST` requests on one route, forwards the JSON body to a
//! configured upstream, and relays the upstream's status and JSON back,
//! mapping every failure to a `{ "error": "..." }` envelope.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod upstream;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::{Relay, RelayError, RelaySettings, Relayed};
pub use upstream::{AnyClient, UpstreamClient};
