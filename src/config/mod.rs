//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse, overlay API_ENDPOINT from the environment)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → RelaySettings snapshot shared via ArcSwap with the handler
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → server swaps the settings snapshot
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults so an empty file is a valid config
//! - The environment is read by the loader only, never by the handler

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::{
    ClientKind, LimitsConfig, ListenerConfig, MissingEndpointPolicy, ObservabilityConfig,
    RelayConfig, UpstreamConfig, DEFAULT_FALLBACK_ENDPOINT,
};
