//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! http + relay + upstream
//!     → logging.rs (tracing events, request-id spans from tower-http)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Prometheus scrape (optional)
//! ```

pub mod logging;
pub mod metrics;
