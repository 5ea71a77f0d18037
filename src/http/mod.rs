//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (x-request-id assigned, span opened)
//!     → relay handler (body buffered, Relay::handle)
//!     → JSON response
//! ```

pub mod request;
pub mod server;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{HttpServer, HEALTH_PATH};
