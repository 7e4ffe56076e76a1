//! HTTP front door subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → request.rs (stamp x-request-id)
//!     → server.rs (Axum router: root redirect, /public assets,
//!       everything else into the proxy engine)
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
