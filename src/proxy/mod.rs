//! Proxy engine subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → path.rs (apply the upstream prefix)
//!     → resolve.rs (follow same-origin redirects, bounded hops)
//!         → forward.rs (one upstream call per hop)
//!     → pipeline.rs (buffer-and-rewrite HTML, stream the rest)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - All per-request state lives on the task; nothing is shared for
//!   writing across requests
//! - The hop budget and buffering caps are configuration, not constants

pub mod error;
pub mod forward;
pub mod path;
pub mod pipeline;
pub mod resolve;

pub use error::ProxyError;
pub use forward::UpstreamClient;
pub use resolve::Resolved;
