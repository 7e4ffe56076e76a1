//! Transparent forwarding proxy for a single upstream site.
//!
//! Sits in front of `https://barbarian.men`, rewrites the outbound path
//! namespace under the fixed `/macaw45` prefix, resolves same-origin
//! redirects server-side with a bounded hop count, and injects a
//! client-side style/script bundle into HTML responses on the way through.

pub mod config;
pub mod http;
pub mod inject;
pub mod lifecycle;
pub mod proxy;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use inject::InjectionPayload;
pub use lifecycle::Shutdown;
