//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The fixed upstream site being proxied.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Redirect-following limits.
    pub redirects: RedirectConfig,

    /// Injection asset locations.
    pub assets: AssetConfig,

    /// Buffering caps.
    pub limits: LimitsConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl ListenerConfig {
    /// Replace the port component of the bind address, keeping the host.
    pub fn set_port(&mut self, port: u16) {
        let host = self
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or(&self.bind_address)
            .to_string();
        self.bind_address = format!("{host}:{port}");
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Upstream site configuration.
///
/// Every proxied request is sent to this single origin; the path prefix is
/// the namespace the whole site lives under.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// URI scheme ("https" or "http").
    pub scheme: String,

    /// Upstream host name.
    pub host: String,

    /// Upstream port.
    pub port: u16,

    /// Path prefix every upstream request lives under.
    pub path_prefix: String,

    /// Referer sent with every upstream request.
    pub referer: String,

    /// User-agent used when the client supplied none.
    pub default_user_agent: String,
}

impl UpstreamConfig {
    /// Origin string ("scheme://host[:port]"), default ports elided.
    ///
    /// Redirect targets starting with this string are resolved internally.
    pub fn origin(&self) -> String {
        if self.is_default_port() {
            format!("{}://{}", self.scheme, self.host)
        } else {
            format!("{}://{}:{}", self.scheme, self.host, self.port)
        }
    }

    /// Host header value, default ports elided.
    pub fn host_header(&self) -> String {
        if self.is_default_port() {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Canonical entry path the root redirect points at.
    pub fn entry_path(&self) -> String {
        format!("{}/", self.path_prefix)
    }

    fn is_default_port(&self) -> bool {
        matches!(
            (self.scheme.as_str(), self.port),
            ("https", 443) | ("http", 80)
        )
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            host: "barbarian.men".to_string(),
            port: 443,
            path_prefix: "/macaw45".to_string(),
            referer: "https://barbarian.men/macaw45".to_string(),
            default_user_agent: "Mozilla/5.0 (compatible; barbarian-proxy)".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Window for upstream response headers, per call, in seconds.
    ///
    /// Each redirect hop gets a fresh window.
    pub upstream_response_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            upstream_response_secs: 30,
        }
    }
}

/// Redirect-following configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// Maximum upstream calls spent resolving redirects per client request.
    pub max_hops: u32,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self { max_hops: 5 }
    }
}

/// Injection asset configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding the assets; also served at /public.
    pub dir: String,

    /// Style sheet file name, injected into HTML heads.
    pub style_file: String,

    /// Script file name, injected into HTML bodies.
    pub script_file: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            dir: "public".to_string(),
            style_file: "custom.css".to_string(),
            script_file: "custom.js".to_string(),
        }
    }
}

/// Buffering caps.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest HTML document buffered for rewriting, in bytes.
    ///
    /// Documents declaring a larger content-length are streamed through
    /// unmodified instead of being rewritten.
    pub max_rewrite_bytes: usize,

    /// Largest request body buffered for upstream replay, in bytes.
    pub max_request_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_rewrite_bytes: 8 * 1024 * 1024,
            max_request_body_bytes: 2 * 1024 * 1024,
        }
    }
}
