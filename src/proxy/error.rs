//! Proxy error taxonomy.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that terminate a single proxied request.
///
/// Every variant is terminal for its own request only; none of them affect
/// other in-flight requests or process-wide state.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Transport-level failure connecting to or communicating with upstream.
    #[error("upstream request failed: {0}")]
    UpstreamUnavailable(#[from] hyper_util::client::legacy::Error),

    /// The upstream body stream failed or exceeded the rewrite cap.
    #[error("upstream body read failed: {0}")]
    UpstreamBody(#[from] axum::Error),

    /// A mapped path or redirect target was not a valid upstream URI.
    #[error("invalid upstream target: {0}")]
    InvalidTarget(String),

    /// No upstream response headers within the timeout window.
    #[error("upstream response timed out")]
    GatewayTimeout,

    /// Redirect budget exhausted before reaching a terminal response.
    #[error("too many redirects")]
    TooManyRedirects,

    /// Buffered request body exceeded the configured cap.
    #[error("request body too large")]
    RequestBodyTooLarge,
}

impl ProxyError {
    /// Client-facing status code.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::UpstreamUnavailable(_)
            | ProxyError::UpstreamBody(_)
            | ProxyError::InvalidTarget(_) => StatusCode::BAD_GATEWAY,
            ProxyError::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::TooManyRedirects => StatusCode::LOOP_DETECTED,
            ProxyError::RequestBodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Short plain-text body for the error response.
    pub fn client_message(&self) -> &'static str {
        match self {
            ProxyError::UpstreamUnavailable(_)
            | ProxyError::UpstreamBody(_)
            | ProxyError::InvalidTarget(_) => "Upstream request failed",
            ProxyError::GatewayTimeout => "Gateway timeout",
            ProxyError::TooManyRedirects => "Too many redirects",
            ProxyError::RequestBodyTooLarge => "Request body too large",
        }
    }
}
