//! Terminal response delivery.
//!
//! # Responsibilities
//! - Copy upstream status and headers to the client response
//! - Buffer and rewrite HTML bodies; stream everything else
//! - Fall back to the unmodified body when rewriting is impossible
//!
//! # Design Decisions
//! - content-length is dropped for rewritten HTML; the splice changes the
//!   body length and a stale value would corrupt response framing
//! - Non-HTML bodies are never buffered or decoded; streaming preserves
//!   byte-exact content and propagates backpressure to the upstream read
//! - HTML declaring a content-length beyond the rewrite cap is streamed
//!   through unmodified rather than buffered

use axum::body::Body;
use axum::http::{header, HeaderMap, Response};
use hyper::body::Incoming;

use crate::config::LimitsConfig;
use crate::inject::{inject, InjectionPayload};
use crate::proxy::error::ProxyError;
use crate::proxy::forward::is_hop_by_hop;
use crate::proxy::resolve::Resolved;

/// Turn the resolved upstream response into the client response.
pub async fn deliver(
    resolved: Resolved,
    payload: &InjectionPayload,
    limits: &LimitsConfig,
) -> Result<Response<Body>, ProxyError> {
    let upstream = match resolved {
        Resolved::ExternalRedirect(upstream) => return Ok(relay(upstream)),
        Resolved::Terminal(upstream) => upstream,
    };

    if !is_html(upstream.headers()) {
        return Ok(relay(upstream));
    }

    if let Some(declared) = declared_length(upstream.headers()) {
        if declared > limits.max_rewrite_bytes {
            tracing::warn!(
                declared,
                cap = limits.max_rewrite_bytes,
                "HTML document exceeds rewrite cap, streaming unmodified"
            );
            return Ok(relay(upstream));
        }
    }

    rewrite_html(upstream, payload, limits).await
}

/// Relay status, headers and body without touching the bytes.
fn relay(upstream: Response<Incoming>) -> Response<Body> {
    let (parts, body) = upstream.into_parts();
    let mut response = Response::new(Body::new(body));
    *response.status_mut() = parts.status;
    copy_response_headers(&parts.headers, response.headers_mut(), true);
    response
}

/// Buffer the HTML body, splice the payload in, and respond with the
/// rewritten document.
async fn rewrite_html(
    upstream: Response<Incoming>,
    payload: &InjectionPayload,
    limits: &LimitsConfig,
) -> Result<Response<Body>, ProxyError> {
    let (parts, body) = upstream.into_parts();
    let bytes = axum::body::to_bytes(Body::new(body), limits.max_rewrite_bytes).await?;

    let body = match String::from_utf8(bytes.to_vec()) {
        Ok(text) => Body::from(inject(&text, payload)),
        Err(err) => {
            // Rewrite failure: the client still gets the usable page
            tracing::warn!(error = %err, "HTML decode failed, serving unmodified body");
            Body::from(bytes)
        }
    };

    let mut response = Response::new(body);
    *response.status_mut() = parts.status;
    copy_response_headers(&parts.headers, response.headers_mut(), false);
    Ok(response)
}

/// True when the content-type prefix-matches text/html.
fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start().to_ascii_lowercase().starts_with("text/html"))
        .unwrap_or(false)
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

/// Copy upstream headers to the client response.
///
/// Hop-by-hop headers stay behind in both modes; content-length only
/// survives when the body passes through unmodified.
fn copy_response_headers(src: &HeaderMap, dst: &mut HeaderMap, keep_content_length: bool) {
    for (name, value) in src {
        if is_hop_by_hop(name) {
            continue;
        }
        if !keep_content_length && name == &header::CONTENT_LENGTH {
            continue;
        }
        dst.append(name.clone(), value.clone());
    }
}
