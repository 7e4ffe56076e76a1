//! Server-side redirect resolution.
//!
//! # Responsibilities
//! - Follow same-origin redirects without involving the client
//! - Re-map each redirect target into the upstream namespace
//! - Bound the number of upstream calls per client request
//!
//! # Design Decisions
//! - Explicit loop, not recursion: the hop limit is a loop invariant
//! - The original method, headers and body are re-sent on every hop,
//!   uniformly across redirect status codes
//! - Redirects leaving the upstream origin are relayed to the client
//!   untouched

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method, Response};
use hyper::body::Incoming;

use crate::proxy::error::ProxyError;
use crate::proxy::forward::UpstreamClient;
use crate::proxy::path::map_path;

/// Outcome of redirect resolution.
pub enum Resolved {
    /// A non-redirect response, ready for the response pipeline.
    Terminal(Response<Incoming>),

    /// A redirect leaving the upstream origin; relayed verbatim.
    ExternalRedirect(Response<Incoming>),
}

/// Follow same-origin redirects until a terminal response arrives or the
/// hop budget runs out.
///
/// At most `budget` upstream calls are issued; exhausting the budget fails
/// with [`ProxyError::TooManyRedirects`] before another call is made.
pub async fn resolve(
    client: &UpstreamClient,
    method: &Method,
    headers: &HeaderMap,
    body: Option<&Bytes>,
    initial_path: String,
    budget: u32,
) -> Result<Resolved, ProxyError> {
    let origin = client.config().origin();
    let mut path = initial_path;
    let mut remaining = budget;

    loop {
        if remaining == 0 {
            return Err(ProxyError::TooManyRedirects);
        }

        let response = client.forward(method, &path, headers, body).await?;
        let status = response.status();

        if status.is_redirection() {
            if let Some(location) = response
                .headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok())
            {
                if let Some(target) = internal_target(location, &origin) {
                    let next = map_path(&target, &client.config().path_prefix);
                    remaining -= 1;
                    tracing::debug!(
                        status = %status,
                        from = %path,
                        to = %next,
                        remaining,
                        "Following redirect internally"
                    );
                    path = next;
                    continue;
                }

                tracing::debug!(status = %status, location = %location, "Relaying external redirect");
                return Ok(Resolved::ExternalRedirect(response));
            }
        }

        return Ok(Resolved::Terminal(response));
    }
}

/// Classify a redirect target.
///
/// Returns the origin-relative path when the target stays on the upstream
/// origin; `None` means the redirect leaves the origin and belongs to the
/// client.
fn internal_target(location: &str, origin: &str) -> Option<String> {
    if location.starts_with('/') {
        return Some(location.to_string());
    }
    if let Some(rest) = location.strip_prefix(origin) {
        // An exact-origin target redirects to the site root; anything that
        // continues the host name ("https://host.evil") is foreign
        if rest.is_empty() {
            return Some("/".to_string());
        }
        if rest.starts_with('/') {
            return Some(rest.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://barbarian.men";

    #[test]
    fn test_path_absolute_is_internal() {
        assert_eq!(
            internal_target("/login", ORIGIN),
            Some("/login".to_string())
        );
    }

    #[test]
    fn test_origin_absolute_is_stripped() {
        assert_eq!(
            internal_target("https://barbarian.men/macaw45/videos", ORIGIN),
            Some("/macaw45/videos".to_string())
        );
    }

    #[test]
    fn test_bare_origin_maps_to_root() {
        assert_eq!(
            internal_target("https://barbarian.men", ORIGIN),
            Some("/".to_string())
        );
    }

    #[test]
    fn test_other_host_is_external() {
        assert_eq!(internal_target("https://example.com/page", ORIGIN), None);
    }

    #[test]
    fn test_longer_host_sharing_the_prefix_is_external() {
        assert_eq!(
            internal_target("https://barbarian.mennonite.org/", ORIGIN),
            None
        );
    }

    #[test]
    fn test_relative_target_is_external() {
        // Not path-absolute and not origin-absolute; relayed to the client
        assert_eq!(internal_target("login", ORIGIN), None);
    }
}
