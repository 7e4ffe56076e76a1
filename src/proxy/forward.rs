//! Upstream request construction and execution.
//!
//! # Responsibilities
//! - Build the outbound request for one upstream call
//! - Apply the header override policy (host, referer, user-agent, encoding)
//! - Enforce the per-call response timeout
//!
//! # Design Decisions
//! - accept-encoding is forced to identity: a compressed body could not be
//!   rewritten before delivery
//! - The timeout covers time-to-response-headers; dropping the timed-out
//!   future tears down the in-flight connection
//! - Hop-by-hop headers never cross the proxy in either direction

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request, Response, Uri};
use hyper::body::Incoming;
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::proxy::error::ProxyError;

/// Connection-scoped headers that are never forwarded.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// True for headers that belong to a single connection, not the request.
pub(crate) fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP
        .iter()
        .any(|hop| name.as_str().eq_ignore_ascii_case(hop))
}

/// HTTP client for the fixed upstream site.
///
/// One instance is shared by all requests; the underlying hyper client
/// pools connections internally.
pub struct UpstreamClient {
    client: Client<HttpsConnector<HttpConnector>, Body>,
    config: UpstreamConfig,
    response_timeout: Duration,
}

impl UpstreamClient {
    /// Create a client for the configured upstream.
    pub fn new(config: UpstreamConfig, timeouts: &TimeoutConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpsConnector::new());
        Self {
            client,
            config,
            response_timeout: Duration::from_secs(timeouts.upstream_response_secs),
        }
    }

    /// Upstream configuration this client talks to.
    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// Perform one upstream call.
    ///
    /// Resolves once response headers arrive; the body stays lazily
    /// readable. POST and PUT replay `body`; other methods send none.
    pub async fn forward(
        &self,
        method: &Method,
        upstream_path: &str,
        inbound_headers: &HeaderMap,
        body: Option<&Bytes>,
    ) -> Result<Response<Incoming>, ProxyError> {
        let uri = self.upstream_uri(upstream_path)?;

        let body = match body {
            Some(bytes) if *method == Method::POST || *method == Method::PUT => {
                Body::from(bytes.clone())
            }
            _ => Body::empty(),
        };

        let mut request = Request::new(body);
        *request.method_mut() = method.clone();
        *request.uri_mut() = uri;
        *request.headers_mut() = self.build_upstream_headers(inbound_headers);

        match tokio::time::timeout(self.response_timeout, self.client.request(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => Err(ProxyError::UpstreamUnavailable(err)),
            // Dropping the request future releases the connection
            Err(_) => Err(ProxyError::GatewayTimeout),
        }
    }

    fn upstream_uri(&self, upstream_path: &str) -> Result<Uri, ProxyError> {
        let raw = format!(
            "{}://{}:{}{}",
            self.config.scheme, self.config.host, self.config.port, upstream_path
        );
        raw.parse::<Uri>()
            .map_err(|err| ProxyError::InvalidTarget(format!("{raw:?}: {err}")))
    }

    /// Copy inbound headers and apply the override policy.
    ///
    /// host and referer are always the proxy's own identity; user-agent
    /// keeps the client's value when present; accept-encoding is pinned to
    /// identity so bodies arrive uncompressed.
    fn build_upstream_headers(&self, inbound: &HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(inbound.len() + 4);

        for (name, value) in inbound {
            if is_hop_by_hop(name) {
                continue;
            }
            // The proxy supplies its own host and encoding; hyper frames
            // the body length itself
            if name == &header::HOST
                || name == &header::ACCEPT_ENCODING
                || name == &header::CONTENT_LENGTH
            {
                continue;
            }
            headers.append(name.clone(), value.clone());
        }

        // Config strings are checked by validation; an unparsable value
        // skips the override rather than panicking
        set_header(&mut headers, header::HOST, &self.config.host_header());
        set_header(&mut headers, header::REFERER, &self.config.referer);
        if !headers.contains_key(header::USER_AGENT) {
            set_header(
                &mut headers,
                header::USER_AGENT,
                &self.config.default_user_agent,
            );
        }
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("identity"));

        headers
    }
}

fn set_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}
