//! HTTP server setup and request handling.
//!
//! # Responsibilities
//! - Create the Axum router with the proxy handlers
//! - Wire up middleware (tracing, request ID)
//! - Serve the static asset directory at /public
//! - Map inbound paths and drive redirect resolution per request
//! - Serve with graceful shutdown

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderValue, Method, Request, Response, StatusCode},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::{LimitsConfig, ProxyConfig, RedirectConfig};
use crate::http::request::{RequestIdLayer, X_REQUEST_ID};
use crate::inject::InjectionPayload;
use crate::proxy::path::map_path;
use crate::proxy::resolve::resolve;
use crate::proxy::{pipeline, ProxyError, UpstreamClient};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
    pub payload: Arc<InjectionPayload>,
    pub redirects: RedirectConfig,
    pub limits: LimitsConfig,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and payload.
    pub fn new(config: ProxyConfig, payload: InjectionPayload) -> Self {
        let upstream = Arc::new(UpstreamClient::new(config.upstream.clone(), &config.timeouts));

        let state = AppState {
            upstream,
            payload: Arc::new(payload),
            redirects: config.redirects.clone(),
            limits: config.limits.clone(),
        };

        let router = Self::build_router(&config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(root_redirect))
            .nest_service("/public", ServeDir::new(&config.assets.dir))
            .fallback(proxy_handler)
            .with_state(state)
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Redirect the bare root to the canonical entry path.
async fn root_redirect(State(state): State<AppState>) -> Response<Body> {
    let entry = state.upstream.config().entry_path();
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::FOUND;
    if let Ok(location) = HeaderValue::from_str(&entry) {
        response.headers_mut().insert(header::LOCATION, location);
    }
    response
}

/// Main proxy handler.
/// Maps the path, resolves redirects upstream, and delivers the response.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response<Body> {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let (parts, body) = request.into_parts();
    let method = parts.method.clone();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| parts.uri.path())
        .to_string();

    let target = map_path(&path_and_query, &state.upstream.config().path_prefix);

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path_and_query,
        target = %target,
        "Proxying request"
    );

    let body_bytes = match buffer_body(&method, body, &state.limits).await {
        Ok(bytes) => bytes,
        Err(err) => return error_response(&err, &request_id),
    };

    let outcome = resolve(
        &state.upstream,
        &method,
        &parts.headers,
        body_bytes.as_ref(),
        target,
        state.redirects.max_hops,
    )
    .await;

    let delivered = match outcome {
        Ok(resolved) => pipeline::deliver(resolved, &state.payload, &state.limits).await,
        Err(err) => return error_response(&err, &request_id),
    };

    match delivered {
        Ok(response) => {
            tracing::debug!(
                request_id = %request_id,
                status = %response.status(),
                "Response delivered"
            );
            response
        }
        Err(err) => error_response(&err, &request_id),
    }
}

/// Buffer POST/PUT bodies so redirect hops can replay them.
async fn buffer_body(
    method: &Method,
    body: Body,
    limits: &LimitsConfig,
) -> Result<Option<Bytes>, ProxyError> {
    if *method != Method::POST && *method != Method::PUT {
        return Ok(None);
    }
    let bytes = axum::body::to_bytes(body, limits.max_request_body_bytes)
        .await
        .map_err(|_| ProxyError::RequestBodyTooLarge)?;
    Ok(Some(bytes))
}

/// Plain-text response for an unrecovered proxy error.
///
/// Responses are built whole before axum writes them, so an error here can
/// never follow already-sent headers.
fn error_response(err: &ProxyError, request_id: &str) -> Response<Body> {
    tracing::error!(request_id = %request_id, error = %err, "Request failed");
    let mut response = Response::new(Body::from(err.client_message()));
    *response.status_mut() = err.status();
    response
}
