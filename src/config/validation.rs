//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and required shapes
//! - Check that override strings are usable as header values
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// Human-readable description of the problem.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address",
            message: format!("not a socket address: {}", config.listener.bind_address),
        });
    }

    match config.upstream.scheme.as_str() {
        "http" | "https" => {}
        other => errors.push(ValidationError {
            field: "upstream.scheme",
            message: format!("must be \"http\" or \"https\", got {other:?}"),
        }),
    }

    if config.upstream.host.is_empty() {
        errors.push(ValidationError {
            field: "upstream.host",
            message: "must not be empty".to_string(),
        });
    }

    if !config.upstream.path_prefix.starts_with('/') {
        errors.push(ValidationError {
            field: "upstream.path_prefix",
            message: format!("must start with '/', got {:?}", config.upstream.path_prefix),
        });
    }
    if config.upstream.path_prefix.ends_with('/') {
        errors.push(ValidationError {
            field: "upstream.path_prefix",
            message: "must not end with '/'".to_string(),
        });
    }

    for (field, value) in [
        ("upstream.referer", &config.upstream.referer),
        ("upstream.default_user_agent", &config.upstream.default_user_agent),
    ] {
        if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError {
                field,
                message: "not a valid header value".to_string(),
            });
        }
    }

    if config.redirects.max_hops == 0 {
        errors.push(ValidationError {
            field: "redirects.max_hops",
            message: "must be at least 1".to_string(),
        });
    }

    if config.timeouts.upstream_response_secs == 0 {
        errors.push(ValidationError {
            field: "timeouts.upstream_response_secs",
            message: "must be at least 1".to_string(),
        });
    }

    if config.limits.max_rewrite_bytes == 0 {
        errors.push(ValidationError {
            field: "limits.max_rewrite_bytes",
            message: "must be non-zero".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
