//! Upstream path mapping.
//!
//! # Responsibilities
//! - Prepend the fixed upstream prefix to inbound paths
//! - Leave already-prefixed paths untouched
//!
//! # Design Decisions
//! - Pure and total; mapping is idempotent under re-application, which
//!   matters because redirect targets may or may not already carry the
//!   prefix
//! - Operates on path-and-query so query strings survive the mapping

/// Map an inbound path to its upstream counterpart.
pub fn map_path(path: &str, prefix: &str) -> String {
    if path.starts_with(prefix) {
        path.to_string()
    } else {
        format!("{prefix}{path}")
    }
}
