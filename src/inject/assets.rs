//! Injection payload loading.
//!
//! # Responsibilities
//! - Read the style and script assets once at startup
//! - Hold them immutable for the lifetime of the process
//!
//! # Design Decisions
//! - Missing assets are fatal at startup, never a per-request error
//! - The payload is shared read-only across requests; no per-request copy

use std::fs;
use std::path::Path;

use crate::config::AssetConfig;

/// Error type for asset loading.
#[derive(Debug)]
pub enum AssetError {
    /// Failed to read an asset file.
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetError::Io { path, source } => {
                write!(f, "Failed to read asset {}: {}", path, source)
            }
        }
    }
}

impl std::error::Error for AssetError {}

/// The client-side bundle spliced into proxied HTML documents.
///
/// Loaded once at startup; the content is opaque text to the proxy.
#[derive(Debug, Clone)]
pub struct InjectionPayload {
    /// CSS text inserted before the closing head tag.
    pub style: String,

    /// JS text inserted before the closing body tag.
    pub script: String,
}

impl InjectionPayload {
    /// Load the payload from the configured asset directory.
    pub fn load(config: &AssetConfig) -> Result<Self, AssetError> {
        let style = read_asset(&config.dir, &config.style_file)?;
        let script = read_asset(&config.dir, &config.script_file)?;
        Ok(Self { style, script })
    }
}

fn read_asset(dir: &str, file: &str) -> Result<String, AssetError> {
    let path = Path::new(dir).join(file);
    fs::read_to_string(&path).map_err(|source| AssetError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo_assets() -> AssetConfig {
        AssetConfig {
            dir: format!("{}/public", env!("CARGO_MANIFEST_DIR")),
            ..AssetConfig::default()
        }
    }

    #[test]
    fn test_loads_repo_assets() {
        let payload = InjectionPayload::load(&repo_assets()).unwrap();
        assert!(!payload.style.is_empty());
        assert!(!payload.script.is_empty());
    }

    #[test]
    fn test_missing_asset_is_an_error() {
        let config = AssetConfig {
            style_file: "does-not-exist.css".to_string(),
            ..repo_assets()
        };
        let err = InjectionPayload::load(&config).unwrap_err();
        assert!(err.to_string().contains("does-not-exist.css"));
    }
}
