//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a user config file overrides just the keys it names.
//!
//! ## Config File Location
//!
//! By default `config.toml` is read from the site root (the directory holding
//! `src/`). `--config <path>` points at another file. A missing file means
//! "all defaults".
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! gallery_path = "src/gallery/gallery.yaml"  # Manifest, relative to the site root
//! image_dir = "src"                          # Directory scanned for image assets
//!
//! [server]
//! bind = "127.0.0.1:4321"        # Listen address for `serve`
//! asset_url_prefix = "/assets"   # URL prefix image files are served under
//!
//! [pagination]
//! default_limit = 30             # Page size when a request omits `limit`
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

use crate::store::DEFAULT_GALLERY_PATH;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Gallery manifest path, relative to the site root.
    pub gallery_path: String,
    /// Directory (relative to the site root) scanned for image assets.
    pub image_dir: String,
    /// HTTP server settings.
    pub server: ServerConfig,
    /// API pagination settings.
    pub pagination: PaginationConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            gallery_path: DEFAULT_GALLERY_PATH.to_string(),
            image_dir: "src".to_string(),
            server: ServerConfig::default(),
            pagination: PaginationConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gallery_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "gallery_path must not be empty".into(),
            ));
        }
        if self.image_dir.trim().is_empty() {
            return Err(ConfigError::Validation("image_dir must not be empty".into()));
        }
        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "server.bind is not a socket address: {}",
                self.server.bind
            )));
        }
        let prefix = &self.server.asset_url_prefix;
        if !prefix.starts_with('/') || prefix.trim_end_matches('/').is_empty() {
            return Err(ConfigError::Validation(
                "server.asset_url_prefix must start with '/' and name a path".into(),
            ));
        }
        if self.pagination.default_limit == 0 {
            return Err(ConfigError::Validation(
                "pagination.default_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Parsed `server.bind`. Only valid after [`validate`](Self::validate).
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.bind.parse().map_err(|_| {
            ConfigError::Validation(format!(
                "server.bind is not a socket address: {}",
                self.server.bind
            ))
        })
    }

    /// Asset URL prefix without a trailing slash.
    pub fn asset_url_prefix(&self) -> &str {
        self.server.asset_url_prefix.trim_end_matches('/')
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen address, `host:port`.
    pub bind: String,
    /// URL prefix under which files in `image_dir` are served.
    pub asset_url_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:4321".to_string(),
            asset_url_prefix: "/assets".to_string(),
        }
    }
}

/// API pagination settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationConfig {
    /// Page size used when a request has no usable `limit`.
    pub default_limit: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { default_limit: 30 }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(config_path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config_path`, falling back to defaults when absent.
pub fn load_config(config_path: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(load_raw_config(config_path)?)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# photo-grid Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Gallery manifest (YAML), relative to the site root.
gallery_path = "src/gallery/gallery.yaml"

# Directory scanned for image assets (jpg, jpeg, png, gif, webp), relative to
# the site root. Manifest entries are matched against files found here.
image_dir = "src"

# ---------------------------------------------------------------------------
# HTTP server
# ---------------------------------------------------------------------------
[server]
# Listen address for `photo-grid serve`.
bind = "127.0.0.1:4321"

# URL prefix under which image files are served; image `src` values in API
# responses start with it.
asset_url_prefix = "/assets"

# ---------------------------------------------------------------------------
# Pagination
# ---------------------------------------------------------------------------
[pagination]
# Page size when a request omits `limit` or passes an unusable value.
default_limit = 30
"##
}
