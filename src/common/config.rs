//! # Configuration Utilities
//!
//! TOML configuration shared by the CLI and the HTTP server. Every section has
//! defaults, so an empty file (or no file at all) yields a working setup.
//!
//! ```toml
//! [limits]
//! min_input_bytes = 1024
//! max_input_bytes = 52428800
//!
//! [security]
//! enforce_password_policy = true
//!
//! [server]
//! address = "127.0.0.1:3000"
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;

/// Largest accepted input image file (50 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: usize = 50 * 1024 * 1024;
/// Smallest accepted input image file. Anything shorter is treated as corrupt.
pub const DEFAULT_MIN_INPUT_BYTES: usize = 1024;

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Arguments
/// - `path`: Path to the TOML configuration file
///
/// # Returns
/// - `Ok(T)`: Successfully loaded and parsed configuration
/// - `Err`: File I/O or parsing error
///
/// # Example
/// ```ignore
/// let config: StegConfig = load_config("config/stegvault.toml")?;
/// ```
pub fn load_config<T>(path: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Top-level configuration for the stegvault binaries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StegConfig {
    pub limits: LimitsConfig,
    pub security: SecurityConfig,
    pub server: ServerConfig,
}

impl StegConfig {
    /// Load from `path` if given, otherwise fall back to defaults.
    pub fn from_optional_file(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => load_config(path),
            None => Ok(Self::default()),
        }
    }
}

/// Input size limits enforced before an image is decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Minimum size of an input image file in bytes
    pub min_input_bytes: usize,
    /// Maximum size of an input image file in bytes
    pub max_input_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_input_bytes: DEFAULT_MIN_INPUT_BYTES,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Reject weak passwords when encoding
    pub enforce_password_policy: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enforce_password_policy: true,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address (e.g., "127.0.0.1:3000")
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}
