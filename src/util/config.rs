//! Configuration file support for berth.
//!
//! The global config lives in the platform config directory as
//! `config.toml`. An explicit `--config` path replaces it.
//!
//! ```toml
//! backends_path = "/var/lib/berth/backends"
//! capability = "nvidia"
//!
//! [[galleries]]
//! name = "official"
//! url = "https://example.org/backends.json"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::catalog::Gallery;

/// berth configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory backends are installed into
    pub backends_path: Option<PathBuf>,

    /// Capability override, skips host detection
    pub capability: Option<String>,

    /// Galleries in merge order
    pub galleries: Vec<Gallery>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }
}

/// Load the config for a run.
///
/// An explicit path must exist and parse; the global path falls back to
/// defaults with a warning.
pub fn load_config(explicit: Option<&Path>, global_path: Option<&Path>) -> Result<Config> {
    match (explicit, global_path) {
        (Some(path), _) => Config::load(path),
        (None, Some(path)) => Ok(Config::load_or_default(path)),
        (None, None) => Ok(Config::default()),
    }
}
