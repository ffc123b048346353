//! Global context for berth operations.
//!
//! Resolves where backends live, which galleries are consulted and whether
//! the capability probe is overridden. Values come from, highest first:
//! command-line flags, environment variables, the config file, built-in
//! defaults.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{bail, Result};
use directories::{BaseDirs, ProjectDirs};

use crate::core::catalog::Gallery;
use crate::sources::probe::SystemProbe;
use crate::util::config::{load_config, Config};

/// Environment variable overriding the backends directory.
pub const BACKENDS_PATH_ENV: &str = "BERTH_BACKENDS_PATH";

/// Environment variable overriding the detected capability.
pub const CAPABILITY_ENV: &str = "BERTH_CAPABILITY";

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV: &str = "BERTH_CONFIG";

/// Project directories for berth
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("com", "berth", "berth"));

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Directory holding `config.toml`
    config_dir: PathBuf,

    /// Directory backends are installed into
    backends_path: PathBuf,

    /// Capability override, if any
    capability: Option<String>,

    /// Galleries in merge order
    galleries: Vec<Gallery>,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Self {
        let (config_dir, data_dir) = match PROJECT_DIRS.as_ref() {
            Some(dirs) => (
                dirs.config_dir().to_path_buf(),
                dirs.data_dir().to_path_buf(),
            ),
            None => {
                // Fallback to ~/.berth
                let home = BaseDirs::new()
                    .map(|b| b.home_dir().join(".berth"))
                    .unwrap_or_else(|| PathBuf::from(".berth"));
                (home.clone(), home)
            }
        };

        GlobalContext {
            config_dir,
            backends_path: data_dir.join("backends"),
            capability: None,
            galleries: Vec::new(),
        }
    }

    /// Create a GlobalContext from the config file, either `explicit` or
    /// the global one.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut ctx = Self::new();
        let global = ctx.config_path();
        let config = load_config(explicit, Some(&global))?;
        ctx.apply_config(config);
        Ok(ctx)
    }

    /// Apply the values set in `config`.
    pub fn apply_config(&mut self, config: Config) {
        if let Some(path) = config.backends_path {
            self.backends_path = path;
        }
        if config.capability.is_some() {
            self.capability = config.capability;
        }
        if !config.galleries.is_empty() {
            self.galleries = config.galleries;
        }
    }

    /// Override the backends directory.
    pub fn with_backends_path(mut self, path: PathBuf) -> Self {
        self.backends_path = path;
        self
    }

    /// Override the capability. Empty values are ignored.
    pub fn with_capability(mut self, capability: Option<String>) -> Self {
        if let Some(capability) = capability.filter(|c| !c.is_empty()) {
            self.capability = Some(capability);
        }
        self
    }

    /// Replace the configured galleries.
    pub fn with_galleries(mut self, galleries: Vec<Gallery>) -> Self {
        self.galleries = galleries;
        self
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Get the directory backends are installed into.
    pub fn backends_path(&self) -> &Path {
        &self.backends_path
    }

    /// Get the capability override, if any.
    pub fn capability(&self) -> Option<&str> {
        self.capability.as_deref()
    }

    /// Get the configured galleries in merge order.
    pub fn galleries(&self) -> &[Gallery] {
        &self.galleries
    }

    /// Galleries to load, failing if none are configured.
    pub fn require_galleries(&self) -> Result<&[Gallery]> {
        if self.galleries.is_empty() {
            bail!(
                "no galleries configured\n\
                 help: pass --gallery NAME=URL or add [[galleries]] to {}",
                self.config_path().display()
            );
        }
        Ok(&self.galleries)
    }

    /// The host capability probe, honouring the override.
    pub fn probe(&self) -> SystemProbe {
        SystemProbe::new().with_override(self.capability.clone())
    }
}

impl Default for GlobalContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a `--gallery` value: `NAME=URL`, or a bare URL named after its position.
pub fn parse_gallery_arg(value: &str, index: usize) -> Gallery {
    match value.split_once('=') {
        Some((name, url)) if !name.is_empty() && !name.contains(['/', ':', '\\']) => {
            Gallery::new(name, url)
        }
        _ => Gallery::new(format!("gallery{}", index + 1), value),
    }
}
