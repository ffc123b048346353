//! Installed backend discovery.
//!
//! Disk is the source of truth: every call rescans the base path. Each
//! immediate subdirectory is an installed backend named after the directory.
//!
//! Directories are visited in lexicographic order. When building the
//! name -> entrypoint listing, directory names always win over aliases, and
//! when several backends declare the same alias the first directory owns it.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::errors::{BackendError, BackendResult};
use crate::core::metadata::{read_metadata, InstalledMetadata, ENTRYPOINT_FILE};

/// A backend directory found under the base path.
#[derive(Debug, Clone, PartialEq)]
pub struct InstalledBackend {
    /// Directory name
    pub name: String,

    /// Directory path
    pub path: PathBuf,

    /// Metadata sidecar, `None` for legacy installs
    pub metadata: Option<InstalledMetadata>,
}

impl InstalledBackend {
    /// Path of the entrypoint script, whether or not it exists.
    pub fn entrypoint(&self) -> PathBuf {
        self.path.join(ENTRYPOINT_FILE)
    }

    pub fn alias(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.alias())
    }

    pub fn redirect_target(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.redirect_target())
    }
}

/// Scan the base path for installed backends, sorted by name.
///
/// A missing base path means nothing is installed.
pub fn installed_backends(base_path: &Path) -> BackendResult<Vec<InstalledBackend>> {
    backend_dirs(base_path)?
        .into_iter()
        .map(|(name, path)| {
            let metadata = read_metadata(&path)?;
            Ok(InstalledBackend {
                name,
                path,
                metadata,
            })
        })
        .collect()
}

/// The first installed backend (in name order) declaring `alias`.
///
/// Sidecars are read one directory at a time and the scan stops at the first
/// match, so metadata of later directories is never parsed.
pub fn find_by_alias(base_path: &Path, alias: &str) -> BackendResult<Option<InstalledBackend>> {
    for (name, path) in backend_dirs(base_path)? {
        let metadata = read_metadata(&path)?;
        if metadata.as_ref().and_then(|m| m.alias()) == Some(alias) {
            return Ok(Some(InstalledBackend {
                name,
                path,
                metadata,
            }));
        }
    }

    Ok(None)
}

/// Backend directories under the base path as `(name, path)`, sorted by name.
fn backend_dirs(base_path: &Path) -> BackendResult<Vec<(String, PathBuf)>> {
    let entries = match fs::read_dir(base_path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(BackendError::io("read directory", base_path, e)),
    };

    let mut dirs = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| BackendError::io("read directory", base_path, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| BackendError::io("inspect", entry.path(), e))?;

        if !file_type.is_dir() {
            continue;
        }

        let Ok(name) = entry.file_name().into_string() else {
            tracing::warn!("Skipping backend directory with non UTF-8 name: {}", entry.path().display());
            continue;
        };

        dirs.push((name, entry.path()));
    }

    dirs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(dirs)
}

/// Map every exposed name (directory name and alias) to its entrypoint.
///
/// Redirect directories are listed under their own name with their own
/// (absent) entrypoint path.
pub fn list_backends(base_path: &Path) -> BackendResult<BTreeMap<String, PathBuf>> {
    let installed = installed_backends(base_path)?;
    Ok(exposed_names(&installed))
}

fn exposed_names(installed: &[InstalledBackend]) -> BTreeMap<String, PathBuf> {
    let mut names: BTreeMap<String, PathBuf> = installed
        .iter()
        .map(|b| (b.name.clone(), b.entrypoint()))
        .collect();

    for backend in installed {
        if let Some(alias) = backend.alias() {
            names
                .entry(alias.to_string())
                .or_insert_with(|| backend.entrypoint());
        }
    }

    names
}

/// Receives entrypoints of installed backends for execution.
pub trait EntrypointRegistrar {
    fn register_entrypoint(&mut self, name: &str, path: &Path);
}

impl EntrypointRegistrar for BTreeMap<String, PathBuf> {
    fn register_entrypoint(&mut self, name: &str, path: &Path) {
        self.insert(name.to_string(), path.to_path_buf());
    }
}

impl EntrypointRegistrar for HashMap<String, PathBuf> {
    fn register_entrypoint(&mut self, name: &str, path: &Path) {
        self.insert(name.to_string(), path.to_path_buf());
    }
}

/// Register every exposed name with `registrar`, returning how many were registered.
pub fn register_backends(
    base_path: &Path,
    registrar: &mut dyn EntrypointRegistrar,
) -> BackendResult<usize> {
    let backends = list_backends(base_path)?;

    for (name, path) in &backends {
        registrar.register_entrypoint(name, path);
    }

    tracing::debug!(count = backends.len(), "registered installed backends");
    Ok(backends.len())
}
