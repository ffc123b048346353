//! Installed backend metadata sidecar.
//!
//! Each installed backend directory may hold a `metadata.json` describing
//! where the backend came from and how it can be addressed:
//!
//! ```json
//! {
//!   "name": "llama-meta",
//!   "meta_backend_for": "llama-cuda",
//!   "gallery_url": "https://example.org/backends.json",
//!   "installed_at": "2026-10-18T09:12:44Z"
//! }
//! ```
//!
//! A directory without the sidecar is a legacy install and reads as `None`.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::catalog::CatalogEntry;
use crate::core::errors::{BackendError, BackendResult};

/// Metadata sidecar file name inside a backend directory.
pub const METADATA_FILE: &str = "metadata.json";

/// Entrypoint script inside a backend directory, written by the image.
pub const ENTRYPOINT_FILE: &str = "run.sh";

/// Identity and provenance of an installed backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledMetadata {
    /// Name the directory was installed under
    #[serde(default)]
    pub name: String,

    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub alias: Option<String>,

    /// Concrete backend this record redirects to (meta installs only)
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub meta_backend_for: Option<String>,

    #[serde(default)]
    pub gallery_url: String,

    /// Install time; unreadable values are dropped rather than failing the read
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub installed_at: Option<DateTime<Utc>>,
}

impl InstalledMetadata {
    /// Metadata for a real install of a catalog entry.
    pub fn for_entry(entry: &CatalogEntry) -> Self {
        InstalledMetadata {
            name: entry.name.clone(),
            alias: entry.alias().map(str::to_string),
            meta_backend_for: None,
            gallery_url: entry.source_url().to_string(),
            installed_at: Some(Utc::now()),
        }
    }

    /// Redirect record stored under the name a meta-backend was requested as.
    pub fn redirect(requested: &str, meta: &CatalogEntry, concrete: &str) -> Self {
        InstalledMetadata {
            name: requested.to_string(),
            alias: None,
            meta_backend_for: Some(concrete.to_string()),
            gallery_url: meta.source_url().to_string(),
            installed_at: Some(Utc::now()),
        }
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Name of the concrete backend this record points to, if it is a redirect.
    pub fn redirect_target(&self) -> Option<&str> {
        self.meta_backend_for.as_deref()
    }

    pub fn is_redirect(&self) -> bool {
        self.meta_backend_for.is_some()
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let parsed = value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc));

    if parsed.is_none() && !value.is_null() {
        tracing::debug!(%value, "ignoring unreadable installed_at");
    }
    Ok(parsed)
}

/// Read the metadata sidecar of a backend directory.
///
/// Returns `Ok(None)` when the file does not exist (legacy install) and
/// `MetadataCorrupt` when it exists but cannot be parsed.
pub fn read_metadata(backend_dir: &Path) -> BackendResult<Option<InstalledMetadata>> {
    let path = backend_dir.join(METADATA_FILE);

    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(BackendError::io("read", path, e)),
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| BackendError::MetadataCorrupt { path, source })
}

/// Write the metadata sidecar of a backend directory, replacing any old one.
///
/// The file is written next to its destination and renamed into place.
pub fn write_metadata(backend_dir: &Path, metadata: &InstalledMetadata) -> BackendResult<()> {
    let path = backend_dir.join(METADATA_FILE);

    let mut tmp = tempfile::NamedTempFile::new_in(backend_dir)
        .map_err(|e| BackendError::io("create temporary file in", backend_dir, e))?;

    serde_json::to_writer_pretty(&mut tmp, metadata)
        .map_err(|e| BackendError::io("write", &path, e.into()))?;
    tmp.write_all(b"\n")
        .map_err(|e| BackendError::io("write", &path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(|e| BackendError::io("set permissions on", &path, e))?;
    }

    tmp.persist(&path)
        .map_err(|e| BackendError::io("write", &path, e.error))?;

    tracing::debug!(path = %path.display(), "wrote backend metadata");
    Ok(())
}
