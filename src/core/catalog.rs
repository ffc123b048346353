//! Catalog entries and name resolution.
//!
//! A catalog is the ordered merge of every configured gallery. Resolution
//! never looks at installed state; it only answers "which gallery entry does
//! this name refer to".
//!
//! # Precedence
//!
//! 1. A `<gallery>@<name>` request only considers entries from that gallery.
//! 2. An exact `name` match anywhere in merge order beats any `alias` match.
//! 3. Within each class the first entry in merge order wins.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::errors::{BackendError, BackendResult};

/// Separator for gallery-qualified names (`official@llama-cpp`).
pub const GALLERY_SEPARATOR: char = '@';

/// A configured backend gallery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gallery {
    /// Human-readable gallery name, used for `<gallery>@<name>` lookups
    pub name: String,

    /// Location of the gallery index (`https://`, `file://` or a plain path)
    pub url: String,
}

impl Gallery {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Gallery {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A single installable (or meta) backend advertised by a gallery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,

    /// Image reference; empty for meta-backends
    #[serde(default)]
    pub uri: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Capability key (e.g. GPU vendor) -> concrete backend name
    #[serde(default, alias = "capabilities_map", skip_serializing_if = "BTreeMap::is_empty")]
    pub capabilities: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Gallery this entry was loaded from (filled in by the catalog provider)
    #[serde(skip)]
    pub gallery: Gallery,
}

impl CatalogEntry {
    /// Create a concrete entry pointing at an image.
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        CatalogEntry {
            name: name.into(),
            uri: uri.into(),
            ..Default::default()
        }
    }

    /// Create a meta entry from `(capability, backend)` pairs.
    pub fn meta<K, V>(name: impl Into<String>, capabilities: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        CatalogEntry {
            name: name.into(),
            capabilities: capabilities
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_gallery(mut self, gallery: Gallery) -> Self {
        self.gallery = gallery;
        self
    }

    /// An entry is a meta-backend iff its capability map is non-empty.
    pub fn is_meta(&self) -> bool {
        !self.capabilities.is_empty()
    }

    /// The alias, treating an empty string as unset.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref().filter(|a| !a.is_empty())
    }

    /// Location of the gallery this entry came from.
    pub fn source_url(&self) -> &str {
        &self.gallery.url
    }
}

/// Ordered, merged view over all gallery entries.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Catalog { entries }
    }

    /// Entries in merge order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append entries from another gallery; earlier entries keep precedence.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = CatalogEntry>) {
        self.entries.extend(entries);
    }

    /// Find the entry a requested name refers to, if any.
    pub fn find(&self, requested: &str) -> Option<&CatalogEntry> {
        let (gallery, name) = match requested.split_once(GALLERY_SEPARATOR) {
            Some((gallery, name)) => (Some(gallery), name),
            None => (None, requested),
        };

        let in_scope = |entry: &&CatalogEntry| gallery.map_or(true, |g| entry.gallery.name == g);

        self.entries
            .iter()
            .filter(in_scope)
            .find(|entry| entry.name == name)
            .or_else(|| {
                self.entries
                    .iter()
                    .filter(in_scope)
                    .find(|entry| entry.alias() == Some(name))
            })
    }

    /// Resolve a requested name to its catalog entry.
    pub fn resolve(&self, requested: &str) -> BackendResult<&CatalogEntry> {
        let entry = self
            .find(requested)
            .ok_or_else(|| BackendError::not_found(requested))?;

        tracing::debug!(
            requested,
            name = %entry.name,
            gallery = %entry.gallery.name,
            meta = entry.is_meta(),
            "resolved catalog entry"
        );

        Ok(entry)
    }
}

impl FromIterator<CatalogEntry> for Catalog {
    fn from_iter<I: IntoIterator<Item = CatalogEntry>>(iter: I) -> Self {
        Catalog::new(iter.into_iter().collect())
    }
}

/// Check that a name can be used as a backend directory name.
///
/// Names must be a single path component and may not contain the gallery
/// separator.
pub fn validate_backend_name(name: &str) -> BackendResult<()> {
    let reason = if name.is_empty() {
        "name cannot be empty"
    } else if name == "." || name == ".." {
        "name cannot be a relative path component"
    } else if name.contains(['/', '\\']) {
        "name cannot contain path separators"
    } else if name.contains(GALLERY_SEPARATOR) {
        "name cannot contain `@`"
    } else if name.contains('\0') {
        "name cannot contain NUL bytes"
    } else {
        return Ok(());
    };

    Err(BackendError::InvalidName {
        name: name.to_string(),
        reason,
    })
}
