//! Catalog fixtures shared across unit tests.

use crate::core::catalog::{Catalog, CatalogEntry, Gallery};

/// URL of the gallery every fixture entry comes from.
pub const OFFICIAL_GALLERY_URL: &str = "https://example.org/backends.json";

/// The gallery every fixture entry comes from.
pub fn official_gallery() -> Gallery {
    Gallery::new("official", OFFICIAL_GALLERY_URL)
}

/// A small catalog with one meta-backend:
///
/// - `llama-cpu` (`oci://img/cpu`, alias `llama`)
/// - `llama-meta` (`nvidia` -> `llama-cuda`)
/// - `llama-cuda` (`oci://img/cuda`)
pub fn llama_catalog() -> Catalog {
    [
        CatalogEntry::new("llama-cpu", "oci://img/cpu").with_alias("llama"),
        CatalogEntry::meta("llama-meta", [("nvidia", "llama-cuda")]),
        CatalogEntry::new("llama-cuda", "oci://img/cuda"),
    ]
    .into_iter()
    .map(|entry| entry.with_gallery(official_gallery()))
    .collect()
}

/// The JSON index a gallery would serve for [`llama_catalog`].
pub fn llama_gallery_json() -> &'static str {
    r#"[
  {"name": "llama-cpu", "uri": "oci://img/cpu", "alias": "llama", "license": "MIT"},
  {"name": "llama-meta", "capabilities": {"nvidia": "llama-cuda"}},
  {"name": "llama-cuda", "uri": "oci://img/cuda", "tags": ["gpu"]}
]"#
}
