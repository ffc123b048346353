//! Gallery index loading.
//!
//! A gallery index is a JSON array of backend entries:
//!
//! ```json
//! [
//!   { "name": "llama-cpu", "uri": "https://example.org/llama-cpu.tar.gz", "alias": "llama" },
//!   { "name": "llama-meta", "capabilities": { "nvidia": "llama-cuda", "cpu": "llama-cpu" } }
//! ]
//! ```
//!
//! Galleries are merged in the order they are configured.

use anyhow::{bail, Context, Result};
use url::Url;

use crate::core::{Catalog, CatalogEntry, Gallery};

/// Produces the merged catalog for a set of galleries.
pub trait CatalogProvider {
    /// List all entries of `galleries`, in gallery order then file order.
    fn list_entries(&self, galleries: &[Gallery]) -> Result<Catalog>;
}

/// Loads gallery indexes over HTTP or from the local filesystem.
#[derive(Debug, Default)]
pub struct GalleryClient {
    _private: (),
}

impl GalleryClient {
    pub fn new() -> Self {
        GalleryClient { _private: () }
    }

    /// Read the raw index of a single gallery.
    fn fetch_index(&self, gallery: &Gallery) -> Result<String> {
        match Url::parse(&gallery.url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                tracing::info!("Fetching gallery `{}` from {}", gallery.name, url);

                let response = reqwest::blocking::get(url.as_str())
                    .with_context(|| format!("failed to download gallery from {}", url))?;
                if !response.status().is_success() {
                    bail!("failed to download gallery from {}: HTTP {}", url, response.status());
                }
                response
                    .text()
                    .with_context(|| format!("failed to read gallery body from {}", url))
            }
            Ok(url) if url.scheme() == "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| anyhow::anyhow!("invalid file URL: {}", gallery.url))?;
                std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read gallery: {}", path.display()))
            }
            Ok(url) if url.scheme().len() > 1 => {
                bail!("unsupported gallery scheme `{}` in `{}`", url.scheme(), gallery.url)
            }
            _ => std::fs::read_to_string(&gallery.url)
                .with_context(|| format!("failed to read gallery: {}", gallery.url)),
        }
    }

    /// Load the entries of a single gallery, tagging each with its origin.
    pub fn load_gallery(&self, gallery: &Gallery) -> Result<Vec<CatalogEntry>> {
        let contents = self.fetch_index(gallery)?;
        parse_gallery(gallery, &contents)
    }
}

impl CatalogProvider for GalleryClient {
    fn list_entries(&self, galleries: &[Gallery]) -> Result<Catalog> {
        let mut catalog = Catalog::default();

        for gallery in galleries {
            let entries = self
                .load_gallery(gallery)
                .with_context(|| format!("failed to load gallery `{}`", gallery.name))?;
            tracing::debug!(gallery = %gallery.name, entries = entries.len(), "loaded gallery");
            catalog.extend(entries);
        }

        Ok(catalog)
    }
}

/// Parse a gallery index and attach the gallery to every entry.
pub fn parse_gallery(gallery: &Gallery, contents: &str) -> Result<Vec<CatalogEntry>> {
    let entries: Vec<CatalogEntry> = serde_json::from_str(contents)
        .with_context(|| format!("failed to parse gallery index for `{}`", gallery.name))?;

    Ok(entries
        .into_iter()
        .map(|entry| entry.with_gallery(gallery.clone()))
        .collect())
}
