//! Backend installation.
//!
//! Real backends are fetched into `<base>/<name>` and get a metadata sidecar.
//! Meta-backends are never installed themselves: the concrete backend chosen
//! for the host is installed under its own name, and a redirect record is
//! written under the requested name so it can be listed and removed later.

use std::path::{Path, PathBuf};

use crate::core::capability::{select_concrete, CapabilityProfile};
use crate::core::catalog::{validate_backend_name, Catalog, CatalogEntry, GALLERY_SEPARATOR};
use crate::core::errors::{BackendError, BackendResult};
use crate::core::metadata::{write_metadata, InstalledMetadata};
use crate::sources::image::{ImageFetcher, ProgressFn};
use crate::util::fs::ensure_dir;

/// Result of installing a backend by name.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallOutcome {
    /// Name the backend was requested as (without gallery qualifier)
    pub requested: String,

    /// Concrete backend that was fetched
    pub backend: String,

    /// Directory of the concrete backend
    pub path: PathBuf,

    /// Directory of the redirect record, for meta-backends
    pub redirect: Option<PathBuf>,
}

impl InstallOutcome {
    pub fn is_meta(&self) -> bool {
        self.redirect.is_some()
    }
}

/// Install a concrete catalog entry into `<base_path>/<entry.name>`.
///
/// Reinstalling overwrites the metadata; no cleanup happens on failure.
pub fn install_backend(
    base_path: &Path,
    entry: &CatalogEntry,
    fetcher: &dyn ImageFetcher,
    progress: &mut ProgressFn<'_>,
) -> BackendResult<InstalledMetadata> {
    if entry.is_meta() {
        return Err(BackendError::InvalidOperation {
            name: entry.name.clone(),
            reason: "meta backends cannot be installed directly".to_string(),
        });
    }

    validate_backend_name(&entry.name)?;

    let backend_path = base_path.join(&entry.name);
    ensure_dir(base_path)?;
    ensure_dir(&backend_path)?;

    tracing::debug!(
        name = %entry.name,
        uri = %entry.uri,
        path = %backend_path.display(),
        "installing backend"
    );

    fetcher
        .fetch_and_unpack(&entry.uri, &backend_path, progress)
        .map_err(|source| BackendError::Collaborator {
            uri: entry.uri.clone(),
            dest: backend_path.clone(),
            source,
        })?;

    let metadata = InstalledMetadata::for_entry(entry);
    write_metadata(&backend_path, &metadata)?;

    Ok(metadata)
}

/// Resolve `requested` in the catalog and install it.
///
/// For meta-backends the concrete backend matching `profile` is installed
/// and a redirect record is written to `<base_path>/<requested>`.
pub fn install_by_name(
    base_path: &Path,
    requested: &str,
    catalog: &Catalog,
    profile: Option<&CapabilityProfile>,
    fetcher: &dyn ImageFetcher,
    progress: &mut ProgressFn<'_>,
) -> BackendResult<InstallOutcome> {
    let record_name = requested
        .split_once(GALLERY_SEPARATOR)
        .map_or(requested, |(_, name)| name);
    validate_backend_name(record_name)?;

    let entry = catalog.resolve(requested)?;

    if !entry.is_meta() {
        install_backend(base_path, entry, fetcher, progress)?;
        return Ok(InstallOutcome {
            requested: record_name.to_string(),
            backend: entry.name.clone(),
            path: base_path.join(&entry.name),
            redirect: None,
        });
    }

    tracing::debug!(name = %entry.name, "backend is a meta backend");

    let concrete = select_concrete(entry, profile, catalog)?;

    // The redirect record would land in the concrete backend's own directory
    if record_name == concrete.name {
        return Err(BackendError::InvalidOperation {
            name: requested.to_string(),
            reason: format!(
                "redirect record `{}` would overwrite concrete backend `{}`",
                record_name, concrete.name
            ),
        });
    }

    install_backend(base_path, concrete, fetcher, progress)?;

    let redirect_path = base_path.join(record_name);
    ensure_dir(&redirect_path)?;
    write_metadata(
        &redirect_path,
        &InstalledMetadata::redirect(record_name, entry, &concrete.name),
    )?;

    tracing::debug!(
        requested = record_name,
        backend = %concrete.name,
        "installed backend from meta backend"
    );

    Ok(InstallOutcome {
        requested: record_name.to_string(),
        backend: concrete.name.clone(),
        path: base_path.join(&concrete.name),
        redirect: Some(redirect_path),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::{read_metadata, ENTRYPOINT_FILE, METADATA_FILE};
    use crate::test_support::{llama_catalog, no_progress, MockImageFetcher};
    use tempfile::TempDir;

    #[test]
    fn test_install_concrete_backend() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("backends");
        let fetcher = MockImageFetcher::new();
        let catalog = llama_catalog();

        let outcome = install_by_name(
            &base,
            "llama-cpu",
            &catalog,
            None,
            &fetcher,
            &mut no_progress(),
        )
        .unwrap();

        assert!(!outcome.is_meta());
        assert_eq!(outcome.path, base.join("llama-cpu"));
        assert!(base.join("llama-cpu").join(ENTRYPOINT_FILE).is_file());
        assert_eq!(fetcher.calls(), vec![("oci://img/cpu".to_string(), base.join("llama-cpu"))]);

        let metadata = read_metadata(&base.join("llama-cpu")).unwrap().unwrap();
        assert_eq!(metadata.name, "llama-cpu");
        assert_eq!(metadata.alias(), Some("llama"));
        assert_eq!(metadata.gallery_url, "https://example.org/backends.json");
        assert!(!metadata.is_redirect());
        assert!(metadata.installed_at.is_some());
    }

    #[test]
    fn test_install_meta_backend_writes_redirect() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path();
        let fetcher = MockImageFetcher::new();
        let catalog = llama_catalog();

        let outcome = install_by_name(
            base,
            "llama-meta",
            &catalog,
            Some(&CapabilityProfile::new("nvidia")),
            &fetcher,
            &mut no_progress(),
        )
        .unwrap();

        assert_eq!(outcome.backend, "llama-cuda");
        assert_eq!(outcome.redirect, Some(base.join("llama-meta")));

        let concrete = read_metadata(&base.join("llama-cuda")).unwrap().unwrap();
        assert_eq!(concrete.name, "llama-cuda");
        assert_eq!(concrete.redirect_target(), None);

        let redirect = read_metadata(&base.join("llama-meta")).unwrap().unwrap();
        assert_eq!(redirect.name, "llama-meta");
        assert_eq!(redirect.redirect_target(), Some("llama-cuda"));

        // The redirect directory only holds the record
        let files: Vec<_> = std::fs::read_dir(base.join("llama-meta"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(files, vec![METADATA_FILE]);

        // Only the concrete image was fetched
        assert_eq!(fetcher.calls().len(), 1);
        assert_eq!(fetcher.calls()[0].0, "oci://img/cuda");
    }

    #[test]
    fn test_direct_meta_install_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let fetcher = MockImageFetcher::new();
        let catalog = llama_catalog();
        let meta = catalog.resolve("llama-meta").unwrap();

        let err = install_backend(tmp.path(), meta, &fetcher, &mut no_progress()).unwrap_err();
        assert!(matches!(err, BackendError::InvalidOperation { .. }));
        assert!(fetcher.calls().is_empty());
        assert!(!tmp.path().join("llama-meta").exists());
    }

    #[test]
    fn test_meta_install_without_profile() {
        let tmp = TempDir::new().unwrap();
        let fetcher = MockImageFetcher::new();

        let err = install_by_name(
            tmp.path(),
            "llama-meta",
            &llama_catalog(),
            None,
            &fetcher,
            &mut no_progress(),
        )
        .unwrap_err();

        assert!(matches!(err, BackendError::NoCapabilityProfile { .. }));
        assert!(fetcher.calls().is_empty());
    }

    #[test]
    fn test_unknown_name() {
        let tmp = TempDir::new().unwrap();
        let err = install_by_name(
            tmp.path(),
            "mystery",
            &llama_catalog(),
            None,
            &MockImageFetcher::new(),
            &mut no_progress(),
        )
        .unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn test_collaborator_failure_is_wrapped() {
        let tmp = TempDir::new().unwrap();
        let fetcher = MockImageFetcher::failing("registry unreachable");

        let err = install_by_name(
            tmp.path(),
            "llama-cpu",
            &llama_catalog(),
            None,
            &fetcher,
            &mut no_progress(),
        )
        .unwrap_err();

        match err {
            BackendError::Collaborator { uri, dest, source } => {
                assert_eq!(uri, "oci://img/cpu");
                assert_eq!(dest, tmp.path().join("llama-cpu"));
                assert!(source.to_string().contains("registry unreachable"));
            }
            other => panic!("unexpected error: {other}"),
        }

        // Directory is left behind, metadata is not written
        assert!(tmp.path().join("llama-cpu").is_dir());
        assert_eq!(read_metadata(&tmp.path().join("llama-cpu")).unwrap(), None);
    }

    #[test]
    fn test_reinstall_overwrites_metadata() {
        let tmp = TempDir::new().unwrap();
        let fetcher = MockImageFetcher::new();
        let catalog = llama_catalog();
        let entry = catalog.resolve("llama-cpu").unwrap();

        let first = install_backend(tmp.path(), entry, &fetcher, &mut no_progress()).unwrap();
        let second = install_backend(tmp.path(), entry, &fetcher, &mut no_progress()).unwrap();

        let dirs: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(dirs.len(), 1);

        let stored = read_metadata(&tmp.path().join("llama-cpu")).unwrap().unwrap();
        assert_eq!(stored.installed_at, second.installed_at);
        assert!(second.installed_at >= first.installed_at);

        let sidecars = std::fs::read_dir(tmp.path().join("llama-cpu"))
            .unwrap()
            .filter(|e| e.as_ref().unwrap().file_name() == METADATA_FILE)
            .count();
        assert_eq!(sidecars, 1);
    }

    #[test]
    fn test_progress_is_relayed() {
        let tmp = TempDir::new().unwrap();
        let fetcher = MockImageFetcher::new();
        let mut events = Vec::new();
        let mut progress = |stage: &str, artifact: &str, _: &str, fraction: f64| {
            events.push((stage.to_string(), artifact.to_string(), fraction));
        };

        install_by_name(
            tmp.path(),
            "llama-cpu",
            &llama_catalog(),
            None,
            &fetcher,
            &mut progress,
        )
        .unwrap();

        assert!(!events.is_empty());
        assert!(events.iter().all(|(_, artifact, _)| artifact == "oci://img/cpu"));
        assert_eq!(events.last().unwrap().2, 1.0);
    }

    #[test]
    fn test_gallery_qualified_meta_install_uses_plain_name() {
        let tmp = TempDir::new().unwrap();
        let fetcher = MockImageFetcher::new();

        let outcome = install_by_name(
            tmp.path(),
            "official@llama-meta",
            &llama_catalog(),
            Some(&CapabilityProfile::new("nvidia")),
            &fetcher,
            &mut no_progress(),
        )
        .unwrap();

        assert_eq!(outcome.requested, "llama-meta");
        assert!(tmp.path().join("llama-meta").is_dir());
    }

    #[test]
    fn test_meta_named_like_its_target_is_rejected() {
        use crate::core::catalog::Gallery;

        let tmp = TempDir::new().unwrap();
        let official = Gallery::new("official", "https://example.org/backends.json");
        let community = Gallery::new("community", "https://example.org/community.json");
        let catalog: Catalog = [
            CatalogEntry::new("llama", "oci://img/llama")
                .with_alias("l")
                .with_gallery(official),
            CatalogEntry::meta("llama", [("nvidia", "llama")]).with_gallery(community),
        ]
        .into_iter()
        .collect();

        let fetcher = MockImageFetcher::new();
        install_by_name(tmp.path(), "llama", &catalog, None, &fetcher, &mut no_progress()).unwrap();

        let err = install_by_name(
            tmp.path(),
            "community@llama",
            &catalog,
            Some(&CapabilityProfile::new("nvidia")),
            &fetcher,
            &mut no_progress(),
        )
        .unwrap_err();

        assert!(matches!(err, BackendError::InvalidOperation { ref name, .. } if name == "community@llama"));
        assert_eq!(fetcher.calls().len(), 1, "nothing fetched for the rejected request");

        let metadata = read_metadata(&tmp.path().join("llama")).unwrap().unwrap();
        assert_eq!(metadata.alias(), Some("l"));
        assert!(!metadata.is_redirect());
    }

    #[test]
    fn test_invalid_requested_name() {
        let tmp = TempDir::new().unwrap();
        let err = install_by_name(
            tmp.path(),
            "../escape",
            &llama_catalog(),
            None,
            &MockImageFetcher::new(),
            &mut no_progress(),
        )
        .unwrap_err();

        assert!(matches!(err, BackendError::InvalidName { .. }));
    }
}
