//! Test utilities and mocks for berth unit tests.
//!
//! The mocks stand in for the collaborators in [`crate::sources`] so the
//! install and delete operations can be exercised against a temp directory
//! without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use berth::test_support::{llama_catalog, no_progress, MockImageFetcher};
//!
//! #[test]
//! fn test_example() {
//!     let fetcher = MockImageFetcher::new();
//!     install_by_name(base, "llama-cpu", &llama_catalog(), None, &fetcher, &mut no_progress())?;
//!     assert_eq!(fetcher.calls().len(), 1);
//! }
//! ```

pub mod fixtures;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::core::metadata::ENTRYPOINT_FILE;
use crate::sources::image::{ImageFetcher, ProgressFn, STAGE_DOWNLOAD, STAGE_EXTRACT};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Image fetcher that records its calls and writes a stub entrypoint.
#[derive(Debug, Default)]
pub struct MockImageFetcher {
    calls: Mutex<Vec<(String, PathBuf)>>,
    failure: Option<String>,
}

impl MockImageFetcher {
    /// Create a fetcher that always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher that fails every call with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        MockImageFetcher {
            calls: Mutex::new(Vec::new()),
            failure: Some(message.into()),
        }
    }

    /// Every `(uri, dest)` pair fetched so far, in call order.
    pub fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ImageFetcher for MockImageFetcher {
    fn fetch_and_unpack(
        &self,
        uri: &str,
        dest: &Path,
        progress: &mut ProgressFn<'_>,
    ) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((uri.to_string(), dest.to_path_buf()));

        if let Some(message) = &self.failure {
            bail!("{}", message);
        }

        progress(STAGE_DOWNLOAD, uri, "0 B / 2 B", 0.0);
        progress(STAGE_DOWNLOAD, uri, "1 B / 2 B", 0.5);

        fs::write(
            dest.join(ENTRYPOINT_FILE),
            format!("#!/bin/sh\necho {}\n", uri),
        )?;

        progress(STAGE_EXTRACT, uri, "done", 1.0);
        Ok(())
    }
}

/// A progress callback that ignores every event.
pub fn no_progress() -> impl FnMut(&str, &str, &str, f64) {
    |_: &str, _: &str, _: &str, _: f64| {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mock_fetcher_records_calls() {
        let tmp = TempDir::new().unwrap();
        let fetcher = MockImageFetcher::new();

        fetcher
            .fetch_and_unpack("oci://img/cpu", tmp.path(), &mut no_progress())
            .unwrap();

        assert_eq!(fetcher.calls(), vec![("oci://img/cpu".to_string(), tmp.path().to_path_buf())]);
        assert!(tmp.path().join(ENTRYPOINT_FILE).is_file());
    }

    #[test]
    fn test_failing_fetcher_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let fetcher = MockImageFetcher::failing("boom");

        let err = fetcher
            .fetch_and_unpack("oci://img/cpu", tmp.path(), &mut no_progress())
            .unwrap_err();

        assert_eq!(err.to_string(), "boom");
        assert_eq!(fetcher.calls().len(), 1);
        assert!(!tmp.path().join(ENTRYPOINT_FILE).exists());
    }
}
