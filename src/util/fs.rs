//! Filesystem utilities for backend directories.

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

use crate::core::errors::{BackendError, BackendResult};

/// Ensure a directory exists, creating it and its parents if necessary.
pub fn ensure_dir(path: &Path) -> BackendResult<()> {
    fs::create_dir_all(path).map_err(|e| BackendError::io("create directory", path, e))
}

/// Check whether `path` is a directory, without following symlinks.
///
/// A missing path is `Ok(false)`; any other failure to inspect it is an error.
pub fn is_dir(path: &Path) -> BackendResult<bool> {
    match fs::symlink_metadata(path) {
        Ok(meta) => Ok(meta.is_dir()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(BackendError::io("inspect", path, e)),
    }
}

/// Remove a directory and all its contents.
pub fn remove_dir_all(path: &Path) -> BackendResult<()> {
    fs::remove_dir_all(path).map_err(|e| BackendError::io("remove directory", path, e))
}

/// Total size in bytes of the regular files below `path`.
///
/// Unreadable entries are skipped.
pub fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// Format a size in bytes to a human-readable string.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
