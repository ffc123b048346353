//! berth - install and manage inference backends from galleries
//!
//! This crate provides the core library functionality for berth: catalog
//! resolution across galleries, meta-backend selection by host capability,
//! installation into a backends directory and cascading removal.

pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

/// Test utilities and mocks for berth unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides a mock image fetcher and catalog fixtures.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    catalog::{Catalog, CatalogEntry, Gallery},
    capability::CapabilityProfile,
    errors::{BackendError, BackendResult},
    metadata::InstalledMetadata,
};

pub use util::context::GlobalContext;
