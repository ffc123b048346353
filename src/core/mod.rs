//! Core data structures for Berth.
//!
//! This module contains the foundational types used throughout Berth:
//! - Gallery catalog entries and name resolution
//! - Host capability profiles and meta-backend selection
//! - Installed metadata sidecars
//! - The backend error taxonomy

pub mod capability;
pub mod catalog;
pub mod errors;
pub mod metadata;

pub use capability::{select_concrete, CapabilityProfile, CPU_CAPABILITY};
pub use catalog::{validate_backend_name, Catalog, CatalogEntry, Gallery};
pub use errors::{BackendError, BackendResult};
pub use metadata::{
    read_metadata, write_metadata, InstalledMetadata, ENTRYPOINT_FILE, METADATA_FILE,
};
