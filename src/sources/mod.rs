//! External collaborators.
//!
//! Each collaborator is a trait consumed by the operations in [`crate::ops`],
//! with one real implementation:
//! - [`CatalogProvider`] / [`GalleryClient`]: gallery indexes to a merged catalog
//! - [`ImageFetcher`] / [`TarballFetcher`]: backend images into a directory
//! - [`CapabilityProbe`] / [`SystemProbe`]: the host capability profile

pub mod gallery;
pub mod image;
pub mod probe;

pub use gallery::{CatalogProvider, GalleryClient};
pub use image::{ImageFetcher, ProgressFn, TarballFetcher};
pub use probe::{CapabilityProbe, SystemProbe};
