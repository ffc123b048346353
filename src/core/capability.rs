//! Host capability profiles and meta-backend selection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::catalog::{Catalog, CatalogEntry};
use crate::core::errors::{BackendError, BackendResult};

/// Capability key reported for hosts without a detected accelerator.
pub const CPU_CAPABILITY: &str = "cpu";

/// Description of the host used to pick among capability-mapped backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityProfile {
    /// Accelerator vendor key (`nvidia`, `amd`, `intel`, `cpu`, ...)
    pub gpu_vendor: String,
}

impl CapabilityProfile {
    pub fn new(gpu_vendor: impl Into<String>) -> Self {
        CapabilityProfile {
            gpu_vendor: gpu_vendor.into(),
        }
    }

    pub fn cpu() -> Self {
        Self::new(CPU_CAPABILITY)
    }

    /// The key looked up in a meta-backend's capability map.
    pub fn capability_key(&self) -> &str {
        &self.gpu_vendor
    }
}

impl fmt::Display for CapabilityProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.gpu_vendor)
    }
}

/// Select the concrete entry a meta-backend redirects to on this host.
///
/// The mapped name is resolved against the same catalog, so it follows the
/// usual name-then-alias precedence.
pub fn select_concrete<'a>(
    entry: &CatalogEntry,
    profile: Option<&CapabilityProfile>,
    catalog: &'a Catalog,
) -> BackendResult<&'a CatalogEntry> {
    let profile = profile.ok_or_else(|| BackendError::NoCapabilityProfile {
        name: entry.name.clone(),
    })?;

    let key = profile.capability_key();
    let target = entry
        .capabilities
        .get(key)
        .filter(|target| !target.is_empty())
        .ok_or_else(|| BackendError::NoCapabilityMatch {
            name: entry.name.clone(),
            capability: key.to_string(),
            available: entry.capabilities.keys().cloned().collect(),
        })?;

    let concrete = catalog.resolve(target)?;

    if concrete.is_meta() {
        return Err(BackendError::InvalidOperation {
            name: entry.name.clone(),
            reason: format!("capability `{}` maps to another meta backend `{}`", key, concrete.name),
        });
    }

    tracing::debug!(
        meta = %entry.name,
        capability = key,
        concrete = %concrete.name,
        "selected concrete backend"
    );

    Ok(concrete)
}
