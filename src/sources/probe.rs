//! Host capability detection.
//!
//! Detection order:
//! 1. An explicit override (`BERTH_CAPABILITY`, `--capability` or config)
//! 2. PCI vendor ids of DRM devices under `/sys/class/drm` (Linux)
//! 3. Vendor tools on `PATH` (`nvidia-smi`, `rocminfo`)
//! 4. `cpu` on Linux; unavailable elsewhere

use std::path::{Path, PathBuf};

use crate::core::capability::{CapabilityProfile, CPU_CAPABILITY};

/// Produces the capability profile of the current host.
pub trait CapabilityProbe {
    /// The host profile, or `None` when it cannot be determined.
    fn current_profile(&self) -> Option<CapabilityProfile>;
}

/// Fixed profile, used for overrides and tests.
impl CapabilityProbe for Option<CapabilityProfile> {
    fn current_profile(&self) -> Option<CapabilityProfile> {
        self.clone()
    }
}

const PCI_VENDORS: &[(&str, &str)] = &[("0x10de", "nvidia"), ("0x1002", "amd"), ("0x8086", "intel")];

const VENDOR_TOOLS: &[(&str, &str)] = &[("nvidia-smi", "nvidia"), ("rocminfo", "amd")];

/// Probes the local machine for accelerators.
#[derive(Debug, Clone)]
pub struct SystemProbe {
    override_capability: Option<String>,
    drm_root: PathBuf,
}

impl SystemProbe {
    pub fn new() -> Self {
        SystemProbe {
            override_capability: None,
            drm_root: PathBuf::from("/sys/class/drm"),
        }
    }

    /// Report `capability` instead of probing.
    pub fn with_override(mut self, capability: Option<String>) -> Self {
        self.override_capability = capability.filter(|c| !c.is_empty());
        self
    }

    /// Read DRM devices from another root (for tests).
    pub fn with_drm_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.drm_root = root.into();
        self
    }

    /// Map DRM device PCI vendor ids to a vendor key.
    ///
    /// Discrete vendors win over integrated Intel graphics.
    fn vendor_from_drm(&self) -> Option<&'static str> {
        let entries = std::fs::read_dir(&self.drm_root).ok()?;

        let mut found: Vec<&'static str> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| read_vendor_id(&e.path().join("device").join("vendor")))
            .filter_map(|id| {
                PCI_VENDORS
                    .iter()
                    .find(|(pci, _)| id.eq_ignore_ascii_case(pci))
                    .map(|(_, vendor)| *vendor)
            })
            .collect();

        found.sort_by_key(|vendor| PCI_VENDORS.iter().position(|(_, v)| v == vendor));
        found.into_iter().next()
    }

    fn vendor_from_tools(&self) -> Option<&'static str> {
        VENDOR_TOOLS
            .iter()
            .find(|(tool, _)| which::which(tool).is_ok())
            .map(|(_, vendor)| *vendor)
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityProbe for SystemProbe {
    fn current_profile(&self) -> Option<CapabilityProfile> {
        if let Some(capability) = &self.override_capability {
            tracing::debug!(capability = %capability, "using capability override");
            return Some(CapabilityProfile::new(capability.clone()));
        }

        if let Some(vendor) = self.vendor_from_drm().or_else(|| self.vendor_from_tools()) {
            tracing::debug!(vendor, "detected accelerator");
            return Some(CapabilityProfile::new(vendor));
        }

        if cfg!(target_os = "linux") {
            Some(CapabilityProfile::new(CPU_CAPABILITY))
        } else {
            tracing::debug!("no accelerator detected and platform probing unsupported");
            None
        }
    }
}

fn read_vendor_id(path: &Path) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
}
