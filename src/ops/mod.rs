//! High-level operations over a backends directory.
//!
//! This module contains the implementation of berth commands.

pub mod delete;
pub mod install;
pub mod installed;

pub use delete::{delete_backend, locate_backend, plan_delete, DeleteOutcome};
pub use install::{install_backend, install_by_name, InstallOutcome};
pub use installed::{
    find_by_alias, installed_backends, list_backends, register_backends, EntrypointRegistrar,
    InstalledBackend,
};
