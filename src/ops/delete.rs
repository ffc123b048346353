//! Backend removal.
//!
//! A name is looked up as a directory first and as an installed alias second.
//! Removing a redirect record also removes the concrete backend it points to,
//! concrete backend first. Removing an unknown name is an error, so callers
//! can tell "never existed" apart from a successful removal.

use std::path::{Path, PathBuf};

use crate::core::catalog::validate_backend_name;
use crate::core::errors::{BackendError, BackendResult};
use crate::core::metadata::read_metadata;
use crate::ops::installed::find_by_alias;
use crate::util::fs::{is_dir, remove_dir_all};

/// Directories removed by a delete, in removal order.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteOutcome {
    pub name: String,
    pub removed: Vec<PathBuf>,
}

/// Find the directory a name refers to: the directory itself, else the
/// first directory (in name order) whose metadata declares it as alias.
pub fn locate_backend(base_path: &Path, name: &str) -> BackendResult<PathBuf> {
    validate_backend_name(name)?;

    let direct = base_path.join(name);
    if is_dir(&direct)? {
        return Ok(direct);
    }

    let backend = find_by_alias(base_path, name)?.ok_or_else(|| BackendError::not_found(name))?;

    tracing::debug!(alias = name, backend = %backend.name, "resolved installed alias");
    Ok(backend.path)
}

/// Directories a delete of `name` would remove, in removal order.
///
/// Fails the same way [`delete_backend`] would before touching the disk,
/// including a redirect whose concrete backend is missing.
pub fn plan_delete(base_path: &Path, name: &str) -> BackendResult<Vec<PathBuf>> {
    let target = locate_backend(base_path, name)?;
    let mut plan = Vec::new();

    if let Some(metadata) = read_metadata(&target)? {
        if let Some(concrete) = metadata.redirect_target() {
            validate_backend_name(concrete)?;
            let concrete_dir = base_path.join(concrete);

            if concrete_dir != target {
                if !is_dir(&concrete_dir)? {
                    return Err(BackendError::InconsistentState {
                        name: metadata.name.clone(),
                        target: concrete.to_string(),
                        path: concrete_dir,
                    });
                }
                plan.push(concrete_dir);
            }
        }
    }

    plan.push(target);
    Ok(plan)
}

/// Delete an installed backend by name or alias, cascading through redirects.
///
/// The concrete backend goes first; if it cannot be removed the redirect
/// record stays in place.
pub fn delete_backend(base_path: &Path, name: &str) -> BackendResult<DeleteOutcome> {
    let plan = plan_delete(base_path, name)?;
    let mut removed = Vec::with_capacity(plan.len());

    for dir in plan {
        tracing::debug!(backend = %dir.display(), "deleting backend");
        remove_dir_all(&dir)?;
        removed.push(dir);
    }

    Ok(DeleteOutcome {
        name: name.to_string(),
        removed,
    })
}
