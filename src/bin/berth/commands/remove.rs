//! `berth remove` command

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::RemoveArgs;
use crate::GlobalOptions;
use berth::ops::{delete_backend, plan_delete};
use berth::util::shell::Status;

pub fn execute(args: RemoveArgs, opts: &GlobalOptions) -> Result<()> {
    let shell = &opts.shell;
    let base = opts.ctx.backends_path();

    for name in &args.names {
        if args.dry_run {
            let plan = plan_delete(base, name)
                .with_context(|| format!("cannot remove `{}`", name))?;

            for path in &plan {
                shell.status(Status::Info, format!("Would remove {}", dir_name(path)));
            }
            continue;
        }

        shell.status(Status::Removing, name);
        let outcome =
            delete_backend(base, name).with_context(|| format!("failed to remove `{}`", name))?;

        for path in &outcome.removed {
            shell.status(Status::Removed, dir_name(path));
        }
    }

    Ok(())
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
