//! `berth list` command

use anyhow::Result;

use crate::cli::ListArgs;
use crate::GlobalOptions;
use berth::ops::{installed_backends, list_backends, InstalledBackend};
use berth::util::fs::{dir_size, format_size};

pub fn execute(args: ListArgs, opts: &GlobalOptions) -> Result<()> {
    let base = opts.ctx.backends_path();

    if args.long || opts.shell.is_verbose() {
        let installed = installed_backends(base)?;
        if installed.is_empty() {
            opts.shell.note(format!("no backends installed in {}", base.display()));
        }
        for backend in &installed {
            print_details(backend);
        }
        return Ok(());
    }

    let listing = list_backends(base)?;
    if listing.is_empty() {
        opts.shell.note(format!("no backends installed in {}", base.display()));
    }
    for (name, entrypoint) in &listing {
        println!("{} -> {}", name, entrypoint.display());
    }

    Ok(())
}

fn print_details(backend: &InstalledBackend) {
    println!("{}", backend.name);

    let Some(metadata) = &backend.metadata else {
        println!("    (no metadata)");
        println!("    Size:       {}", format_size(dir_size(&backend.path)));
        println!();
        return;
    };

    if let Some(target) = metadata.redirect_target() {
        println!("    Uses:       {}", target);
    }
    if let Some(alias) = metadata.alias() {
        println!("    Alias:      {}", alias);
    }
    if !metadata.gallery_url.is_empty() {
        println!("    Gallery:    {}", metadata.gallery_url);
    }
    if let Some(installed_at) = metadata.installed_at {
        println!("    Installed:  {}", installed_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if !metadata.is_redirect() {
        println!("    Size:       {}", format_size(dir_size(&backend.path)));
    }
    println!();
}
