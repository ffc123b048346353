//! `berth available` command
//!
//! Lists catalog entries from the configured galleries and marks the ones
//! already installed under their name or alias.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;

use crate::cli::AvailableArgs;
use crate::GlobalOptions;
use berth::core::catalog::CatalogEntry;
use berth::ops::list_backends;
use berth::sources::{CatalogProvider, GalleryClient};

pub fn execute(args: AvailableArgs, opts: &GlobalOptions) -> Result<()> {
    let galleries = opts.ctx.require_galleries()?;
    let catalog = GalleryClient::new().list_entries(galleries)?;
    let installed = list_backends(opts.ctx.backends_path())?;

    let filter = args.filter.as_deref().map(str::to_lowercase);
    let mut shown = 0;

    for entry in catalog.iter() {
        if let Some(filter) = &filter {
            if !matches_filter(entry, filter) {
                continue;
            }
        }

        println!("{}", format_entry(entry, is_installed(entry, &installed)));
        if let Some(description) = &entry.description {
            println!("      {}", description);
        }
        shown += 1;
    }

    if shown == 0 {
        opts.shell.note("no matching backends in the configured galleries");
    }

    Ok(())
}

fn is_installed(entry: &CatalogEntry, installed: &BTreeMap<String, PathBuf>) -> bool {
    installed.contains_key(&entry.name)
        || entry.alias().is_some_and(|alias| installed.contains_key(alias))
}

fn matches_filter(entry: &CatalogEntry, filter: &str) -> bool {
    entry.name.to_lowercase().contains(filter)
        || entry
            .alias()
            .is_some_and(|alias| alias.to_lowercase().contains(filter))
        || entry.tags.iter().any(|tag| tag.to_lowercase().contains(filter))
}

fn format_entry(entry: &CatalogEntry, installed: bool) -> String {
    let marker = if installed { "*" } else { " " };
    let mut line = format!("{} {}@{}", marker, entry.gallery.name, entry.name);

    if let Some(alias) = entry.alias() {
        line.push_str(&format!(" (alias: {})", alias));
    }

    if entry.is_meta() {
        let targets: Vec<String> = entry
            .capabilities
            .iter()
            .map(|(capability, backend)| format!("{}={}", capability, backend))
            .collect();
        line.push_str(&format!(" [meta: {}]", targets.join(", ")));
    }

    if let Some(license) = &entry.license {
        line.push_str(&format!(" [{}]", license));
    }

    line
}
