//! `berth install` command

use anyhow::{bail, Context, Result};

use crate::cli::InstallArgs;
use crate::GlobalOptions;
use berth::core::errors::BackendError;
use berth::ops::install_by_name;
use berth::sources::{CapabilityProbe, CatalogProvider, GalleryClient, TarballFetcher};
use berth::util::shell::Status;

pub fn execute(args: InstallArgs, opts: &GlobalOptions) -> Result<()> {
    let shell = &opts.shell;
    let ctx = &opts.ctx;

    let galleries = ctx.require_galleries()?;
    shell.status(
        Status::Resolving,
        format!("{} from {} galleries", args.names.join(", "), galleries.len()),
    );
    let catalog = GalleryClient::new().list_entries(galleries)?;

    let profile = ctx.probe().current_profile();
    let fetcher = TarballFetcher::new();
    let base = ctx.backends_path();

    for name in &args.names {
        shell.status(Status::Installing, name);

        let mut progress = shell.progress(name);
        let result = install_by_name(
            base,
            name,
            &catalog,
            profile.as_ref(),
            &fetcher,
            &mut |stage: &str, _artifact: &str, message: &str, fraction: f64| {
                progress.update(stage, message, fraction)
            },
        );
        progress.finish();

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e @ BackendError::NoCapabilityProfile { .. }) => {
                bail!("{}\nhelp: pass --capability or set BERTH_CAPABILITY", e);
            }
            Err(e) => return Err(e).with_context(|| format!("failed to install `{}`", name)),
        };

        if outcome.is_meta() {
            shell.status(
                Status::Installed,
                format!("{} (using {})", outcome.requested, outcome.backend),
            );
        } else {
            shell.status(Status::Installed, &outcome.backend);
        }
        tracing::debug!(path = %outcome.path.display(), "backend installed");
    }

    Ok(())
}
