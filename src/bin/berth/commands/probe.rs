//! `berth probe` command
//!
//! Prints the capability key meta-backends are resolved with.

use anyhow::{bail, Result};

use crate::GlobalOptions;
use berth::sources::CapabilityProbe;

pub fn execute(opts: &GlobalOptions) -> Result<()> {
    let Some(profile) = opts.ctx.probe().current_profile() else {
        bail!(
            "could not determine the host capability\n\
             help: pass --capability or set BERTH_CAPABILITY"
        );
    };

    if opts.ctx.capability().is_some() {
        opts.shell.note("capability set by override");
    }
    println!("{}", profile);

    Ok(())
}
