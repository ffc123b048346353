//! berth CLI - install and manage inference backends

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use berth::util::context::{parse_gallery_arg, GlobalContext};
use berth::util::Shell;
use cli::{Cli, Commands};

/// Options shared by every command.
pub struct GlobalOptions {
    pub shell: Shell,
    pub ctx: GlobalContext,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging; RUST_LOG wins when set
    let default_filter = if cli.verbose { "berth=debug" } else { "berth=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color);
    let opts = || -> Result<GlobalOptions> {
        Ok(GlobalOptions {
            shell: shell.clone(),
            ctx: load_context(
                cli.config.as_deref(),
                cli.backends_path.as_deref(),
                cli.capability.as_deref(),
                &cli.galleries,
            )?,
        })
    };

    // Execute command
    match cli.command {
        Commands::Install(args) => commands::install::execute(args, &opts()?),
        Commands::Remove(args) => commands::remove::execute(args, &opts()?),
        Commands::List(args) => commands::list::execute(args, &opts()?),
        Commands::Available(args) => commands::available::execute(args, &opts()?),
        Commands::Probe => commands::probe::execute(&opts()?),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Build the context: flags and environment over the config file.
fn load_context(
    config: Option<&Path>,
    backends_path: Option<&Path>,
    capability: Option<&str>,
    galleries: &[String],
) -> Result<GlobalContext> {
    let mut ctx = GlobalContext::load(config)?.with_capability(capability.map(str::to_string));

    if let Some(path) = backends_path {
        ctx = ctx.with_backends_path(path.to_path_buf());
    }

    if !galleries.is_empty() {
        let galleries = galleries
            .iter()
            .enumerate()
            .map(|(i, value)| parse_gallery_arg(value, i))
            .collect();
        ctx = ctx.with_galleries(galleries);
    }

    Ok(ctx)
}
