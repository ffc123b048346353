//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

use berth::util::shell::ColorChoice;

/// berth - install and manage inference backends from galleries
#[derive(Parser)]
#[command(name = "berth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto", value_parser = parse_color)]
    pub color: ColorChoice,

    /// Directory backends are installed into
    #[arg(long, global = true, env = "BERTH_BACKENDS_PATH")]
    pub backends_path: Option<PathBuf>,

    /// Config file to use instead of the global one
    #[arg(long, global = true, env = "BERTH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Capability to assume instead of probing the host (e.g. nvidia, cpu)
    #[arg(long, global = true, env = "BERTH_CAPABILITY")]
    pub capability: Option<String>,

    /// Gallery index as NAME=URL or URL (repeatable, replaces configured galleries)
    #[arg(long = "gallery", global = true)]
    pub galleries: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

fn parse_color(s: &str) -> Result<ColorChoice, String> {
    s.parse()
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install a backend from the configured galleries
    Install(InstallArgs),

    /// Remove an installed backend by name or alias
    Remove(RemoveArgs),

    /// List installed backends
    List(ListArgs),

    /// List backends available in the configured galleries
    Available(AvailableArgs),

    /// Show the capability used to pick meta-backends
    Probe,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct InstallArgs {
    /// Backend names, optionally qualified as GALLERY@NAME
    #[arg(required = true)]
    pub names: Vec<String>,
}

#[derive(Args)]
pub struct RemoveArgs {
    /// Backend names or aliases to remove
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Show what would be removed without removing it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Show installation details for each backend
    #[arg(short = 'l', long)]
    pub long: bool,
}

#[derive(Args)]
pub struct AvailableArgs {
    /// Only show entries whose name, alias or tags contain this text
    pub filter: Option<String>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: CompletionShell,
}
