//! Centralized shell output and progress management.
//!
//! All user-facing CLI output goes through [`Shell`]:
//! - Status lines with a right-aligned, coloured status word
//! - Install progress bars (via indicatif) fed by fractional updates
//!
//! Status lines go to stderr; listings are printed to stdout by commands.

use std::fmt::Display;
use std::io::{self, IsTerminal};

use indicatif::{ProgressBar, ProgressStyle};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// --quiet: errors only, no progress
    Quiet,
    /// Default: status messages + progress bars
    #[default]
    Normal,
    /// --verbose: progress as plain lines instead of bars
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    /// Always use ANSI colors.
    Always,
    /// Never use ANSI colors.
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

/// Status types for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // Success statuses (green)
    Installed,
    Removed,
    Finished,

    // In-progress statuses (cyan)
    Resolving,
    Installing,
    Removing,

    // Info statuses (blue)
    Info,

    // Warning statuses (yellow)
    Warning,

    // Error status (red)
    Error,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Installed => "Installed",
            Status::Removed => "Removed",
            Status::Finished => "Finished",
            Status::Resolving => "Resolving",
            Status::Installing => "Installing",
            Status::Removing => "Removing",
            Status::Info => "Info",
            Status::Warning => "Warning",
            Status::Error => "error",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Installed | Status::Removed | Status::Finished => "\x1b[1;32m",
            Status::Resolving | Status::Installing | Status::Removing => "\x1b[1;36m",
            Status::Info => "\x1b[1;34m",
            Status::Warning => "\x1b[1;33m",
            Status::Error => "\x1b[1;31m",
        }
    }
}

/// Width status words are right-aligned to.
const STATUS_WIDTH: usize = 12;

/// Central shell for all CLI output.
#[derive(Debug, Clone)]
pub struct Shell {
    verbosity: Verbosity,
    use_color: bool,
}

impl Shell {
    pub fn new(verbosity: Verbosity, color: ColorChoice) -> Self {
        let use_color = match color {
            ColorChoice::Auto => io::stderr().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };

        Shell {
            verbosity,
            use_color,
        }
    }

    /// Create a shell from CLI flags. Quiet wins over verbose.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice) -> Self {
        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };

        Shell::new(verbosity, color)
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Print a status message.
    ///
    /// Format: `{status:>12} {message}`. In quiet mode only errors print.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_quiet() && status != Status::Error {
            return;
        }

        eprintln!("{} {}", self.format_status(status), msg);
    }

    /// Print an info message.
    pub fn note(&self, msg: impl Display) {
        self.status(Status::Info, msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: impl Display) {
        self.status(Status::Error, msg);
    }

    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();

        if self.use_color {
            format!(
                "{}{:>width$}\x1b[0m",
                status.color_code(),
                text,
                width = STATUS_WIDTH
            )
        } else {
            format!("{:>width$}", text, width = STATUS_WIDTH)
        }
    }

    /// Create a progress bar driven by `[0, 1]` fractions.
    ///
    /// Quiet mode shows nothing; verbose mode prints stage changes as lines.
    pub fn progress(&self, msg: impl Display) -> Progress {
        let pb = match self.verbosity {
            Verbosity::Normal if io::stderr().is_terminal() => {
                let pb = ProgressBar::new(Progress::STEPS);
                // Keeps the default style if the template fails to parse
                if let Ok(style) = ProgressStyle::default_bar()
                    .template("{spinner:.green} {prefix} [{bar:40.cyan/blue}] {percent:>3}% {msg}")
                {
                    pb.set_style(style.progress_chars("#>-"));
                }
                pb.set_prefix(msg.to_string());
                Some(pb)
            }
            _ => None,
        };

        Progress {
            pb,
            verbose: self.is_verbose(),
            label: msg.to_string(),
            stage: String::new(),
            fraction: 0.0,
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(Verbosity::Normal, ColorChoice::Auto)
    }
}

/// Progress bar wrapper that respects shell verbosity.
pub struct Progress {
    pb: Option<ProgressBar>,
    verbose: bool,
    label: String,
    stage: String,
    fraction: f64,
}

impl Progress {
    const STEPS: u64 = 1000;

    /// Report progress. Fractions are clamped to `[0, 1]` and never go back.
    pub fn update(&mut self, stage: &str, message: &str, fraction: f64) {
        let fraction = fraction.clamp(0.0, 1.0).max(self.fraction);
        self.fraction = fraction;

        if let Some(pb) = &self.pb {
            pb.set_position((fraction * Self::STEPS as f64).round() as u64);
            pb.set_message(format!("{} {}", stage, message));
        }

        if self.verbose && stage != self.stage {
            eprintln!("  {} {}", self.label, stage);
        }
        self.stage = stage.to_string();
    }

    /// Last reported fraction.
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Finish the progress bar and clear it.
    pub fn finish(&self) {
        if let Some(pb) = &self.pb {
            pb.finish_and_clear();
        }
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        self.finish();
    }
}
