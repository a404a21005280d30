use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

use crate::config::OutputFormat;

/// Command-line arguments for `classmap`.
#[derive(Parser, Debug)]
#[clap(
    version = "0.1.0",
    about = "Extract classes, endpoints and relationships from Java sources",
    long_about = None,
    name = "classmap"
)]
pub struct ClassmapArgs {
    /// Verbose logging (debug level).
    #[clap(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors.
    #[clap(short, long, global = true)]
    pub quiet: bool,

    #[clap(subcommand)]
    pub command: ClassmapSubCommand,
}

impl ClassmapArgs {
    /// Maximum log level selected by `-v` / `-q`.
    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::WARN
        } else {
            Level::INFO
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub enum ClassmapSubCommand {
    /// Scan a source tree and emit the project structure.
    Scan(ScanArgs),
    /// Extract a single file and print its class record.
    Inspect(InspectArgs),
}

/// Arguments for the `scan` subcommand
#[derive(Parser, Debug, Clone)]
pub struct ScanArgs {
    /// Root directory of the source tree.
    pub root: PathBuf,

    /// Output format; overrides the configured one.
    #[clap(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Indent JSON output.
    #[clap(long)]
    pub pretty: bool,

    /// Write output to a file instead of stdout.
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file to use instead of ~/.config/classmap/config.toml.
    #[clap(long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `inspect` subcommand
#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    /// Source file to extract.
    pub file: PathBuf,

    /// Indent JSON output.
    #[clap(long)]
    pub pretty: bool,
}
