use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

#[derive(Parser)]
#[command(
    name = "stache",
    about = "Compile Mustache layouts, partials and pages into static HTML",
    version
)]
pub struct Cli {
    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<LevelFilter>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where templates are read from.
#[derive(Args, Clone, Default)]
pub struct SourceArgs {
    /// Path to stache.toml (default: ./stache.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Source root holding layouts/, partials/ and pages/
    #[arg(long)]
    pub src: Option<PathBuf>,

    /// Template file extension, without the dot (can be repeated)
    #[arg(long = "type", value_name = "EXT")]
    pub types: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render every page into the dist folder
    Build {
        /// Targets to build (default: all configured targets)
        targets: Vec<String>,

        #[command(flatten)]
        source: SourceArgs,

        /// Output folder
        #[arg(long)]
        dist: Option<PathBuf>,

        /// Set a global render variable (can be repeated: -g key=value)
        #[arg(short, long = "global", value_name = "KEY=VALUE")]
        globals: Vec<String>,

        /// Show the pages that would be written without writing anything
        #[arg(long)]
        dry_run: bool,

        /// With --dry-run, print the rendered content of every page
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate templates, data files and layout references
    Check {
        /// Target to check (default: the top-level options)
        target: Option<String>,

        #[command(flatten)]
        source: SourceArgs,
    },
}
