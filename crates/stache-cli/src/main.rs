mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use log::LevelFilter;

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    // Recorded warnings are printed by the commands, so the logger only adds
    // them when asked for with --log.
    env_logger::Builder::new()
        .filter_level(cli.log.unwrap_or(LevelFilter::Error))
        .parse_default_env()
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Build {
            targets,
            source,
            dist,
            globals,
            dry_run,
            verbose,
        } => commands::build::run(targets, source, dist, globals, dry_run, verbose),
        Commands::Check { target, source } => commands::check::run(target, source),
    }
}
