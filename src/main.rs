//! Media Collector CLI
//!
//! Watches movie, show and music video folders, matches them against TMDB and
//! writes the NFO files and artwork a media center needs.

use clap::Parser;
use media_collector::cli::{
    args::{Cli, Commands},
    commands::{parse, run, search},
};
use media_collector::models::config::{load_config, Config};
use media_collector::preflight;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    // Initialize logging
    init_logging(cli.verbose, &config.log.level);

    // Run the appropriate command
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            if !cli.skip_preflight {
                run_preflight_checks(&config).await?;
            }
            run::run(config).await?;
        }

        Commands::Parse { path, kind } => {
            parse::parse(&config, &path, kind)?;
        }

        Commands::Search { title, year, kind } => {
            search::search(&config, &title, year, kind).await?;
        }
    }

    Ok(())
}

/// Initialize the logging system.
///
/// `RUST_LOG` wins over both the config level and `--verbose`.
fn init_logging(verbose: bool, level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if verbose {
        "media_collector=debug".to_string()
    } else {
        format!("media_collector={}", level)
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

/// Run preflight checks and exit if any fail.
async fn run_preflight_checks(config: &Config) -> anyhow::Result<()> {
    use colored::Colorize;

    println!("{}", "Running preflight checks...".bold());
    println!();

    let results = preflight::run_preflight_checks(config).await?;
    preflight::print_results(&results);

    println!();

    if !preflight::all_passed(&results) {
        anyhow::bail!("Preflight checks failed. Fix the issues above and try again.");
    }

    Ok(())
}
