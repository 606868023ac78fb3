//! Run command implementation.

use crate::core::context::PipelineContext;
use crate::core::pipeline;
use crate::models::config::Config;
use colored::Colorize;

/// Start every configured pipeline and block until one of them stops.
pub async fn run(config: Config) -> anyhow::Result<()> {
    print_roots("Movies", &config.collector.movies_dir);
    print_roots("Shows", &config.collector.shows_dir);
    print_roots("Music videos", &config.collector.music_videos_dir);
    println!();

    let ctx = PipelineContext::from_config(config)?;
    pipeline::run_collector(ctx).await?;

    Ok(())
}

fn print_roots(label: &str, roots: &[std::path::PathBuf]) {
    if roots.is_empty() {
        println!("  {} {}", format!("{}:", label).bold(), "(none)".dimmed());
        return;
    }
    for root in roots {
        println!("  {} {}", format!("{}:", label).bold(), root.display());
    }
}
