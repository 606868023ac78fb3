//! Search command implementation.
//!
//! Runs the same query variants and ranking the pipeline uses for a title.

use crate::cli::args::SearchTarget;
use crate::core::matcher;
use crate::models::config::Config;
use crate::models::media::NameInfo;
use crate::models::search::SearchKind;
use crate::services::tmdb::TmdbClient;
use crate::utils::chinese::split_chs_eng_title;
use colored::Colorize;

/// Results shown per search.
const MAX_RESULTS: usize = 10;

pub async fn search(
    config: &Config,
    title: &str,
    year: Option<u16>,
    target: SearchTarget,
) -> anyhow::Result<()> {
    let (chs_title, eng_title) = split_chs_eng_title(title.trim());
    let name = NameInfo {
        title: title.trim().to_string(),
        chs_title,
        eng_title,
        year: year.unwrap_or(0),
        ..Default::default()
    };
    let kind = match target {
        SearchTarget::Movie => SearchKind::Movie,
        SearchTarget::Show => SearchKind::Tv,
    };

    println!("{}", "🔍 Searching TMDB...".bold().cyan());
    for variant in matcher::build_query_variants(&name) {
        match variant.year {
            Some(year) => println!("  {} {} ({})", "query".dimmed(), variant.title, year),
            None => println!("  {} {}", "query".dimmed(), variant.title),
        }
    }
    println!();

    let client = TmdbClient::from_config(&config.tmdb)?;
    let results = matcher::search_ranked(&client, kind, &name).await?;

    println!(
        "{} {} result(s)",
        "Found".green().bold(),
        results.len()
    );
    println!();

    for (i, result) in results.iter().take(MAX_RESULTS).enumerate() {
        let year = result
            .year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| "----".to_string());
        let marker = if i == 0 { "→".green().bold() } else { " ".normal() };
        println!(
            "{} {:>8}  {} ({})",
            marker,
            result.id.to_string().cyan(),
            result.name.bold(),
            year
        );
        if !result.original_name.is_empty() && result.original_name != result.name {
            println!("            {}", result.original_name.dimmed());
        }
        println!(
            "            vote {:.1}  popularity {:.1}{}",
            result.vote_average,
            result.popularity,
            if result.is_complete() { "" } else { "  (incomplete)" }
        );
    }

    Ok(())
}
