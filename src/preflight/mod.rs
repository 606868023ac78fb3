//! Preflight checks module.

mod ffprobe;
mod kodi;
mod tmdb;

use crate::models::config::Config;
use crate::Result;
use colored::Colorize;

/// Result of a preflight check.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub success: bool,
    pub message: String,
    pub hint: Option<String>,
}

impl CheckResult {
    pub fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            success: true,
            message: message.to_string(),
            hint: None,
        }
    }

    pub fn fail(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }
}

/// Run the checks relevant to the configured roots and collaborators.
pub async fn run_preflight_checks(config: &Config) -> Result<Vec<CheckResult>> {
    let mut results = Vec::new();

    // TMDB is needed for movies and shows
    let collector = &config.collector;
    if !collector.movies_dir.is_empty() || !collector.shows_dir.is_empty() {
        results.push(tmdb::check(&config.tmdb).await);
    }

    // ffprobe/ffmpeg are needed for music videos
    if !collector.music_videos_dir.is_empty() {
        results.push(ffprobe::check("ffprobe", &config.ffmpeg.ffprobe_path));
        results.push(ffprobe::check("ffmpeg", &config.ffmpeg.ffmpeg_path));
    }

    if config.kodi.enable {
        results.push(kodi::check(&config.kodi).await);
    }

    Ok(results)
}

/// Print preflight check results.
pub fn print_results(results: &[CheckResult]) {
    for result in results {
        if result.success {
            println!(
                "{} {}: {}",
                "[OK]".green(),
                result.name.bold(),
                result.message
            );
        } else {
            println!(
                "{} {}: {}",
                "[FAIL]".red(),
                result.name.bold(),
                result.message
            );
            if let Some(ref hint) = result.hint {
                println!("  {} {}", "->".yellow(), hint);
            }
        }
    }
}

/// Check if all preflight checks passed.
pub fn all_passed(results: &[CheckResult]) -> bool {
    results.iter().all(|r| r.success)
}
