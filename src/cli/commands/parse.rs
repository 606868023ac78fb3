//! Parse command implementation.
//!
//! Prints what the classifier makes of a single entry, without touching
//! the network.

use crate::cli::args::EntryKind;
use crate::core::episodes::scan_show_files;
use crate::core::parser::NameParser;
use crate::models::config::Config;
use crate::models::media::{MediaKind, NameInfo, Record};
use colored::Colorize;
use std::path::Path;

impl From<EntryKind> for MediaKind {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Movie => MediaKind::Movies,
            EntryKind::Show => MediaKind::Shows,
            EntryKind::MusicVideo => MediaKind::MusicVideos,
        }
    }
}

pub fn parse(config: &Config, path: &Path, kind: EntryKind) -> anyhow::Result<()> {
    if !path.exists() {
        return Err(crate::Error::PathNotFound(path.display().to_string()).into());
    }

    let parser = NameParser::new(config);
    let Some(record) = parser.parse_entry(kind.into(), path) else {
        println!("{} {:?}", "Not recognised:".yellow().bold(), path);
        return Ok(());
    };

    println!("{}", "🔎 Parsed entry".bold().cyan());
    println!();

    match record {
        Record::Movie(movie) => {
            print_field("Kind", "movie");
            print_name(&movie.name);
            print_field("Layout", &format!("{:?}", movie.layout));
            if movie.movie_id > 0 {
                print_field("TMDB id", &movie.movie_id.to_string());
            }
        }
        Record::Show(show) => {
            print_field("Kind", if show.is_collection { "show collection" } else { "show" });
            print_name(&show.name);
            print_field("Season", &show.season.to_string());
            if show.part_mode > 0 {
                print_field("Part mode", &show.part_mode.to_string());
            }
            if show.tv_id > 0 {
                print_field("TMDB id", &show.tv_id.to_string());
            }
            if !show.group_id.is_empty() {
                print_field("Group", &show.group_id);
            }

            if !show.is_collection {
                let episodes = scan_show_files(&show)?;
                println!();
                println!("{} ({})", "Episodes".bold(), episodes.len());
                for (key, file) in &episodes {
                    println!("  {} {}", key.to_string().green(), file.origin_title);
                }
            }
        }
        Record::Episode(episode) => {
            print_field("Kind", "episode");
            print_field("Key", &episode.key().to_string());
        }
        Record::MusicVideo(video) => {
            print_field("Kind", "music video");
            print_field("Title", &video.title);
            print_field("Suffix", &video.suffix);
        }
    }

    Ok(())
}

fn print_name(name: &NameInfo) {
    print_field("Title", &name.title);
    print_field("Chinese", &name.chs_title);
    print_field("English", &name.eng_title);
    print_field("Alias", &name.alias_title);
    if let Some(year) = name.year_opt() {
        print_field("Year", &year.to_string());
    }
    print_field("Year range", &name.year_range);
    print_field("Season range", &name.season_range);
    print_field("Format", &name.format);
    print_field("Source", &name.source);
    print_field("Studio", &name.studio);
}

fn print_field(label: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    println!("  {:<14} {}", format!("{}:", label).bold(), value);
}
