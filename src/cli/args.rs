//! Command line argument definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Media Collector - Match, describe and file movies, shows and music videos
#[derive(Parser, Debug)]
#[command(name = "media-collector")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: <config dir>/media_collector/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Skip preflight checks
    #[arg(long, global = true)]
    pub skip_preflight: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scan, watch and dispatch pipelines (default)
    Run,

    /// Show how a file or folder name is classified
    Parse {
        /// File or folder to parse
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// How to interpret the entry
        #[arg(short, long, value_enum, default_value_t = EntryKind::Show)]
        kind: EntryKind,
    },

    /// Search TMDB the way the pipeline does and print the ranking
    Search {
        /// Title to search for (Chinese and/or original)
        #[arg(value_name = "TITLE")]
        title: String,

        /// Release or first-air year
        #[arg(short, long)]
        year: Option<u16>,

        /// Index to search
        #[arg(short, long, value_enum, default_value_t = SearchTarget::Movie)]
        kind: SearchTarget,
    },
}

/// Entry interpretation for `parse`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Movie,
    Show,
    MusicVideo,
}

/// Index for `search`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchTarget {
    Movie,
    Show,
}
