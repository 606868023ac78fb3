//! Media-related data models.
//!
//! Every record here is produced by one scan or watch event and consumed by one
//! pipeline worker. The only state that outlives a cycle is the sidecar cache
//! under each item's `tmdb/` directory.

use crate::utils::fs::strip_extension;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Name of the per-item cache directory.
pub const CACHE_DIR_NAME: &str = "tmdb";

/// Media category, one pipeline each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movies,
    Shows,
    MusicVideos,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Movies => write!(f, "movies"),
            MediaKind::Shows => write!(f, "shows"),
            MediaKind::MusicVideos => write!(f, "music_videos"),
        }
    }
}

/// Identity inferred from a raw name by the classifier chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NameInfo {
    /// Accumulated title, alias removed.
    pub title: String,
    /// Text after ` AKA `.
    pub alias_title: String,
    /// Leading CJK words of the title.
    pub chs_title: String,
    /// Remainder of the title.
    pub eng_title: String,
    /// Release year, 0 when unknown.
    pub year: u16,
    /// Collection marker such as `2010-2015`.
    pub year_range: String,
    /// Collection marker such as `S01-S03`.
    pub season_range: String,
    /// Quality tag, e.g. `1080p`.
    pub format: String,
    /// Source tag, e.g. `WEB-DL`.
    pub source: String,
    /// Studio tag, e.g. `NETFLIX`.
    pub studio: String,
}

impl NameInfo {
    pub fn year_opt(&self) -> Option<u16> {
        (self.year > 0).then_some(self.year)
    }
}

/// Physical layout of a movie directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscLayout {
    /// Plain folder, no recognised layout.
    Folder,
    /// Contains a `BDMV` (or `CERTIFICATE`) directory.
    BluRay,
    /// Contains both `AUDIO_TS` and `VIDEO_TS`.
    Dvd,
    /// Exactly one playable video file, by name.
    SingleFile(String),
}

/// A movie folder or a bare movie file under a movie root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDir {
    /// Directory containing the entry.
    pub dir: PathBuf,
    /// Entry name as found on disk (temporary suffix removed).
    pub origin_title: String,
    pub name: NameInfo,
    /// The entry is a video file rather than a folder.
    pub is_file: bool,
    /// Video extension when `is_file`.
    pub suffix: String,
    pub layout: DiscLayout,
    /// Provider id from `id.txt`, 0 when unresolved.
    pub movie_id: u64,
}

impl MovieDir {
    pub fn full_dir(&self) -> PathBuf {
        self.dir.join(&self.origin_title)
    }

    /// Cache directory; bare files share their parent's.
    pub fn cache_dir(&self) -> PathBuf {
        if self.is_file {
            self.dir.join(CACHE_DIR_NAME)
        } else {
            self.full_dir().join(CACHE_DIR_NAME)
        }
    }

    /// Directory holding `id.txt`; bare files get a subfolder named after their stem.
    pub fn id_dir(&self) -> PathBuf {
        if self.is_file {
            self.cache_dir().join(self.file_stem())
        } else {
            self.cache_dir()
        }
    }

    /// Entry name without the video extension.
    pub fn file_stem(&self) -> String {
        strip_extension(&self.origin_title, &self.suffix)
    }

    /// Path prefix used for `<prefix>.nfo`, `<prefix>-poster.jpg` and friends.
    ///
    /// `None` means the folder-wide names (`movie.nfo`, `poster.jpg`) apply.
    pub fn artwork_prefix(&self) -> Option<PathBuf> {
        if self.is_file {
            return Some(self.dir.join(self.file_stem()));
        }
        match &self.layout {
            DiscLayout::SingleFile(video) => {
                let suffix = crate::utils::fs::video_suffix(video).unwrap_or_default();
                Some(self.full_dir().join(strip_extension(video, &suffix)))
            }
            _ => None,
        }
    }

    /// Artwork file such as `poster.jpg`, prefixed when the movie has a video name.
    pub fn artwork_file(&self, name: &str) -> PathBuf {
        match self.artwork_prefix() {
            Some(prefix) => with_extra_suffix(&prefix, &format!("-{}", name)),
            None => self.full_dir().join(name),
        }
    }

    /// Location of the NFO for the given mode.
    pub fn nfo_file(&self, mode: u8) -> Option<PathBuf> {
        if self.is_file {
            return Some(self.dir.join(format!("{}.nfo", self.file_stem())));
        }
        match &self.layout {
            DiscLayout::BluRay => {
                let bdmv = self.full_dir().join("BDMV");
                if bdmv.join("MovieObject.bdmv").exists() {
                    Some(bdmv.join("MovieObject.nfo"))
                } else {
                    Some(bdmv.join("index.nfo"))
                }
            }
            DiscLayout::Dvd => Some(self.full_dir().join("VIDEO_TS").join("VIDEO_TS.nfo")),
            _ if mode == 1 => Some(self.full_dir().join("movie.nfo")),
            _ => self
                .artwork_prefix()
                .map(|prefix| with_extra_suffix(&prefix, ".nfo")),
        }
    }
}

/// A show directory (one season, or a collection of seasons).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowDir {
    /// Directory containing the show directory.
    pub dir: PathBuf,
    /// Directory name as found on disk.
    pub origin_title: String,
    pub name: NameInfo,
    /// Season number; 0 only for year-range collections.
    pub season: u32,
    /// Holds several seasons or years.
    pub is_collection: bool,
    /// 0 disabled, 1 auto-sequential, >=2 fixed multiplier.
    pub part_mode: u32,
    /// Provider id, 0 when unresolved.
    pub tv_id: u64,
    /// Episode group id, empty when unset.
    pub group_id: String,
}

impl ShowDir {
    pub fn full_dir(&self) -> PathBuf {
        self.dir.join(&self.origin_title)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.full_dir().join(CACHE_DIR_NAME)
    }

    pub fn nfo_file(&self) -> PathBuf {
        self.full_dir().join("tvshow.nfo")
    }
}

/// Composite (season, episode) key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeasonEpisode {
    pub season: u32,
    pub episode: u32,
}

impl SeasonEpisode {
    pub fn new(season: u32, episode: u32) -> Self {
        Self { season, episode }
    }
}

impl fmt::Display for SeasonEpisode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{:02}e{:02}", self.season, self.episode)
    }
}

/// One playable episode inside a show directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeFile {
    /// Owning show directory.
    pub dir: PathBuf,
    /// File name (temporary suffix removed).
    pub origin_title: String,
    pub suffix: String,
    pub season: u32,
    pub episode: u32,
    /// Part number from `PartN`, 0 when absent.
    pub part: u32,
    pub tv_id: u64,
}

impl EpisodeFile {
    pub fn key(&self) -> SeasonEpisode {
        SeasonEpisode::new(self.season, self.episode)
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.origin_title)
    }

    pub fn file_stem(&self) -> String {
        strip_extension(&self.origin_title, &self.suffix)
    }

    pub fn nfo_file(&self) -> PathBuf {
        self.dir.join(format!("{}.nfo", self.file_stem()))
    }

    pub fn thumb_file(&self) -> PathBuf {
        self.dir.join(format!("{}-thumb.jpg", self.file_stem()))
    }

    /// Per-episode cache written from an episode group.
    pub fn cache_file(&self) -> PathBuf {
        self.dir.join(CACHE_DIR_NAME).join(format!("{}.json", self.key()))
    }
}

/// One music video file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicVideo {
    /// Directory containing the file.
    pub dir: PathBuf,
    /// Configured root the file was found under.
    pub base_dir: PathBuf,
    pub origin_title: String,
    pub title: String,
    pub suffix: String,
}

impl MusicVideo {
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.origin_title)
    }

    pub fn file_stem(&self) -> String {
        strip_extension(&self.origin_title, &self.suffix)
    }

    pub fn nfo_file(&self) -> PathBuf {
        self.dir.join(format!("{}.nfo", self.file_stem()))
    }

    pub fn thumb_file(&self) -> PathBuf {
        self.dir.join(format!("{}-thumb.jpg", self.file_stem()))
    }

    pub fn probe_cache_file(&self) -> PathBuf {
        self.base_dir
            .join(CACHE_DIR_NAME)
            .join(format!("{}.json", self.file_stem()))
    }
}

/// First video stream of a probed file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoStream {
    pub codec: String,
    pub width: u32,
    pub height: u32,
    /// Display aspect ratio, e.g. `16:9`.
    pub aspect: String,
}

/// First audio stream of a probed file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioStream {
    pub codec: String,
    pub channels: u32,
    pub language: String,
}

/// Stream details of a music video, cached as `tmdb/<stem>.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeInfo {
    /// Duration in seconds.
    pub duration: f64,
    pub video: VideoStream,
    pub audio: AudioStream,
}

/// A classified filesystem entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Movie(MovieDir),
    Show(ShowDir),
    Episode(EpisodeFile),
    MusicVideo(MusicVideo),
}

fn with_extra_suffix(prefix: &Path, extra: &str) -> PathBuf {
    let mut s = prefix.as_os_str().to_os_string();
    s.push(extra);
    PathBuf::from(s)
}
