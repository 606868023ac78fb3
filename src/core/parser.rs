//! Name parser module.
//!
//! Turns a filesystem entry into a typed record:
//! - movie folders and bare movie files
//! - show directories (single seasons and collections)
//! - music video files
//!
//! Names are cleaned (temporary suffixes, `[...]` segments, Chinese
//! season/episode wording) before the classifier chain sees them. Sidecar
//! files under the entry's `tmdb/` directory override what the name says.

use crate::core::classifier::{Classifier, NameTarget};
use crate::core::patterns;
use crate::core::sidecar::{self, GROUP_FILE, ID_FILE, PART_FILE, SEASON_FILE};
use crate::models::config::Config;
use crate::models::media::{DiscLayout, MediaKind, MovieDir, MusicVideo, Record, ShowDir};
use crate::utils::fs::{filter_tmp_suffix, strip_extension, video_suffix};
use std::path::Path;

/// Parser for movie, show and music video entries.
#[derive(Debug, Clone, Default)]
pub struct NameParser {
    classifier: Classifier,
    skip_folders: Vec<String>,
}

impl NameParser {
    pub fn new(config: &Config) -> Self {
        Self {
            classifier: Classifier::new(&config.classify),
            skip_folders: config.collector.skip_folders.clone(),
        }
    }

    /// Hidden entries and configured skip-list names are never parsed.
    pub fn is_skipped(&self, name: &str) -> bool {
        name.starts_with('.') || self.skip_folders.iter().any(|s| s == name)
    }

    /// Skip-list check by the containing directory's name or the entry's own.
    pub fn skip_folder(&self, parent: &Path, name: &str) -> bool {
        let base = parent
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.skip_folders.iter().any(|s| *s == base || s == name)
    }

    /// Parse a movie folder or a bare movie file.
    pub fn parse_movie_entry(&self, dir: &Path, name: &str, is_dir: bool) -> Option<MovieDir> {
        let file_name = filter_tmp_suffix(name);
        if self.is_skipped(&file_name) {
            tracing::debug!("Skipping movie entry: {}", name);
            return None;
        }

        let mut movie_name = patterns::filter_optionals(&file_name);
        let mut suffix = String::new();
        if !is_dir {
            suffix = video_suffix(&movie_name)?;
            movie_name = strip_extension(&movie_name, &suffix);
        }

        let classified = self.classifier.classify_name(&movie_name, NameTarget::Movie);
        if classified.name.title.is_empty() {
            tracing::warn!("Discarding {:?}: parsed title is empty", dir.join(name));
            return None;
        }

        let mut movie = MovieDir {
            dir: dir.to_path_buf(),
            origin_title: file_name,
            name: classified.name,
            is_file: !is_dir,
            suffix,
            layout: DiscLayout::Folder,
            movie_id: 0,
        };

        movie.movie_id = sidecar::read_number(&movie.id_dir(), ID_FILE).unwrap_or(0);
        if is_dir {
            movie.layout = detect_layout(&movie.full_dir());
        }

        Some(movie)
    }

    /// Parse a show directory.
    pub fn parse_show_dir(&self, dir: &Path, name: &str) -> Option<ShowDir> {
        if self.is_skipped(name) {
            tracing::debug!("Skipping show entry: {}", name);
            return None;
        }

        let mut show_name = patterns::filter_optionals(name);
        show_name = patterns::season_correcting(&show_name);
        if let Some(span) = patterns::sub_episodes(&show_name).map(str::to_string) {
            show_name = show_name.replacen(&span, "", 1);
        }

        let is_collection = patterns::is_collection(name) || patterns::is_collection(&show_name);
        let year_range = patterns::year_range(&show_name)
            .map(str::to_string)
            .unwrap_or_default();
        if !year_range.is_empty() {
            show_name = show_name.replacen(&year_range, "", 1);
        }
        let season_range = patterns::season_range(&show_name)
            .map(str::to_string)
            .unwrap_or_default();

        let classified = self
            .classifier
            .classify_name(&show_name, NameTarget::Show { is_collection });
        if classified.name.title.is_empty() {
            tracing::warn!("Discarding {:?}: parsed title is empty", dir.join(name));
            return None;
        }

        let mut info = classified.name;
        info.year_range = year_range;
        info.season_range = season_range;

        let mut show = ShowDir {
            dir: dir.to_path_buf(),
            origin_title: name.to_string(),
            name: info,
            season: classified.season.unwrap_or(0),
            is_collection,
            part_mode: 0,
            tv_id: 0,
            group_id: String::new(),
        };

        let cache = show.cache_dir();
        if let Some(season) = read_u32(&cache, SEASON_FILE) {
            show.season = season;
        }
        if show.season == 0 && show.name.year_range.is_empty() {
            show.season = 1;
        }
        show.tv_id = sidecar::read_number(&cache, ID_FILE).unwrap_or(0);
        show.group_id = sidecar::read_text(&cache, GROUP_FILE).unwrap_or_default();
        show.part_mode = read_u32(&cache, PART_FILE).unwrap_or(0);

        Some(show)
    }

    /// Parse a music video file found under `base_dir`.
    pub fn parse_music_video(&self, base_dir: &Path, dir: &Path, name: &str) -> Option<MusicVideo> {
        let file_name = filter_tmp_suffix(name);
        if file_name.starts_with('.') {
            return None;
        }

        let suffix = video_suffix(&file_name)?;
        let title = patterns::filter_optionals(&strip_extension(&file_name, &suffix))
            .trim()
            .to_string();
        if title.is_empty() {
            tracing::warn!("Discarding {:?}: parsed title is empty", dir.join(name));
            return None;
        }

        Some(MusicVideo {
            dir: dir.to_path_buf(),
            base_dir: base_dir.to_path_buf(),
            origin_title: file_name,
            title,
            suffix,
        })
    }

    /// Parse an arbitrary path as the given kind.
    pub fn parse_entry(&self, kind: MediaKind, path: &Path) -> Option<Record> {
        let dir = path.parent()?;
        let name = path.file_name()?.to_str()?;

        match kind {
            MediaKind::Movies => self
                .parse_movie_entry(dir, name, path.is_dir())
                .map(Record::Movie),
            MediaKind::Shows if path.is_dir() => self.parse_show_dir(dir, name).map(Record::Show),
            MediaKind::Shows => None,
            MediaKind::MusicVideos => self
                .parse_music_video(dir, dir, name)
                .map(Record::MusicVideo),
        }
    }
}

fn read_u32(dir: &Path, name: &str) -> Option<u32> {
    sidecar::read_number(dir, name).and_then(|n| u32::try_from(n).ok())
}

/// Inspect a movie folder's immediate children.
///
/// A Blu-ray marker wins over a DVD pair, which wins over a lone video file.
pub fn detect_layout(dir: &Path) -> DiscLayout {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return DiscLayout::Folder;
    };

    let mut bluray = false;
    let mut audio_ts = false;
    let mut video_ts = false;
    let mut videos = Vec::new();

    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

        match name.as_str() {
            "BDMV" if is_dir => bluray = true,
            "CERTIFICATE" => bluray = true,
            "AUDIO_TS" if is_dir => audio_ts = true,
            "VIDEO_TS" if is_dir => video_ts = true,
            _ if !is_dir && video_suffix(&name).is_some() => videos.push(name),
            _ => {}
        }
    }

    if bluray {
        DiscLayout::BluRay
    } else if audio_ts && video_ts {
        DiscLayout::Dvd
    } else if videos.len() == 1 {
        DiscLayout::SingleFile(videos.remove(0))
    } else {
        DiscLayout::Folder
    }
}
