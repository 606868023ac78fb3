//! Directory scanner module.
//!
//! Full rescans of the configured roots. Movies and shows are found one level
//! below a root (movies also inside year-range collection folders); music
//! videos are found at any depth. Every scan also reports the directories the
//! watcher should subscribe to.

use crate::core::parser::NameParser;
use crate::core::patterns;
use crate::models::media::{MovieDir, MusicVideo, ShowDir};
use crate::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Result of scanning one root.
#[derive(Debug)]
pub struct ScanResult<T> {
    /// Parsed candidates, in directory order.
    pub items: Vec<T>,
    /// Directories discovered along the way.
    pub watch_dirs: Vec<PathBuf>,
}

impl<T> Default for ScanResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            watch_dirs: Vec::new(),
        }
    }
}

/// A directory entry as seen by the scanner.
struct Entry {
    name: String,
    is_dir: bool,
}

/// Sorted immediate children of a directory.
fn list_entries(dir: &Path) -> Result<Vec<Entry>> {
    let mut entries: Vec<Entry> = std::fs::read_dir(dir)?
        .flatten()
        .map(|e| Entry {
            name: e.file_name().to_string_lossy().to_string(),
            is_dir: e.file_type().map(|t| t.is_dir()).unwrap_or(false),
        })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Missing roots scan as empty, like a root that has not been mounted yet.
fn root_exists(root: &Path) -> bool {
    if root.is_dir() {
        return true;
    }
    tracing::warn!("Root {:?} is not an accessible directory", root);
    false
}

/// Scan a movie root, descending into year-range collections.
pub fn scan_movies(parser: &NameParser, root: &Path) -> Result<ScanResult<MovieDir>> {
    let mut result = ScanResult::default();
    if !root_exists(root) {
        return Ok(result);
    }
    result.watch_dirs.push(root.to_path_buf());
    scan_movie_dir(parser, root, &mut result)?;
    Ok(result)
}

fn scan_movie_dir(parser: &NameParser, dir: &Path, result: &mut ScanResult<MovieDir>) -> Result<()> {
    for entry in list_entries(dir)? {
        if entry.is_dir && parser.skip_folder(dir, &entry.name) {
            continue;
        }

        let path = dir.join(&entry.name);
        if entry.is_dir && patterns::year_range(&entry.name).is_some() {
            result.watch_dirs.push(path.clone());
            if let Err(e) = scan_movie_dir(parser, &path, result) {
                tracing::error!("Failed to scan collection {:?}: {}", path, e);
            }
            continue;
        }

        if let Some(movie) = parser.parse_movie_entry(dir, &entry.name, entry.is_dir) {
            if entry.is_dir {
                result.watch_dirs.push(path);
            }
            result.items.push(movie);
        }
    }
    Ok(())
}

/// Scan a show root: every child directory is a show directory.
pub fn scan_shows(parser: &NameParser, root: &Path) -> Result<ScanResult<ShowDir>> {
    let mut result = ScanResult::default();
    if !root_exists(root) {
        return Ok(result);
    }
    result.watch_dirs.push(root.to_path_buf());

    for show in scan_show_children(parser, root)? {
        result.watch_dirs.push(show.full_dir());
        result.items.push(show);
    }
    Ok(result)
}

/// Child directories of a collection, inheriting its provider id.
pub fn scan_collection(parser: &NameParser, collection: &ShowDir) -> Result<Vec<ShowDir>> {
    let mut seasons = scan_show_children(parser, &collection.full_dir())?;
    for season in &mut seasons {
        season.tv_id = collection.tv_id;
    }
    Ok(seasons)
}

fn scan_show_children(parser: &NameParser, dir: &Path) -> Result<Vec<ShowDir>> {
    Ok(list_entries(dir)?
        .into_iter()
        .filter(|entry| entry.is_dir && !parser.skip_folder(dir, &entry.name))
        .filter_map(|entry| parser.parse_show_dir(dir, &entry.name))
        .collect())
}

/// Recursively scan a music video root.
pub fn scan_music_videos(parser: &NameParser, root: &Path) -> Result<ScanResult<MusicVideo>> {
    let mut result = ScanResult::default();
    if !root_exists(root) {
        return Ok(result);
    }

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            let parent = e.path().parent().unwrap_or(root);
            !name.starts_with('.') && !parser.skip_folder(parent, &name)
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Failed to read entry under {:?}: {}", root, e);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            result.watch_dirs.push(entry.path().to_path_buf());
            continue;
        }

        let Some(dir) = entry.path().parent() else {
            continue;
        };
        let name = entry.file_name().to_string_lossy();
        if let Some(video) = parser.parse_music_video(root, dir, &name) {
            result.items.push(video);
        }
    }

    Ok(result)
}
