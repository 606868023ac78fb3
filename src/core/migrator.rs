//! Storage migrator.
//!
//! Moves finished seasons and movies into the canonical storage roots:
//! - `<storage>/<Show (year)>/SNN` for seasons, show-level metadata promoted
//!   to the show folder
//! - `<storage>/<collection>/<Title (year)>` for movies
//!
//! Collisions are resolved by overwriting whatever is already in storage.

use crate::core::patterns;
use crate::generators::folder::{season_folder, season_poster};
use crate::models::media::CACHE_DIR_NAME;
use crate::utils::fs::{ensure_dir_exists, video_suffix};
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Subtitle folder vocabulary, matched as a case-insensitive substring.
const SUBTITLE_FOLDERS: &[&str] = &["sub", "subs", "subtitle", "subtitles", "字幕"];

/// Subtitle extensions in association priority order.
const SUBTITLE_EXTENSIONS: &[&str] = &["srt", "ass", "ssa"];

/// A pending relocation into storage.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveTask {
    /// Folder being moved.
    pub source: PathBuf,
    /// Show folder for seasons, final movie folder for movies.
    pub destination: PathBuf,
    /// Season being migrated, `None` for movies.
    pub season: Option<u32>,
    /// Show-level files, relative to the season folder, promoted to the show folder.
    pub meta_files: Vec<PathBuf>,
}

impl MoveTask {
    pub fn show_season(source: &Path, storage: &Path, show_folder: &str, season: u32) -> Self {
        let meta_files = [
            "tvshow.nfo".to_string(),
            "poster.jpg".to_string(),
            "fanart.jpg".to_string(),
            "clearlogo.png".to_string(),
            season_poster(season),
        ]
        .into_iter()
        .map(PathBuf::from)
        .chain([
            Path::new(CACHE_DIR_NAME).join("id.txt"),
            Path::new(CACHE_DIR_NAME).join("tv.json"),
        ])
        .collect();

        Self {
            source: source.to_path_buf(),
            destination: storage.join(show_folder),
            season: Some(season),
            meta_files,
        }
    }

    pub fn movie(source: &Path, storage: &Path, collection: &str, folder: &str) -> Self {
        Self {
            source: source.to_path_buf(),
            destination: storage.join(collection).join(folder),
            season: None,
            meta_files: Vec::new(),
        }
    }
}

/// Outcome of a season migration.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonMigration {
    /// Final season folder.
    pub destination: PathBuf,
    /// Name of the season-range collection whose last season was just moved.
    pub finished_collection: Option<String>,
}

/// Move one finished season into its show folder.
pub fn migrate_show_season(task: &MoveTask) -> Result<SeasonMigration> {
    let season = task
        .season
        .ok_or_else(|| crate::Error::other("season migration without a season"))?;
    let show_dir = &task.destination;
    let season_dir = show_dir.join(season_folder(season));

    if show_dir.is_dir() {
        remove_existing_season(show_dir, season)?;
    } else {
        fs::create_dir_all(show_dir)?;
    }
    ensure_dir_exists(&show_dir.join(CACHE_DIR_NAME))?;

    promote_meta_files(&task.source, show_dir, &task.meta_files);

    if let Err(e) = associate_subtitles(&task.source) {
        tracing::warn!("Subtitle association failed in {:?}: {}", task.source, e);
    }

    fs::rename(&task.source, &season_dir)?;
    tracing::info!("Moved {:?} to {:?}", task.source, season_dir);

    Ok(SeasonMigration {
        destination: season_dir,
        finished_collection: finished_collection(&task.source, season),
    })
}

/// Delete every show subfolder that holds the given season.
fn remove_existing_season(show_dir: &Path, season: u32) -> Result<()> {
    for entry in fs::read_dir(show_dir)?.flatten() {
        if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if patterns::folder_season(&name) == Some(season) {
            tracing::info!("Replacing existing season folder {:?}", entry.path());
            fs::remove_dir_all(entry.path())?;
        }
    }
    Ok(())
}

/// Storage copies win; a source copy of an existing file is dropped.
fn promote_meta_files(source_dir: &Path, show_dir: &Path, meta_files: &[PathBuf]) {
    for rel in meta_files {
        let source = source_dir.join(rel);
        let target = show_dir.join(rel);
        if !source.exists() {
            continue;
        }

        let result = if target.exists() {
            fs::remove_file(&source)
        } else {
            fs::rename(&source, &target)
        };
        if let Err(e) = result {
            tracing::warn!("Failed to promote {:?}: {}", source, e);
        }
    }
}

/// Collection name when `source` sits in a season-range folder ending at `season`.
fn finished_collection(source: &Path, season: u32) -> Option<String> {
    let parent = source.parent()?.file_name()?.to_string_lossy().to_string();
    let corrected = patterns::season_correcting(&patterns::filter_optionals(&parent));
    let last = patterns::season_range(&corrected).and_then(patterns::last_season_of_range)?;
    (last == season).then_some(parent)
}

fn is_subtitle_folder(name: &str) -> bool {
    let name = name.to_lowercase();
    SUBTITLE_FOLDERS.iter().any(|s| name.contains(s))
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Rename subtitles after the season's videos, index for index.
///
/// Each extension group is sorted by file name and zipped against the sorted
/// videos; subtitles found in subtitle folders are moved beside the videos and
/// emptied subtitle folders are removed. Returns the number of renamed files.
pub fn associate_subtitles(season_dir: &Path) -> Result<usize> {
    let mut videos = Vec::new();
    let mut subtitles = Vec::new();
    let mut subtitle_dirs = Vec::new();

    for entry in fs::read_dir(season_dir)?.flatten() {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

        if is_dir {
            if is_subtitle_folder(&name) {
                subtitles.extend(
                    fs::read_dir(&path)?
                        .flatten()
                        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
                        .map(|e| e.path()),
                );
                subtitle_dirs.push(path);
            }
        } else if video_suffix(&name).is_some() {
            videos.push(path);
        } else {
            subtitles.push(path);
        }
    }

    videos.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));

    let mut renamed = 0;
    for ext in SUBTITLE_EXTENSIONS {
        let mut group: Vec<&PathBuf> = subtitles
            .iter()
            .filter(|p| extension_of(p) == *ext)
            .collect();
        group.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));

        let mut pending = Vec::new();
        for (subtitle, video) in group.into_iter().zip(&videos) {
            let Some(stem) = video.file_stem() else {
                continue;
            };
            let Some(original_ext) = subtitle.extension() else {
                continue;
            };

            let mut target_name = stem.to_os_string();
            target_name.push(".");
            target_name.push(original_ext);
            let target = season_dir.join(target_name);
            if *subtitle != target {
                pending.push((subtitle, target));
            }
        }

        renamed += rename_subtitles(season_dir, ext, &pending);
    }

    for dir in subtitle_dirs {
        if let Err(e) = fs::remove_dir(&dir) {
            tracing::debug!("Keeping subtitle folder {:?}: {}", dir, e);
        }
    }

    Ok(renamed)
}

/// Two-phase rename so a target held by another pending subtitle is never
/// overwritten: every source moves to a temporary name first.
fn rename_subtitles(season_dir: &Path, ext: &str, pending: &[(&PathBuf, PathBuf)]) -> usize {
    let mut staged = Vec::new();
    for (i, (subtitle, target)) in pending.iter().enumerate() {
        let temp = unused_temp_name(season_dir, ext, i);
        match fs::rename(subtitle, &temp) {
            Ok(()) => staged.push((*subtitle, temp, target)),
            Err(e) => tracing::warn!("Failed to rename subtitle {:?}: {}", subtitle, e),
        }
    }

    let mut renamed = 0;
    for (subtitle, temp, target) in staged {
        let result = if target.exists() {
            tracing::warn!("{:?} already exists, keeping {:?}", target, subtitle);
            fs::rename(&temp, subtitle)
        } else {
            fs::rename(&temp, target).map(|()| {
                tracing::debug!("Subtitle {:?} -> {:?}", subtitle, target);
                renamed += 1;
            })
        };
        if let Err(e) = result {
            tracing::warn!("Failed to rename subtitle {:?}: {}", temp, e);
        }
    }
    renamed
}

fn unused_temp_name(dir: &Path, ext: &str, index: usize) -> PathBuf {
    let mut n = index;
    loop {
        let candidate = dir.join(format!(".subtitle-{}.{}.tmp", n, ext));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Move a finished movie folder into storage, replacing an older copy.
pub fn migrate_movie(task: &MoveTask) -> Result<PathBuf> {
    if !task.source.is_dir() {
        return Err(crate::Error::NotADirectory(task.source.display().to_string()));
    }

    if let Some(parent) = task.destination.parent() {
        ensure_dir_exists(parent)?;
    }
    if task.destination.exists() {
        tracing::info!("Replacing existing movie folder {:?}", task.destination);
        fs::remove_dir_all(&task.destination)?;
    }

    fs::rename(&task.source, &task.destination)?;
    tracing::info!("Moved {:?} to {:?}", task.source, task.destination);
    Ok(task.destination.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_subtitles_follow_sorted_videos() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        touch(&dir.join("E01.mkv"));
        touch(&dir.join("E02.mkv"));
        touch(&dir.join("a.srt"));
        touch(&dir.join("b.srt"));

        assert_eq!(associate_subtitles(dir).unwrap(), 2);
        assert!(dir.join("E01.srt").exists());
        assert!(dir.join("E02.srt").exists());
        assert!(!dir.join("a.srt").exists());
    }

    #[test]
    fn test_subtitle_target_held_by_another_subtitle() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        touch(&dir.join("E01.mkv"));
        touch(&dir.join("E02.mkv"));
        fs::write(dir.join("A.srt"), "first").unwrap();
        fs::write(dir.join("E01.srt"), "second").unwrap();

        assert_eq!(associate_subtitles(dir).unwrap(), 2);
        assert_eq!(fs::read_to_string(dir.join("E01.srt")).unwrap(), "first");
        assert_eq!(fs::read_to_string(dir.join("E02.srt")).unwrap(), "second");
        assert!(!dir.join("A.srt").exists());

        let leftovers: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_unpaired_subtitle_is_not_overwritten() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        touch(&dir.join("E01.mkv"));
        fs::write(dir.join("A.srt"), "paired").unwrap();
        fs::write(dir.join("E01.srt"), "unpaired").unwrap();

        assert_eq!(associate_subtitles(dir).unwrap(), 0);
        assert_eq!(fs::read_to_string(dir.join("E01.srt")).unwrap(), "unpaired");
        assert_eq!(fs::read_to_string(dir.join("A.srt")).unwrap(), "paired");
    }

    #[test]
    fn test_subtitles_pulled_from_subtitle_folder() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        touch(&dir.join("E01.mkv"));
        touch(&dir.join("Subs").join("x.ASS"));
        touch(&dir.join("Extras").join("y.srt"));

        associate_subtitles(dir).unwrap();
        assert!(dir.join("E01.ASS").exists());
        assert!(!dir.join("Subs").exists());
        assert!(dir.join("Extras").join("y.srt").exists());
    }

    #[test]
    fn test_collection_finished_on_last_season() {
        let source = Path::new("/shows/Friends.S01-S02/Friends.S02");
        assert_eq!(
            finished_collection(source, 2),
            Some("Friends.S01-S02".to_string())
        );
        assert_eq!(finished_collection(source, 1), None);
        assert_eq!(finished_collection(Path::new("/shows/Friends.S02"), 2), None);
    }

    #[test]
    fn test_movie_overwrites_destination() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("incoming").join("Heat.1995");
        touch(&source.join("heat.mkv"));
        let storage = tmp.path().join("storage");
        touch(&storage.join("Heat (1995)").join("old.mkv"));

        let task = MoveTask::movie(&source, &storage, "", "Heat (1995)");
        let destination = migrate_movie(&task).unwrap();

        assert_eq!(destination, storage.join("Heat (1995)"));
        assert!(destination.join("heat.mkv").exists());
        assert!(!destination.join("old.mkv").exists());
        assert!(!source.exists());
    }

    #[test]
    fn test_show_season_meta_files() {
        let task = MoveTask::show_season(Path::new("/in/Dark.S02"), Path::new("/st"), "Dark (2017)", 2);
        assert_eq!(task.destination, PathBuf::from("/st/Dark (2017)"));
        assert!(task.meta_files.contains(&PathBuf::from("season02-poster.jpg")));
        assert!(task.meta_files.contains(&PathBuf::from("tmdb/tv.json")));
        assert_eq!(task.meta_files.len(), 7);
    }
}
