//! Filesystem watcher.
//!
//! Every discovered directory is watched non-recursively. Events are reduced to
//! the top-level item they belong to and coalesced until the item has been
//! quiet for the settle time.

use crate::core::parser::NameParser;
use crate::core::patterns;
use crate::models::media::MediaKind;
use crate::utils::fs::{filter_tmp_suffix, video_suffix};
use crate::Result;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Tracks items and reports those that stopped changing.
pub struct SettleTracker {
    /// Item path to time of its last event
    pending: HashMap<PathBuf, Instant>,
    settle_duration: Duration,
}

impl SettleTracker {
    pub fn new(settle_secs: u64) -> Self {
        Self {
            pending: HashMap::new(),
            settle_duration: Duration::from_secs(settle_secs),
        }
    }

    /// Record an event for an item.
    pub fn touch(&mut self, path: PathBuf) {
        self.pending.insert(path, Instant::now());
    }

    /// Remove and return every item quiet since `now - settle_duration`, sorted.
    pub fn take_settled(&mut self, now: Instant) -> Vec<PathBuf> {
        let mut settled: Vec<PathBuf> = self
            .pending
            .iter()
            .filter(|(_, last)| now.saturating_duration_since(**last) >= self.settle_duration)
            .map(|(path, _)| path.clone())
            .collect();
        for path in &settled {
            self.pending.remove(path);
        }
        settled.sort();
        settled
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Create, modify and rename events only.
pub fn is_relevant_kind(kind: &EventKind) -> bool {
    kind.is_create() || kind.is_modify()
}

/// Directories and playable videos; NFO, image and cache writes never count.
pub fn is_relevant_path(path: &Path) -> bool {
    if path.is_dir() {
        return true;
    }
    path.file_name()
        .map(|name| video_suffix(&filter_tmp_suffix(&name.to_string_lossy())).is_some())
        .unwrap_or(false)
}

/// Map an event path to the root and the item it belongs to.
///
/// The item is the top-level entry under a root; movies inside a year-range
/// collection resolve one level deeper and music videos resolve to the path
/// itself. Paths inside hidden or skip-listed folders resolve to nothing.
pub fn resolve_item(
    parser: &NameParser,
    kind: MediaKind,
    roots: &[PathBuf],
    path: &Path,
) -> Option<(PathBuf, PathBuf)> {
    let root = roots
        .iter()
        .filter(|root| path.starts_with(root) && path != root.as_path())
        .max_by_key(|root| root.components().count())?;
    let rel = path.strip_prefix(root).ok()?;

    let names: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    let last = names.len().saturating_sub(1);
    if names
        .iter()
        .enumerate()
        .any(|(i, name)| parser.is_skipped(name) && (i < last || path.is_dir()))
    {
        return None;
    }

    let first = names.first()?;
    let mut item = root.join(first);
    match kind {
        MediaKind::Movies => {
            if patterns::year_range(first).is_some() {
                item = item.join(names.get(1)?);
            }
        }
        MediaKind::Shows => {}
        MediaKind::MusicVideos => item = path.to_path_buf(),
    }
    Some((root.clone(), item))
}

/// Non-recursive watcher over a set of directories.
///
/// A removed directory leaves the set, either on its remove event or on the
/// next `prune_missing`, so a re-created folder of the same name can be
/// watched again.
pub struct DirWatcher {
    watcher: RecommendedWatcher,
    watched: Arc<Mutex<HashSet<PathBuf>>>,
}

impl DirWatcher {
    /// Relevant event paths are forwarded to `event_tx`.
    pub fn new(event_tx: mpsc::Sender<PathBuf>) -> Result<Self> {
        let watched = Arc::new(Mutex::new(HashSet::new()));
        let removed = watched.clone();

        let watcher = RecommendedWatcher::new(
            move |res: std::result::Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if event.kind.is_remove() {
                        if let Ok(mut set) = removed.lock() {
                            for path in &event.paths {
                                set.remove(path);
                            }
                        }
                        return;
                    }
                    if !is_relevant_kind(&event.kind) {
                        return;
                    }
                    for path in event.paths {
                        if is_relevant_path(&path) {
                            let _ = event_tx.blocking_send(path);
                        }
                    }
                }
                Err(e) => tracing::warn!("Watch error: {}", e),
            },
            notify::Config::default(),
        )?;

        Ok(Self { watcher, watched })
    }

    /// Start watching a directory; already watched and missing ones are ignored.
    pub fn watch(&mut self, dir: &Path) -> bool {
        if self.is_watched(dir) || !dir.is_dir() {
            return false;
        }
        match self.watcher.watch(dir, RecursiveMode::NonRecursive) {
            Ok(()) => {
                tracing::debug!("Watching {:?}", dir);
                if let Ok(mut set) = self.watched.lock() {
                    set.insert(dir.to_path_buf());
                }
                true
            }
            Err(e) => {
                tracing::warn!("Failed to watch {:?}: {}", dir, e);
                false
            }
        }
    }

    pub fn is_watched(&self, dir: &Path) -> bool {
        self.watched
            .lock()
            .map(|set| set.contains(dir))
            .unwrap_or(false)
    }

    /// Forget directories that no longer exist; returns how many were dropped.
    pub fn prune_missing(&mut self) -> usize {
        let missing: Vec<PathBuf> = match self.watched.lock() {
            Ok(mut set) => {
                let missing: Vec<PathBuf> = set.iter().filter(|d| !d.is_dir()).cloned().collect();
                for dir in &missing {
                    set.remove(dir);
                }
                missing
            }
            Err(_) => return 0,
        };
        for dir in &missing {
            tracing::debug!("No longer watching {:?}", dir);
            let _ = self.watcher.unwatch(dir);
        }
        missing.len()
    }

    pub fn watched_count(&self) -> usize {
        self.watched.lock().map(|set| set.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::Config;
    use std::fs;
    use tempfile::TempDir;

    fn parser() -> NameParser {
        NameParser::new(&Config::default())
    }

    #[test]
    fn test_settle_tracker_coalesces() {
        let mut tracker = SettleTracker::new(3);
        tracker.touch(PathBuf::from("/shows/A"));
        tracker.touch(PathBuf::from("/shows/A"));
        tracker.touch(PathBuf::from("/shows/B"));
        assert_eq!(tracker.len(), 2);

        assert!(tracker.take_settled(Instant::now()).is_empty());

        let later = Instant::now() + Duration::from_secs(4);
        assert_eq!(
            tracker.take_settled(later),
            vec![PathBuf::from("/shows/A"), PathBuf::from("/shows/B")]
        );
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_relevant_paths() {
        let tmp = TempDir::new().unwrap();
        assert!(is_relevant_path(tmp.path()));
        assert!(is_relevant_path(&tmp.path().join("E01.mkv")));
        assert!(is_relevant_path(&tmp.path().join("E01.mkv.part")));
        assert!(!is_relevant_path(&tmp.path().join("E01.nfo")));
        assert!(!is_relevant_path(&tmp.path().join("poster.jpg")));
    }

    #[test]
    fn test_resolve_show_item() {
        let roots = vec![PathBuf::from("/data/shows")];
        let (root, item) = resolve_item(
            &parser(),
            MediaKind::Shows,
            &roots,
            Path::new("/data/shows/Dark.S01/E01.mkv"),
        )
        .unwrap();
        assert_eq!(root, PathBuf::from("/data/shows"));
        assert_eq!(item, PathBuf::from("/data/shows/Dark.S01"));

        assert!(resolve_item(&parser(), MediaKind::Shows, &roots, Path::new("/data/shows")).is_none());
        assert!(resolve_item(&parser(), MediaKind::Shows, &roots, Path::new("/other/x.mkv")).is_none());
    }

    #[test]
    fn test_resolve_movie_in_year_range() {
        let roots = vec![PathBuf::from("/data/movies")];
        let (_, item) = resolve_item(
            &parser(),
            MediaKind::Movies,
            &roots,
            Path::new("/data/movies/Iron.Man.2008-2013/Iron.Man.2.2010/movie.mkv"),
        )
        .unwrap();
        assert_eq!(item, PathBuf::from("/data/movies/Iron.Man.2008-2013/Iron.Man.2.2010"));
    }

    #[test]
    fn test_resolve_ignores_cache_folder() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().to_path_buf();
        fs::create_dir_all(root.join("Dark.S01/tmdb")).unwrap();

        let roots = vec![root.clone()];
        assert!(resolve_item(
            &parser(),
            MediaKind::Shows,
            &roots,
            &root.join("Dark.S01/tmdb")
        )
        .is_none());
        assert!(resolve_item(
            &parser(),
            MediaKind::Shows,
            &roots,
            &root.join("Dark.S01/tmdb/s01e01.json")
        )
        .is_none());
    }

    #[test]
    fn test_watch_set_grows_once() {
        let tmp = TempDir::new().unwrap();
        let (tx, _rx) = mpsc::channel(8);
        let mut watcher = DirWatcher::new(tx).unwrap();

        assert!(watcher.watch(tmp.path()));
        assert!(!watcher.watch(tmp.path()));
        assert!(!watcher.watch(&tmp.path().join("missing")));
        assert_eq!(watcher.watched_count(), 1);
    }

    #[test]
    fn test_recreated_dir_is_watched_again() {
        let tmp = TempDir::new().unwrap();
        let show = tmp.path().join("Show.S01");
        fs::create_dir_all(&show).unwrap();

        let (tx, _rx) = mpsc::channel(64);
        let mut watcher = DirWatcher::new(tx).unwrap();
        assert!(watcher.watch(&show));

        fs::remove_dir_all(&show).unwrap();
        assert_eq!(watcher.prune_missing(), 1);
        assert!(!watcher.is_watched(&show));

        fs::create_dir_all(&show).unwrap();
        assert!(watcher.watch(&show));
        assert_eq!(watcher.watched_count(), 1);
    }

    #[test]
    fn test_remove_event_forgets_dir() {
        let tmp = TempDir::new().unwrap();
        let show = tmp.path().join("Show.S01");
        fs::create_dir_all(&show).unwrap();

        let (tx, _rx) = mpsc::channel(64);
        let mut watcher = DirWatcher::new(tx).unwrap();
        assert!(watcher.watch(tmp.path()));
        assert!(watcher.watch(&show));

        fs::remove_dir_all(&show).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while watcher.is_watched(&show) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
        }

        fs::create_dir_all(&show).unwrap();
        assert!(watcher.watch(&show));
    }
}
