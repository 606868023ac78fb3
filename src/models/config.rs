//! Configuration model.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration.
    pub log: LogConfig,
    /// Scan/watch/dispatch configuration.
    pub collector: CollectorConfig,
    /// Name classification vocabulary.
    pub classify: ClassifyConfig,
    /// TMDB configuration.
    pub tmdb: TmdbConfig,
    /// Kodi JSON-RPC configuration.
    pub kodi: KodiConfig,
    /// WebDAV configuration.
    pub webdav: WebDavConfig,
    /// ffmpeg/ffprobe configuration.
    pub ffmpeg: FfmpegConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level used when `--verbose` is not given.
    pub level: String,
}

/// Collector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Interval between full rescans, in seconds.
    pub cron_seconds: u64,
    /// Seconds a watched path must stay quiet before it is enqueued.
    pub watch_settle_secs: u64,
    /// Capacity of each category's work queue.
    pub queue_capacity: usize,
    /// Folder names that are never scanned.
    pub skip_folders: Vec<String>,
    /// Movie roots.
    pub movies_dir: Vec<PathBuf>,
    /// Show roots.
    pub shows_dir: Vec<PathBuf>,
    /// Music video roots.
    pub music_videos_dir: Vec<PathBuf>,
    /// 1 = `movie.nfo`, 2 = `<video>.nfo`.
    pub movies_nfo_mode: u8,
    /// Move finished items into the storage roots.
    pub move_to_storage: bool,
    /// Canonical movie storage root.
    pub movies_storage_dir: Option<PathBuf>,
    /// Canonical show storage root.
    pub shows_storage_dir: Option<PathBuf>,
    /// Concurrent movie workers.
    pub movie_workers: usize,
    /// Concurrent show workers.
    pub show_workers: usize,
}

/// Vocabulary used by the token classifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    /// Tokens dropped from titles without stopping accumulation.
    pub escape_tokens: Vec<String>,
    /// Phrases never split by the tokenizer.
    pub protected_phrases: Vec<String>,
    /// Source labels (case-insensitive).
    pub sources: Vec<String>,
    /// Studio labels (case-insensitive).
    pub studios: Vec<String>,
    /// Distribution channel labels (case-insensitive).
    pub channels: Vec<String>,
}

/// TMDB configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    /// API key or v4 bearer token.
    pub api_key: Option<String>,
    /// Language for responses.
    pub language: String,
    /// Host serving original-size images.
    pub image_host: String,
}

/// Kodi JSON-RPC configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KodiConfig {
    pub enable: bool,
    /// JSON-RPC endpoint, e.g. `http://127.0.0.1:8080/jsonrpc`.
    pub json_rpc: String,
    pub username: String,
    pub password: String,
    /// Send a library clean after each full scan.
    pub clean_library: bool,
    pub timeout_secs: u64,
}

/// WebDAV configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebDavConfig {
    pub enable: bool,
    pub url: String,
    pub username: String,
    pub password: String,
    /// Remote folder holding movie sources.
    pub movies_dir: String,
    /// Remote folder holding show sources.
    pub shows_dir: String,
}

/// ffmpeg configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FfmpegConfig {
    /// Concurrent music video workers.
    pub max_worker: usize,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            cron_seconds: 300,
            watch_settle_secs: 3,
            queue_capacity: 100,
            skip_folders: vec!["tmdb".to_string(), "@eaDir".to_string()],
            movies_dir: Vec::new(),
            shows_dir: Vec::new(),
            music_videos_dir: Vec::new(),
            movies_nfo_mode: 1,
            move_to_storage: false,
            movies_storage_dir: None,
            shows_storage_dir: None,
            movie_workers: 1,
            show_workers: 1,
        }
    }
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            escape_tokens: owned(&["TLOTR"]),
            protected_phrases: owned(&[
                "WEB-DL", "DDP5.1", "DDP 5.1", "DDP.5.1", "H.265", "BLU-RAY", "MA5.1", "MA 5.1",
                "MA.5.1", "MA7.1", "MA 7.1", "MA.7.1", "DTS-HD",
            ]),
            sources: owned(&["web-dl", "blu-ray", "bluray", "hdtv", "cctvhd"]),
            studios: owned(&[
                "hmax",
                "netflix",
                "funimation",
                "amzn",
                "hulu",
                "kktv",
                "crunchyroll",
                "bbc",
            ]),
            channels: owned(&["OAD", "OVA", "BD", "DVD", "SP"]),
        }
    }
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("TMDB_API_KEY").ok(),
            language: "zh-CN".to_string(),
            image_host: "https://image.tmdb.org".to_string(),
        }
    }
}

impl Default for KodiConfig {
    fn default() -> Self {
        Self {
            enable: false,
            json_rpc: "http://127.0.0.1:8080/jsonrpc".to_string(),
            username: String::new(),
            password: String::new(),
            clean_library: false,
            timeout_secs: 5,
        }
    }
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            max_worker: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(2),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
        }
    }
}

impl Config {
    /// Storage root for finished shows, if migration is enabled.
    pub fn shows_storage(&self) -> Option<&Path> {
        if !self.collector.move_to_storage {
            return None;
        }
        self.collector
            .shows_storage_dir
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Storage root for finished movies, if migration is enabled.
    pub fn movies_storage(&self) -> Option<&Path> {
        if !self.collector.move_to_storage {
            return None;
        }
        self.collector
            .movies_storage_dir
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    fn validate(&self) -> Result<()> {
        if self.collector.cron_seconds == 0 {
            return Err(crate::Error::Config(
                "collector.cron_seconds must be greater than 0".to_string(),
            ));
        }
        if self.collector.queue_capacity < 2 {
            return Err(crate::Error::Config(
                "collector.queue_capacity must be at least 2".to_string(),
            ));
        }
        if !matches!(self.collector.movies_nfo_mode, 1 | 2) {
            return Err(crate::Error::Config(
                "collector.movies_nfo_mode must be 1 or 2".to_string(),
            ));
        }
        Ok(())
    }
}

/// Get the configuration directory path.
fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("media_collector")
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs_config_path().join("config.toml")
}

/// Load configuration.
///
/// An explicit `path` must exist and parse. Without one the default location is
/// tried and a missing file yields the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            if !path.exists() {
                return Err(crate::Error::PathNotFound(path.display().to_string()));
            }
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => {
            let config_path = default_config_path();
            if config_path.exists() {
                let content = std::fs::read_to_string(&config_path)?;
                toml::from_str(&content)?
            } else {
                tracing::debug!("No config at {:?}, using defaults", config_path);
                Config::default()
            }
        }
    };

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [collector]
            shows_dir = ["/data/shows"]
            move_to_storage = true
            shows_storage_dir = "/storage/shows"
            "#,
        )
        .unwrap();

        assert_eq!(config.collector.cron_seconds, 300);
        assert_eq!(config.collector.queue_capacity, 100);
        assert_eq!(config.collector.shows_dir, vec![PathBuf::from("/data/shows")]);
        assert_eq!(config.shows_storage(), Some(Path::new("/storage/shows")));
        assert!(config.movies_storage().is_none());
        assert_eq!(config.classify.escape_tokens, vec!["TLOTR".to_string()]);
    }

    #[test]
    fn test_storage_disabled_without_move_flag() {
        let mut config = Config::default();
        config.collector.shows_storage_dir = Some(PathBuf::from("/storage"));
        assert!(config.shows_storage().is_none());
    }

    #[test]
    fn test_invalid_nfo_mode_rejected() {
        let mut config = Config::default();
        config.collector.movies_nfo_mode = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let result = load_config(Some(Path::new("/nonexistent/config.toml")));
        assert!(result.is_err());
    }
}
