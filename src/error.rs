//! Error types for the media collector.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the media collector.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("TMDB API key not configured. Set TMDB_API_KEY or [tmdb] api_key")]
    TmdbApiKeyMissing,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse config file: {0}")]
    ConfigSyntax(#[from] toml::de::Error),

    // File system errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    // Parse errors
    #[error("Failed to parse name: {0}")]
    ParseError(String),

    // Lookup errors
    #[error("Not found on TMDB: {0}")]
    NotFound(String),

    #[error("TMDB request failed: {0}")]
    Tmdb(String),

    // Collaborator errors
    #[error("Media center request failed: {0}")]
    MediaCenter(String),

    #[error("Remote storage request failed: {0}")]
    RemoteStorage(String),

    #[error("Probe failed: {0}")]
    Probe(String),

    #[error("Watcher error: {0}")]
    Watch(#[from] notify::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Whether the error means "no provider result", retried on the next cycle.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
