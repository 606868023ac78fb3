//! Collaborator traits used by the processors.
//!
//! The pipeline only talks to the outside world through these traits, so each
//! one can be replaced by an in-memory fake in tests.

use crate::models::media::{MediaKind, ProbeInfo};
use crate::models::search::{
    EpisodeDetail, EpisodeGroupDetail, MovieDetail, QueryVariant, SearchKind, SearchResult,
    TvDetail,
};
use crate::Result;
use async_trait::async_trait;
use std::path::Path;

/// Metadata provider (search, details, images).
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Search one index with one query variant.
    async fn search(&self, kind: SearchKind, query: &QueryVariant) -> Result<Vec<SearchResult>>;

    async fn movie_detail(&self, id: u64) -> Result<MovieDetail>;

    async fn tv_detail(&self, id: u64) -> Result<TvDetail>;

    async fn episode_group(&self, group_id: &str) -> Result<EpisodeGroupDetail>;

    async fn episode_detail(&self, tv_id: u64, season: u32, episode: u32) -> Result<EpisodeDetail>;

    /// Download an image by provider path and write it to `target`.
    async fn download_image(&self, image_path: &str, target: &Path) -> Result<()>;
}

/// Item a media-center refresh is requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshRequest {
    Movie { title: String },
    TvShow { title: String },
    Episode { show: String, season: u32, episode: u32 },
}

/// Media-center library signals. Fire-and-forget from the caller's view.
#[async_trait]
pub trait MediaCenter: Send + Sync {
    async fn refresh(&self, request: RefreshRequest) -> Result<()>;

    /// Scan a directory (or the whole library when `None`).
    async fn scan(&self, path: Option<&Path>) -> Result<()>;

    async fn clean(&self) -> Result<()>;
}

/// Remote copy of the source folders.
#[async_trait]
pub trait RemoteStorage: Send + Sync {
    /// Delete a top-level source folder of the given category.
    async fn delete_folder(&self, kind: MediaKind, name: &str) -> Result<()>;
}

/// Stream prober and thumbnail renderer.
#[async_trait]
pub trait VideoProber: Send + Sync {
    async fn probe(&self, video: &Path) -> Result<ProbeInfo>;

    async fn thumbnail(&self, video: &Path, target: &Path) -> Result<()>;
}
