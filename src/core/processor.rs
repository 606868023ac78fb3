//! Per-item processors.
//!
//! Every side effect is checked before it is performed (cached details,
//! existing NFOs and images), so an item can be processed again on every scan
//! and only fills in what is still missing.

use crate::core::context::PipelineContext;
use crate::core::episodes::{scan_show_files, EpisodeSet};
use crate::core::matcher::find_best;
use crate::core::migrator::{migrate_movie, migrate_show_season, MoveTask};
use crate::core::scanner::scan_collection;
use crate::core::sidecar;
use crate::generators::folder::{collection_folder, movie_folder, season_poster, show_folder};
use crate::generators::nfo;
use crate::models::media::{
    EpisodeFile, MediaKind, MovieDir, MusicVideo, ProbeInfo, SeasonEpisode, ShowDir,
};
use crate::models::search::{EpisodeDetail, EpisodeGroupDetail, MovieDetail, SearchKind, TvDetail};
use crate::services::provider::RefreshRequest;
use crate::utils::fs::{ensure_dir_exists, non_empty_file};
use crate::Result;
use futures::stream::{self, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

const MOVIE_CACHE_FILE: &str = "movie.json";
const TV_CACHE_FILE: &str = "tv.json";

/// Parallel image downloads per item.
const IMAGE_CONCURRENCY: usize = 4;

/// Match, describe and (optionally) migrate one movie.
pub async fn process_movie(ctx: &PipelineContext, movie: &MovieDir) -> Result<()> {
    tracing::debug!("Processing movie {:?}", movie.full_dir());

    let id = resolve_movie_id(ctx, movie).await?;
    let detail = movie_detail(ctx, movie, id).await?;

    let mode = ctx.config.collector.movies_nfo_mode;
    match movie.nfo_file(mode) {
        Some(nfo_file) if !detail.from_cache || !non_empty_file(&nfo_file) => {
            match nfo::write_nfo(&nfo_file, &nfo::generate_movie_nfo(&detail)) {
                Ok(()) => {
                    refresh(
                        ctx,
                        RefreshRequest::Movie {
                            title: detail.original_title.clone(),
                        },
                    )
                    .await
                }
                Err(e) => tracing::error!("Failed to write {:?}: {}", nfo_file, e),
            }
        }
        Some(_) => {}
        None => tracing::warn!(
            "No NFO location for {:?} in mode {}, NFO skipped",
            movie.full_dir(),
            mode
        ),
    }

    let mut images = vec![
        (detail.poster_path.clone(), movie.artwork_file("poster.jpg")),
        (detail.backdrop_path.clone(), movie.artwork_file("fanart.jpg")),
    ];
    if let Some(logo) = detail.images.as_ref().and_then(|i| i.best_logo()) {
        images.push((Some(logo.file_path.clone()), movie.artwork_file("clearlogo.png")));
    }
    let failed = download_images(ctx, images).await;

    let Some(storage) = ctx.config.movies_storage() else {
        return Ok(());
    };
    if movie.is_file {
        tracing::debug!("Bare movie file {:?} stays in place", movie.full_dir());
        return Ok(());
    }
    if failed > 0 {
        tracing::warn!(
            "{} image(s) missing for {:?}, migration postponed",
            failed,
            movie.full_dir()
        );
        return Ok(());
    }

    let task = MoveTask::movie(
        &movie.full_dir(),
        storage,
        &collection_folder(&detail),
        &movie_folder(&detail),
    );
    if let Err(e) = run_blocking(move || migrate_movie(&task)).await {
        tracing::error!("Failed to move {:?} to storage: {}", movie.full_dir(), e);
    }
    Ok(())
}

/// Match and describe one show directory.
///
/// For a collection the parsed season directories are returned so the caller
/// can enqueue them; otherwise the result is empty.
pub async fn process_show(ctx: &PipelineContext, show: &ShowDir) -> Result<Vec<ShowDir>> {
    tracing::debug!("Processing show {:?}", show.full_dir());
    ensure_dir_exists(&show.cache_dir())?;

    let tv_id = resolve_tv_id(ctx, show).await?;
    let detail = tv_detail(ctx, show, tv_id).await?;

    let nfo_file = show.nfo_file();
    if !detail.from_cache || !non_empty_file(&nfo_file) {
        match nfo::write_nfo(&nfo_file, &nfo::generate_tvshow_nfo(&detail)) {
            Ok(()) => {
                refresh(
                    ctx,
                    RefreshRequest::TvShow {
                        title: detail.original_name.clone(),
                    },
                )
                .await
            }
            Err(e) => tracing::error!("Failed to write {:?}: {}", nfo_file, e),
        }
    }

    download_images(ctx, show_images(show, &detail)).await;

    if show.is_collection {
        let collection = ShowDir {
            tv_id,
            ..show.clone()
        };
        let children = scan_collection(&ctx.parser, &collection)?;
        tracing::info!(
            "Collection {:?}: {} season folder(s)",
            show.origin_title,
            children.len()
        );
        return Ok(children);
    }

    let mut episodes = scan_show_files(show)?;
    if episodes.is_empty() {
        tracing::warn!("No episodes found in {:?}", show.full_dir());
        return Ok(Vec::new());
    }
    for file in episodes.values_mut() {
        file.tv_id = tv_id;
    }

    if !show.group_id.is_empty() {
        if let Some(group) = &detail.episode_group {
            write_group_caches(group, &episodes, !detail.from_cache);
        }
    }

    for file in episodes.values() {
        if let Err(e) = process_episode(ctx, &detail, file).await {
            tracing::warn!("Episode {} of {:?} failed: {}", file.key(), show.origin_title, e);
        }
    }

    let Some(storage) = ctx.config.shows_storage() else {
        return Ok(Vec::new());
    };
    if !season_finished(&detail, show, episodes.len()) {
        tracing::info!(
            "Season {} of {:?} is not complete yet, migration postponed",
            show.season,
            show.origin_title
        );
        return Ok(Vec::new());
    }

    let task = MoveTask::show_season(&show.full_dir(), storage, &show_folder(&detail), show.season);
    match run_blocking(move || migrate_show_season(&task)).await {
        Ok(migration) => {
            if let Some(collection) = migration.finished_collection {
                if let Err(e) = ctx.remote.delete_folder(MediaKind::Shows, &collection).await {
                    tracing::warn!("Failed to delete remote collection {:?}: {}", collection, e);
                }
            }
        }
        Err(e) => tracing::error!("Failed to move {:?} to storage: {}", show.full_dir(), e),
    }
    Ok(Vec::new())
}

/// Describe one episode file: NFO, refresh and still image.
pub async fn process_episode(
    ctx: &PipelineContext,
    show: &TvDetail,
    file: &EpisodeFile,
) -> Result<()> {
    let detail = episode_detail(ctx, file).await?;

    let nfo_file = file.nfo_file();
    if !detail.from_cache || !non_empty_file(&nfo_file) {
        nfo::write_nfo(&nfo_file, &nfo::generate_episode_nfo(&show.name, &detail))?;
        refresh(
            ctx,
            RefreshRequest::Episode {
                show: show.original_name.clone(),
                season: detail.season_number,
                episode: detail.episode_number,
            },
        )
        .await;
    }

    download_images(ctx, vec![(detail.still_path.clone(), file.thumb_file())]).await;
    Ok(())
}

/// Probe, thumbnail and describe one music video.
pub async fn process_music_video(ctx: &PipelineContext, video: &MusicVideo) -> Result<()> {
    let nfo_file = video.nfo_file();
    let thumb_file = video.thumb_file();
    if non_empty_file(&nfo_file) && non_empty_file(&thumb_file) {
        tracing::debug!("Music video {:?} is complete", video.path());
        return Ok(());
    }

    let probe = probe_info(ctx, video).await?;

    if !non_empty_file(&thumb_file) {
        ctx.prober.thumbnail(&video.path(), &thumb_file).await?;
    }

    nfo::write_nfo(&nfo_file, &nfo::generate_music_video_nfo(video, &probe))?;

    if let Err(e) = ctx.media_center.scan(Some(&video.base_dir)).await {
        tracing::warn!("Media center scan of {:?} failed: {}", video.base_dir, e);
    }
    Ok(())
}

async fn resolve_movie_id(ctx: &PipelineContext, movie: &MovieDir) -> Result<u64> {
    if movie.movie_id > 0 {
        return Ok(movie.movie_id);
    }
    let best = find_best(ctx.provider.as_ref(), SearchKind::Movie, &movie.name).await?;
    if let Err(e) = sidecar::write_id(&movie.id_dir(), best.id) {
        tracing::warn!("Failed to save movie id for {:?}: {}", movie.full_dir(), e);
    }
    Ok(best.id)
}

async fn resolve_tv_id(ctx: &PipelineContext, show: &ShowDir) -> Result<u64> {
    if show.tv_id > 0 {
        return Ok(show.tv_id);
    }
    let best = find_best(ctx.provider.as_ref(), SearchKind::Tv, &show.name).await?;
    if let Err(e) = sidecar::write_id(&show.cache_dir(), best.id) {
        tracing::warn!("Failed to save tv id for {:?}: {}", show.full_dir(), e);
    }
    Ok(best.id)
}

async fn movie_detail(ctx: &PipelineContext, movie: &MovieDir, id: u64) -> Result<MovieDetail> {
    let cache_file = movie.id_dir().join(MOVIE_CACHE_FILE);
    if let Some(mut detail) = read_cache::<MovieDetail>(&cache_file) {
        if detail.id == id {
            detail.from_cache = true;
            return Ok(detail);
        }
    }

    let detail = ctx.provider.movie_detail(id).await?;
    if let Err(e) = write_cache(&cache_file, &detail) {
        tracing::warn!("Failed to cache {:?}: {}", cache_file, e);
    }
    Ok(detail)
}

async fn tv_detail(ctx: &PipelineContext, show: &ShowDir, id: u64) -> Result<TvDetail> {
    let cache_file = show.cache_dir().join(TV_CACHE_FILE);
    let mut detail = match read_cache::<TvDetail>(&cache_file) {
        Some(mut detail) if detail.id == id => {
            detail.from_cache = true;
            detail
        }
        _ => ctx.provider.tv_detail(id).await?,
    };

    let group_stale = detail
        .episode_group
        .as_ref()
        .map(|g| g.id != show.group_id)
        .unwrap_or(true);
    if !show.group_id.is_empty() && group_stale {
        match ctx.provider.episode_group(&show.group_id).await {
            Ok(group) => {
                detail.episode_group = Some(group);
                detail.from_cache = false;
            }
            Err(e) => tracing::warn!("Episode group {:?} unavailable: {}", show.group_id, e),
        }
    }

    if !detail.from_cache {
        if let Err(e) = write_cache(&cache_file, &detail) {
            tracing::warn!("Failed to cache {:?}: {}", cache_file, e);
        }
    }
    Ok(detail)
}

async fn episode_detail(ctx: &PipelineContext, file: &EpisodeFile) -> Result<EpisodeDetail> {
    let cache_file = file.cache_file();
    if let Some(mut detail) = read_cache::<EpisodeDetail>(&cache_file) {
        detail.from_cache = true;
        return Ok(detail);
    }

    let detail = ctx
        .provider
        .episode_detail(file.tv_id, file.season, file.episode)
        .await?;
    if let Err(e) = write_cache(&cache_file, &detail) {
        tracing::warn!("Failed to cache {:?}: {}", cache_file, e);
    }
    Ok(detail)
}

async fn probe_info(ctx: &PipelineContext, video: &MusicVideo) -> Result<ProbeInfo> {
    let cache_file = video.probe_cache_file();
    if let Some(probe) = read_cache::<ProbeInfo>(&cache_file) {
        return Ok(probe);
    }

    let probe = ctx.prober.probe(&video.path()).await?;
    if let Err(e) = write_cache(&cache_file, &probe) {
        tracing::warn!("Failed to cache {:?}: {}", cache_file, e);
    }
    Ok(probe)
}

/// Write group episode details to the per-episode caches of existing files.
///
/// Episodes of each group are numbered by their position in group order.
/// Existing caches are kept unless `refreshed` says the group was just fetched.
pub fn write_group_caches(
    group: &EpisodeGroupDetail,
    episodes: &EpisodeSet,
    refreshed: bool,
) -> usize {
    let mut written = 0;
    for season in &group.groups {
        let mut listed = season.episodes.clone();
        listed.sort_by_key(|e| e.order);

        for (k, episode) in listed.iter().enumerate() {
            let number = k as u32 + 1;
            let key = SeasonEpisode::new(season.order, number);
            let Some(file) = episodes.get(&key) else {
                continue;
            };
            if !refreshed && file.cache_file().exists() {
                continue;
            }

            let detail = EpisodeDetail {
                season_number: season.order,
                episode_number: number,
                ..EpisodeDetail::from(episode)
            };
            match write_cache(&file.cache_file(), &detail) {
                Ok(()) => written += 1,
                Err(e) => tracing::error!("Failed to cache group episode {}: {}", key, e),
            }
        }
    }
    written
}

/// A season can be migrated once every episode the provider lists is present.
///
/// Unknown counts and episode-group layouts count as finished.
pub fn season_finished(detail: &TvDetail, show: &ShowDir, file_count: usize) -> bool {
    if !show.group_id.is_empty() {
        return true;
    }
    match detail.seasons.iter().find(|s| s.season_number == show.season) {
        Some(season) if season.episode_count > 0 => file_count >= season.episode_count as usize,
        _ => true,
    }
}

fn show_images(show: &ShowDir, detail: &TvDetail) -> Vec<(Option<String>, PathBuf)> {
    let dir = show.full_dir();
    let mut images = vec![
        (detail.poster_path.clone(), dir.join("poster.jpg")),
        (detail.backdrop_path.clone(), dir.join("fanart.jpg")),
    ];
    if let Some(logo) = detail.images.as_ref().and_then(|i| i.best_logo()) {
        images.push((Some(logo.file_path.clone()), dir.join("clearlogo.png")));
    }
    for season in &detail.seasons {
        if show.is_collection || season.season_number == show.season {
            images.push((
                season.poster_path.clone(),
                dir.join(season_poster(season.season_number)),
            ));
        }
    }
    images
}

/// Download missing images; returns the number of failed downloads.
async fn download_images(ctx: &PipelineContext, images: Vec<(Option<String>, PathBuf)>) -> usize {
    let provider = ctx.provider.as_ref();
    let pending: Vec<(String, PathBuf)> = images
        .into_iter()
        .filter_map(|(path, target)| Some((path.filter(|p| !p.is_empty())?, target)))
        .filter(|(_, target)| !non_empty_file(target))
        .collect();

    let results: Vec<bool> = stream::iter(pending)
        .map(|(path, target)| async move {
            match provider.download_image(&path, &target).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("Failed to download {} to {:?}: {}", path, target, e);
                    false
                }
            }
        })
        .buffer_unordered(IMAGE_CONCURRENCY)
        .collect()
        .await;

    results.iter().filter(|ok| !**ok).count()
}

async fn refresh(ctx: &PipelineContext, request: RefreshRequest) {
    if let Err(e) = ctx.media_center.refresh(request.clone()).await {
        tracing::warn!("Media center refresh {:?} failed: {}", request, e);
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| crate::Error::other(format!("blocking task failed: {}", e)))?
}

fn read_cache<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let content = match std::fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("Failed to read {:?}: {}", path, e);
            return None;
        }
    };
    match serde_json::from_slice(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring unreadable cache {:?}: {}", path, e);
            None
        }
    }
}

fn write_cache<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent)?;
    }
    std::fs::write(path, serde_json::to_vec_pretty(value)?)?;
    Ok(())
}
