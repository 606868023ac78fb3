//! Scan, watch and dispatch pipeline.
//!
//! Each media category runs its own pipeline: a watcher, a cron scanner and a
//! dispatcher sharing one bounded queue. Workers are limited by a semaphore
//! independent of queue depth. Shows keep half of their queue free for season
//! folders pushed back by collection processing.

use crate::core::context::PipelineContext;
use crate::core::parser::NameParser;
use crate::core::processor;
use crate::core::scanner::{self, ScanResult};
use crate::core::watcher::{resolve_item, DirWatcher, SettleTracker};
use crate::models::config::Config;
use crate::models::media::{MediaKind, MovieDir, MusicVideo, ShowDir};
use crate::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio::time::MissedTickBehavior;

/// How often settled watch events are checked.
const SETTLE_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Buffer between the notify thread and the watcher task.
const EVENT_BUFFER: usize = 256;

/// One media category's scanning and processing rules.
#[async_trait]
pub trait Category: Send + Sync + 'static {
    type Item: Send + Sync + 'static;

    fn kind(&self) -> MediaKind;

    fn roots<'a>(&self, config: &'a Config) -> &'a [PathBuf];

    /// Concurrent item workers.
    fn workers(&self, config: &Config) -> usize;

    /// Cron enqueues stop while half the queue holds cron work.
    fn reserve_half(&self) -> bool {
        false
    }

    /// Send a library clean after each full scan.
    fn cleans_library(&self) -> bool {
        true
    }

    /// Full scan of one root.
    fn scan(&self, parser: &NameParser, root: &Path) -> Result<ScanResult<Self::Item>>;

    /// Items for one settled watch path.
    fn resolve(&self, parser: &NameParser, root: &Path, path: &Path) -> ScanResult<Self::Item>;

    /// Directories to watch for an item pushed back by processing.
    fn watch_dirs(&self, _item: &Self::Item) -> Vec<PathBuf> {
        Vec::new()
    }

    fn label(&self, item: &Self::Item) -> String;

    /// Process one item, returning follow-up items to enqueue.
    async fn process(&self, ctx: &PipelineContext, item: &Self::Item) -> Result<Vec<Self::Item>>;
}

/// Queue entry. The permit, when present, holds a cron reservation slot.
pub struct Job<T> {
    pub item: T,
    pub permit: Option<OwnedSemaphorePermit>,
}

impl<T> Job<T> {
    pub fn new(item: T) -> Self {
        Self { item, permit: None }
    }
}

pub struct Movies;

#[async_trait]
impl Category for Movies {
    type Item = MovieDir;

    fn kind(&self) -> MediaKind {
        MediaKind::Movies
    }

    fn roots<'a>(&self, config: &'a Config) -> &'a [PathBuf] {
        &config.collector.movies_dir
    }

    fn workers(&self, config: &Config) -> usize {
        config.collector.movie_workers
    }

    fn scan(&self, parser: &NameParser, root: &Path) -> Result<ScanResult<MovieDir>> {
        scanner::scan_movies(parser, root)
    }

    fn resolve(&self, parser: &NameParser, _root: &Path, path: &Path) -> ScanResult<MovieDir> {
        let mut result = ScanResult::default();
        let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
            return result;
        };
        if !path.exists() {
            return result;
        }
        let is_dir = path.is_dir();
        if let Some(movie) = parser.parse_movie_entry(dir, &name.to_string_lossy(), is_dir) {
            if is_dir {
                result.watch_dirs.push(path.to_path_buf());
            }
            result.items.push(movie);
        }
        result
    }

    fn label(&self, item: &MovieDir) -> String {
        format!("movie {:?}", item.full_dir())
    }

    async fn process(&self, ctx: &PipelineContext, item: &MovieDir) -> Result<Vec<MovieDir>> {
        processor::process_movie(ctx, item).await?;
        Ok(Vec::new())
    }
}

pub struct Shows;

#[async_trait]
impl Category for Shows {
    type Item = ShowDir;

    fn kind(&self) -> MediaKind {
        MediaKind::Shows
    }

    fn roots<'a>(&self, config: &'a Config) -> &'a [PathBuf] {
        &config.collector.shows_dir
    }

    fn workers(&self, config: &Config) -> usize {
        config.collector.show_workers
    }

    fn reserve_half(&self) -> bool {
        true
    }

    fn scan(&self, parser: &NameParser, root: &Path) -> Result<ScanResult<ShowDir>> {
        scanner::scan_shows(parser, root)
    }

    fn resolve(&self, parser: &NameParser, _root: &Path, path: &Path) -> ScanResult<ShowDir> {
        let mut result = ScanResult::default();
        let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
            return result;
        };
        if !path.is_dir() {
            return result;
        }
        if let Some(show) = parser.parse_show_dir(dir, &name.to_string_lossy()) {
            result.watch_dirs.push(show.full_dir());
            result.items.push(show);
        }
        result
    }

    fn watch_dirs(&self, item: &ShowDir) -> Vec<PathBuf> {
        vec![item.full_dir()]
    }

    fn label(&self, item: &ShowDir) -> String {
        format!("show {:?}", item.full_dir())
    }

    async fn process(&self, ctx: &PipelineContext, item: &ShowDir) -> Result<Vec<ShowDir>> {
        processor::process_show(ctx, item).await
    }
}

pub struct MusicVideos;

#[async_trait]
impl Category for MusicVideos {
    type Item = MusicVideo;

    fn kind(&self) -> MediaKind {
        MediaKind::MusicVideos
    }

    fn roots<'a>(&self, config: &'a Config) -> &'a [PathBuf] {
        &config.collector.music_videos_dir
    }

    fn workers(&self, config: &Config) -> usize {
        config.ffmpeg.max_worker
    }

    fn cleans_library(&self) -> bool {
        false
    }

    fn scan(&self, parser: &NameParser, root: &Path) -> Result<ScanResult<MusicVideo>> {
        scanner::scan_music_videos(parser, root)
    }

    fn resolve(&self, parser: &NameParser, root: &Path, path: &Path) -> ScanResult<MusicVideo> {
        if path.is_dir() {
            return match scanner::scan_music_videos(parser, path) {
                Ok(mut result) => {
                    for video in &mut result.items {
                        video.base_dir = root.to_path_buf();
                    }
                    result
                }
                Err(e) => {
                    tracing::warn!("Failed to scan {:?}: {}", path, e);
                    ScanResult::default()
                }
            };
        }

        let mut result = ScanResult::default();
        let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
            return result;
        };
        if path.is_file() {
            if let Some(video) = parser.parse_music_video(root, dir, &name.to_string_lossy()) {
                result.items.push(video);
            }
        }
        result
    }

    fn label(&self, item: &MusicVideo) -> String {
        format!("music video {:?}", item.path())
    }

    async fn process(&self, ctx: &PipelineContext, item: &MusicVideo) -> Result<Vec<MusicVideo>> {
        processor::process_music_video(ctx, item).await?;
        Ok(Vec::new())
    }
}

/// Run every category pipeline until one of them fails.
pub async fn run_collector(ctx: PipelineContext) -> Result<()> {
    let collector = &ctx.config.collector;
    if collector.movies_dir.is_empty()
        && collector.shows_dir.is_empty()
        && collector.music_videos_dir.is_empty()
    {
        return Err(crate::Error::Config(
            "no movies_dir, shows_dir or music_videos_dir configured".to_string(),
        ));
    }

    tokio::try_join!(
        run_pipeline(ctx.clone(), Arc::new(Movies)),
        run_pipeline(ctx.clone(), Arc::new(Shows)),
        run_pipeline(ctx.clone(), Arc::new(MusicVideos)),
    )?;
    Ok(())
}

/// Run one category's watcher, cron scanner and dispatcher.
pub async fn run_pipeline<C: Category>(ctx: PipelineContext, category: Arc<C>) -> Result<()> {
    let kind = category.kind();
    let roots = category.roots(&ctx.config).to_vec();
    if roots.is_empty() {
        tracing::info!("No {} roots configured", kind);
        return Ok(());
    }

    let capacity = ctx.config.collector.queue_capacity.max(2);
    let (job_tx, job_rx) = mpsc::channel::<Job<C::Item>>(capacity);
    let (dir_tx, dir_rx) = mpsc::channel::<PathBuf>(capacity);
    let reserve = category
        .reserve_half()
        .then(|| Arc::new(Semaphore::new(capacity / 2)));

    tracing::info!("Starting {} pipeline over {} root(s)", kind, roots.len());

    let watcher = tokio::spawn(run_watcher(
        ctx.clone(),
        category.clone(),
        roots.clone(),
        dir_rx,
        job_tx.clone(),
    ));
    let cron = tokio::spawn(run_cron(
        ctx.clone(),
        category.clone(),
        roots,
        reserve,
        dir_tx.clone(),
        job_tx.clone(),
    ));
    let dispatcher = tokio::spawn(run_dispatcher(ctx, category, job_rx, job_tx, dir_tx));

    let result = tokio::select! {
        res = watcher => res,
        res = cron => res,
        res = dispatcher => res,
    };
    result.map_err(|e| crate::Error::other(format!("{} pipeline task failed: {}", kind, e)))?
}

/// Watch discovered directories and enqueue settled items.
async fn run_watcher<C: Category>(
    ctx: PipelineContext,
    category: Arc<C>,
    roots: Vec<PathBuf>,
    mut dir_rx: mpsc::Receiver<PathBuf>,
    job_tx: mpsc::Sender<Job<C::Item>>,
) -> Result<()> {
    let kind = category.kind();
    let (event_tx, mut event_rx) = mpsc::channel::<PathBuf>(EVENT_BUFFER);
    let mut watcher = DirWatcher::new(event_tx)?;
    let mut settle = SettleTracker::new(ctx.config.collector.watch_settle_secs);
    let mut check_interval = tokio::time::interval(SETTLE_CHECK_INTERVAL);

    loop {
        tokio::select! {
            Some(dir) = dir_rx.recv() => {
                watcher.watch(&dir);
            }

            Some(path) = event_rx.recv() => {
                match resolve_item(&ctx.parser, kind, &roots, &path) {
                    Some((_, item)) => {
                        tracing::debug!("{} event {:?} -> {:?}", kind, path, item);
                        settle.touch(item);
                    }
                    None => tracing::debug!("Ignoring {} event {:?}", kind, path),
                }
            }

            _ = check_interval.tick() => {
                let dropped = watcher.prune_missing();
                if dropped > 0 {
                    tracing::debug!("{} watcher dropped {} removed dir(s)", kind, dropped);
                }
                for path in settle.take_settled(Instant::now()) {
                    let Some(root) = roots.iter().find(|r| path.starts_with(r)) else {
                        continue;
                    };
                    let resolved = category.resolve(&ctx.parser, root, &path);
                    for dir in resolved.watch_dirs {
                        watcher.watch(&dir);
                    }
                    for item in resolved.items {
                        tracing::info!("Watcher enqueues {}", category.label(&item));
                        if job_tx.send(Job::new(item)).await.is_err() {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

/// Full rescans at startup and on every interval tick.
async fn run_cron<C: Category>(
    ctx: PipelineContext,
    category: Arc<C>,
    roots: Vec<PathBuf>,
    reserve: Option<Arc<Semaphore>>,
    dir_tx: mpsc::Sender<PathBuf>,
    job_tx: mpsc::Sender<Job<C::Item>>,
) -> Result<()> {
    let kind = category.kind();
    let mut interval =
        tokio::time::interval(Duration::from_secs(ctx.config.collector.cron_seconds.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        let started = Instant::now();
        let mut enqueued = 0usize;

        for root in &roots {
            let parser = ctx.parser.clone();
            let scan_category = category.clone();
            let scan_root = root.clone();
            let scan = tokio::task::spawn_blocking(move || scan_category.scan(&parser, &scan_root)).await;

            let result = match scan {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => {
                    tracing::error!("Failed to scan {} root {:?}: {}", kind, root, e);
                    continue;
                }
                Err(e) => {
                    tracing::error!("Scan task for {:?} failed: {}", root, e);
                    continue;
                }
            };

            for dir in result.watch_dirs {
                if dir_tx.send(dir).await.is_err() {
                    return Ok(());
                }
            }

            match enqueue_scanned(result.items, reserve.as_ref(), &job_tx).await? {
                Some(count) => enqueued += count,
                None => return Ok(()),
            }
        }

        tracing::info!(
            "{} scan enqueued {} item(s) in {:.1}s",
            kind,
            enqueued,
            started.elapsed().as_secs_f32()
        );

        if ctx.config.kodi.clean_library && category.cleans_library() {
            if let Err(e) = ctx.media_center.clean().await {
                tracing::warn!("Media center clean failed: {}", e);
            }
        }
    }
}

/// Send scanned items to the queue, each holding a reservation permit when
/// the category reserves half the queue. `None` means the queue is closed.
async fn enqueue_scanned<T>(
    items: Vec<T>,
    reserve: Option<&Arc<Semaphore>>,
    job_tx: &mpsc::Sender<Job<T>>,
) -> Result<Option<usize>> {
    let mut enqueued = 0;
    for item in items {
        let permit = match reserve {
            Some(reserve) => Some(
                reserve
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|e| crate::Error::other(e.to_string()))?,
            ),
            None => None,
        };
        if job_tx.send(Job { item, permit }).await.is_err() {
            return Ok(None);
        }
        enqueued += 1;
    }
    Ok(Some(enqueued))
}

/// Hand queued items to bounded workers; follow-up items are enqueued from
/// the worker task so the dispatcher never waits on its own queue.
async fn run_dispatcher<C: Category>(
    ctx: PipelineContext,
    category: Arc<C>,
    mut job_rx: mpsc::Receiver<Job<C::Item>>,
    job_tx: mpsc::Sender<Job<C::Item>>,
    dir_tx: mpsc::Sender<PathBuf>,
) -> Result<()> {
    let workers = Arc::new(Semaphore::new(category.workers(&ctx.config).max(1)));

    while let Some(job) = job_rx.recv().await {
        let Job { item, permit } = job;
        drop(permit);

        let worker = workers
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| crate::Error::other(e.to_string()))?;

        let ctx = ctx.clone();
        let category = category.clone();
        let job_tx = job_tx.clone();
        let dir_tx = dir_tx.clone();
        tokio::spawn(async move {
            let label = category.label(&item);
            let follow_ups = match category.process(&ctx, &item).await {
                Ok(items) => items,
                Err(e) if e.is_not_found() => {
                    tracing::warn!("No match for {}: {}, retrying next cycle", label, e);
                    Vec::new()
                }
                Err(e) => {
                    tracing::error!("Failed to process {}: {}", label, e);
                    Vec::new()
                }
            };
            drop(worker);

            for item in follow_ups {
                for dir in category.watch_dirs(&item) {
                    let _ = dir_tx.send(dir).await;
                }
                if job_tx.send(Job::new(item)).await.is_err() {
                    break;
                }
            }
        });
    }
    Ok(())
}
