//! Integration tests for the per-category dispatch loop.
//!
//! Tests cover:
//! - Worker semaphore limiting in-flight items below the queued count
//! - Follow-up items returned by processing being enqueued and processed
//! - A season-range collection fanning out into its season folders

mod common;

use async_trait::async_trait;
use common::{context, touch, FakeProvider};
use media_collector::core::context::PipelineContext;
use media_collector::core::parser::NameParser;
use media_collector::core::pipeline::{run_pipeline, Category, Shows};
use media_collector::core::processor::process_show;
use media_collector::core::scanner::ScanResult;
use media_collector::models::config::Config;
use media_collector::models::media::MediaKind;
use media_collector::models::search::{SeasonSummary, TvDetail};
use media_collector::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Category over plain numbers that records how many run at once.
#[derive(Default)]
struct Counting {
    items: Vec<u32>,
    follow_ups: Vec<(u32, Vec<u32>)>,
    workers: usize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    processed: Mutex<Vec<u32>>,
}

#[async_trait]
impl Category for Counting {
    type Item = u32;

    fn kind(&self) -> MediaKind {
        MediaKind::Movies
    }

    fn roots<'a>(&self, config: &'a Config) -> &'a [PathBuf] {
        &config.collector.movies_dir
    }

    fn workers(&self, _config: &Config) -> usize {
        self.workers
    }

    fn cleans_library(&self) -> bool {
        false
    }

    fn scan(&self, _parser: &NameParser, _root: &Path) -> Result<ScanResult<u32>> {
        Ok(ScanResult {
            items: self.items.clone(),
            watch_dirs: Vec::new(),
        })
    }

    fn resolve(&self, _parser: &NameParser, _root: &Path, _path: &Path) -> ScanResult<u32> {
        ScanResult::default()
    }

    fn label(&self, item: &u32) -> String {
        item.to_string()
    }

    async fn process(&self, _ctx: &PipelineContext, item: &u32) -> Result<Vec<u32>> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(40)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.processed.lock().unwrap().push(*item);

        Ok(self
            .follow_ups
            .iter()
            .find(|(parent, _)| parent == item)
            .map(|(_, children)| children.clone())
            .unwrap_or_default())
    }
}

fn counting_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.collector.movies_dir = vec![root.to_path_buf()];
    config.collector.queue_capacity = 16;
    config
}

async fn wait_for(mut done: impl FnMut() -> bool) -> bool {
    for _ in 0..500 {
        if done() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    done()
}

#[tokio::test]
async fn test_workers_bound_concurrency() {
    let tmp = TempDir::new().unwrap();
    let (ctx, _fakes) = context(counting_config(tmp.path()), FakeProvider::default());
    let category = Arc::new(Counting {
        items: (0..8).collect(),
        workers: 2,
        ..Default::default()
    });

    let pipeline = tokio::spawn(run_pipeline(ctx, category.clone()));
    assert!(wait_for(|| category.processed.lock().unwrap().len() == 8).await);
    pipeline.abort();

    assert_eq!(category.peak.load(Ordering::SeqCst), 2);
    let mut processed = category.processed.lock().unwrap().clone();
    processed.sort_unstable();
    assert_eq!(processed, (0..8).collect::<Vec<u32>>());
}

#[tokio::test]
async fn test_single_worker_runs_items_one_at_a_time() {
    let tmp = TempDir::new().unwrap();
    let (ctx, _fakes) = context(counting_config(tmp.path()), FakeProvider::default());
    let category = Arc::new(Counting {
        items: (0..4).collect(),
        workers: 1,
        ..Default::default()
    });

    let pipeline = tokio::spawn(run_pipeline(ctx, category.clone()));
    assert!(wait_for(|| category.processed.lock().unwrap().len() == 4).await);
    pipeline.abort();

    assert_eq!(category.peak.load(Ordering::SeqCst), 1);
    assert_eq!(*category.processed.lock().unwrap(), vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn test_follow_ups_are_processed() {
    let tmp = TempDir::new().unwrap();
    let (ctx, _fakes) = context(counting_config(tmp.path()), FakeProvider::default());
    let category = Arc::new(Counting {
        items: vec![1],
        follow_ups: vec![(1, vec![10, 11]), (11, vec![110])],
        workers: 2,
        ..Default::default()
    });

    let pipeline = tokio::spawn(run_pipeline(ctx, category.clone()));
    assert!(wait_for(|| category.processed.lock().unwrap().len() == 4).await);
    pipeline.abort();

    let processed = category.processed.lock().unwrap().clone();
    assert_eq!(processed[0], 1);
    assert!(processed.contains(&10));
    assert!(processed.contains(&11));
    assert_eq!(processed[3], 110);
}

fn friends_provider() -> FakeProvider {
    FakeProvider {
        tv: TvDetail {
            id: 1668,
            name: "Friends".to_string(),
            original_name: "Friends".to_string(),
            first_air_date: Some("1994-09-22".to_string()),
            seasons: vec![
                SeasonSummary {
                    season_number: 1,
                    poster_path: None,
                    episode_count: 24,
                },
                SeasonSummary {
                    season_number: 2,
                    poster_path: None,
                    episode_count: 24,
                },
            ],
            ..Default::default()
        },
        ..Default::default()
    }
}

fn friends_collection(root: &Path) -> PathBuf {
    let collection = root.join("Friends.S01-S02");
    touch(&collection.join("Friends.S01").join("E01.mkv"));
    touch(&collection.join("Friends.S02").join("E01.mkv"));
    collection
}

#[tokio::test]
async fn test_collection_returns_seasons() {
    let tmp = TempDir::new().unwrap();
    let collection = friends_collection(tmp.path());

    let (ctx, fakes) = context(Config::default(), friends_provider());
    let show = ctx.parser.parse_show_dir(tmp.path(), "Friends.S01-S02").unwrap();
    assert!(show.is_collection);

    let children = process_show(&ctx, &show).await.unwrap();
    let seasons: Vec<u32> = children.iter().map(|s| s.season).collect();
    assert_eq!(seasons, vec![1, 2]);
    assert!(children.iter().all(|s| s.tv_id == 1668));
    assert!(children.iter().all(|s| s.full_dir().starts_with(&collection)));

    assert!(collection.join("tvshow.nfo").exists());
    assert!(!collection.join("Friends.S01").join("E01.nfo").exists());
    assert_eq!(fakes.provider.queries.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_collection_seasons_processed_by_pipeline() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("shows");
    let collection = friends_collection(&root);

    let mut config = Config::default();
    config.collector.shows_dir = vec![root.clone()];
    config.collector.queue_capacity = 4;
    let (ctx, fakes) = context(config, friends_provider());

    let pipeline = tokio::spawn(run_pipeline(ctx, Arc::new(Shows)));
    let season_one = collection.join("Friends.S01");
    let season_two = collection.join("Friends.S02");
    assert!(
        wait_for(|| season_one.join("E01.nfo").exists() && season_two.join("E01.nfo").exists())
            .await
    );
    pipeline.abort();

    for season in [&season_one, &season_two] {
        assert!(season.join("tvshow.nfo").exists());
        assert!(season.join("tmdb/tv.json").exists());
    }
    assert_eq!(
        fs::read_to_string(collection.join("tmdb/id.txt")).unwrap().trim(),
        "1668"
    );
    // Seasons inherit the collection's id, so only the collection searches
    assert_eq!(fakes.provider.queries.lock().unwrap().len(), 1);
}
