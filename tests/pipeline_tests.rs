//! Integration tests for the per-item processors and the collector entry point.
//!
//! Tests cover:
//! - Show directory parsing through episode keys
//! - Show processing: sidecars, caches, NFOs and refresh requests
//! - Season migration once every listed episode is present
//! - Movie processing and bare file handling
//! - Music video probing, thumbnail and library scan
//! - Collector refusing to start without roots

mod common;

use common::{context, touch, FakeProvider};
use media_collector::core::episodes::scan_show_files;
use media_collector::core::parser::NameParser;
use media_collector::core::pipeline::run_collector;
use media_collector::core::processor::{process_movie, process_music_video, process_show};
use media_collector::models::config::Config;
use media_collector::models::search::{MovieDetail, SeasonSummary, TvDetail};
use media_collector::services::provider::RefreshRequest;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn show_provider(episode_count: u32) -> FakeProvider {
    FakeProvider {
        tv: TvDetail {
            id: 100,
            name: "Show Name".to_string(),
            original_name: "Show Name".to_string(),
            first_air_date: Some("2019-03-01".to_string()),
            poster_path: Some("/poster.jpg".to_string()),
            seasons: vec![SeasonSummary {
                season_number: 2,
                poster_path: Some("/s2.jpg".to_string()),
                episode_count,
            }],
            ..Default::default()
        },
        ..Default::default()
    }
}

fn show_source(root: &Path) -> std::path::PathBuf {
    let dir = root.join("Show.Name.S02.1080p");
    touch(&dir.join("E01.mkv"));
    touch(&dir.join("E02.mkv"));
    dir
}

#[test]
fn test_show_name_to_episode_keys() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("Show.Name.S02.1080p.WEB-DL");
    touch(&dir.join("E01.mkv"));
    touch(&dir.join("E02.mkv"));

    let parser = NameParser::new(&Config::default());
    let show = parser.parse_show_dir(tmp.path(), "Show.Name.S02.1080p.WEB-DL").unwrap();
    assert_eq!(show.name.title, "Show Name");
    assert_eq!(show.season, 2);

    let episodes = scan_show_files(&show).unwrap();
    let keys: Vec<String> = episodes.keys().map(|k| k.to_string()).collect();
    assert_eq!(keys, vec!["s02e01", "s02e02"]);
}

#[tokio::test]
async fn test_process_show_writes_metadata() {
    let tmp = TempDir::new().unwrap();
    let dir = show_source(tmp.path());

    let (ctx, fakes) = context(Config::default(), show_provider(2));
    let show = ctx.parser.parse_show_dir(tmp.path(), "Show.Name.S02.1080p").unwrap();

    let children = process_show(&ctx, &show).await.unwrap();
    assert!(children.is_empty());

    assert_eq!(fs::read_to_string(dir.join("tmdb/id.txt")).unwrap().trim(), "100");
    assert!(dir.join("tmdb/tv.json").exists());
    assert!(dir.join("tmdb/s02e01.json").exists());
    assert!(dir.join("tmdb/s02e02.json").exists());

    let tvshow = fs::read_to_string(dir.join("tvshow.nfo")).unwrap();
    assert!(tvshow.contains("<title>Show Name</title>"));
    assert!(dir.join("E01.nfo").exists());
    assert!(dir.join("E02.nfo").exists());
    assert!(dir.join("poster.jpg").exists());
    assert!(dir.join("season02-poster.jpg").exists());

    let refreshes = fakes.media_center.refreshes.lock().unwrap().clone();
    assert_eq!(refreshes.len(), 3);
    assert_eq!(
        refreshes[0],
        RefreshRequest::TvShow {
            title: "Show Name".to_string()
        }
    );
    assert!(refreshes.contains(&RefreshRequest::Episode {
        show: "Show Name".to_string(),
        season: 2,
        episode: 2,
    }));
}

#[tokio::test]
async fn test_process_show_twice_uses_caches() {
    let tmp = TempDir::new().unwrap();
    show_source(tmp.path());

    let (ctx, fakes) = context(Config::default(), show_provider(2));
    let show = ctx.parser.parse_show_dir(tmp.path(), "Show.Name.S02.1080p").unwrap();
    process_show(&ctx, &show).await.unwrap();

    // Second pass sees the id sidecar and every cache
    let show = ctx.parser.parse_show_dir(tmp.path(), "Show.Name.S02.1080p").unwrap();
    assert_eq!(show.tv_id, 100);
    process_show(&ctx, &show).await.unwrap();

    assert_eq!(fakes.provider.queries.lock().unwrap().len(), 1);
    assert_eq!(fakes.media_center.refreshes.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_finished_season_moves_to_storage() {
    let tmp = TempDir::new().unwrap();
    let incoming = tmp.path().join("incoming");
    let source = show_source(&incoming);
    let storage = tmp.path().join("storage");

    let mut config = Config::default();
    config.collector.move_to_storage = true;
    config.collector.shows_storage_dir = Some(storage.clone());

    let (ctx, _fakes) = context(config, show_provider(2));
    let show = ctx.parser.parse_show_dir(&incoming, "Show.Name.S02.1080p").unwrap();
    process_show(&ctx, &show).await.unwrap();

    let show_dir = storage.join("Show Name (2019)");
    assert!(!source.exists());
    assert!(show_dir.join("S02").join("E01.mkv").exists());
    assert!(show_dir.join("S02").join("E02.nfo").exists());
    assert!(show_dir.join("tvshow.nfo").exists());
    assert!(show_dir.join("season02-poster.jpg").exists());
    assert!(show_dir.join("tmdb").join("id.txt").exists());
}

#[tokio::test]
async fn test_incomplete_season_stays() {
    let tmp = TempDir::new().unwrap();
    let source = show_source(tmp.path());
    let storage = tmp.path().join("storage");

    let mut config = Config::default();
    config.collector.move_to_storage = true;
    config.collector.shows_storage_dir = Some(storage.clone());

    let (ctx, _fakes) = context(config, show_provider(10));
    let show = ctx.parser.parse_show_dir(tmp.path(), "Show.Name.S02.1080p").unwrap();
    process_show(&ctx, &show).await.unwrap();

    assert!(source.join("E01.mkv").exists());
    assert!(!storage.join("Show Name (2019)").exists());
}

#[tokio::test]
async fn test_process_movie_folder() {
    let tmp = TempDir::new().unwrap();
    touch(&tmp.path().join("Heat.1995").join("heat.mkv"));

    let provider = FakeProvider {
        movie: MovieDetail {
            id: 949,
            title: "Heat".to_string(),
            original_title: "Heat".to_string(),
            release_date: Some("1995-12-15".to_string()),
            poster_path: Some("/heat.jpg".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let (ctx, fakes) = context(Config::default(), provider);
    let movie = ctx.parser.parse_movie_entry(tmp.path(), "Heat.1995", true).unwrap();

    process_movie(&ctx, &movie).await.unwrap();

    let dir = tmp.path().join("Heat.1995");
    assert_eq!(fs::read_to_string(dir.join("tmdb/id.txt")).unwrap().trim(), "949");
    assert!(dir.join("tmdb/movie.json").exists());
    // A single video names the artwork, mode 1 keeps movie.nfo
    assert!(dir.join("movie.nfo").exists());
    assert!(dir.join("heat-poster.jpg").exists());
    assert_eq!(
        fakes.media_center.refreshes.lock().unwrap().as_slice(),
        &[RefreshRequest::Movie {
            title: "Heat".to_string()
        }]
    );
}

#[tokio::test]
async fn test_process_music_video() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    touch(&root.join("Artist - Song.mp4"));

    let (ctx, fakes) = context(Config::default(), FakeProvider::default());
    let video = ctx.parser.parse_music_video(root, root, "Artist - Song.mp4").unwrap();

    process_music_video(&ctx, &video).await.unwrap();

    let nfo = fs::read_to_string(root.join("Artist - Song.nfo")).unwrap();
    assert!(nfo.contains("<title>Artist - Song</title>"));
    assert!(nfo.contains("<width>1920</width>"));
    assert!(root.join("Artist - Song-thumb.jpg").exists());
    assert!(root.join("tmdb").join("Artist - Song.json").exists());
    assert_eq!(
        fakes.media_center.scans.lock().unwrap().as_slice(),
        &[Some(root.to_path_buf())]
    );

    // Complete videos are left alone
    process_music_video(&ctx, &video).await.unwrap();
    assert_eq!(fakes.prober.probed.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_collector_requires_roots() {
    let (ctx, _fakes) = context(Config::default(), FakeProvider::default());
    let err = run_collector(ctx).await.unwrap_err();
    assert!(matches!(err, media_collector::Error::Config(_)));
}
