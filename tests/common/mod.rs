//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use media_collector::core::context::PipelineContext;
use media_collector::models::config::Config;
use media_collector::models::media::{AudioStream, MediaKind, ProbeInfo, VideoStream};
use media_collector::models::search::{
    EpisodeDetail, EpisodeGroupDetail, MovieDetail, QueryVariant, SearchKind, SearchResult,
    TvDetail,
};
use media_collector::services::provider::{
    MediaCenter, MetadataProvider, RefreshRequest, RemoteStorage, VideoProber,
};
use media_collector::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Provider returning one search hit and fixed details.
#[derive(Default)]
pub struct FakeProvider {
    pub movie: MovieDetail,
    pub tv: TvDetail,
    pub queries: Mutex<Vec<(SearchKind, String)>>,
    pub downloads: Mutex<Vec<String>>,
}

#[async_trait]
impl MetadataProvider for FakeProvider {
    async fn search(&self, kind: SearchKind, query: &QueryVariant) -> Result<Vec<SearchResult>> {
        self.queries.lock().unwrap().push((kind, query.title.clone()));
        let (id, name) = match kind {
            SearchKind::Movie => (self.movie.id, self.movie.title.clone()),
            SearchKind::Tv => (self.tv.id, self.tv.name.clone()),
        };
        Ok(vec![SearchResult {
            id,
            name: name.clone(),
            original_name: name,
            ..Default::default()
        }])
    }

    async fn movie_detail(&self, _id: u64) -> Result<MovieDetail> {
        Ok(self.movie.clone())
    }

    async fn tv_detail(&self, _id: u64) -> Result<TvDetail> {
        Ok(self.tv.clone())
    }

    async fn episode_group(&self, group_id: &str) -> Result<EpisodeGroupDetail> {
        Err(media_collector::Error::NotFound(group_id.to_string()))
    }

    async fn episode_detail(&self, _tv_id: u64, season: u32, episode: u32) -> Result<EpisodeDetail> {
        Ok(EpisodeDetail {
            id: u64::from(season * 100 + episode),
            name: format!("Episode {}", episode),
            season_number: season,
            episode_number: episode,
            ..Default::default()
        })
    }

    async fn download_image(&self, image_path: &str, target: &Path) -> Result<()> {
        self.downloads.lock().unwrap().push(image_path.to_string());
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, b"image")?;
        Ok(())
    }
}

/// Media center recording every request.
#[derive(Default)]
pub struct FakeMediaCenter {
    pub refreshes: Mutex<Vec<RefreshRequest>>,
    pub scans: Mutex<Vec<Option<PathBuf>>>,
    pub cleans: Mutex<usize>,
}

#[async_trait]
impl MediaCenter for FakeMediaCenter {
    async fn refresh(&self, request: RefreshRequest) -> Result<()> {
        self.refreshes.lock().unwrap().push(request);
        Ok(())
    }

    async fn scan(&self, path: Option<&Path>) -> Result<()> {
        self.scans.lock().unwrap().push(path.map(Path::to_path_buf));
        Ok(())
    }

    async fn clean(&self) -> Result<()> {
        *self.cleans.lock().unwrap() += 1;
        Ok(())
    }
}

/// Remote storage recording deleted folders.
#[derive(Default)]
pub struct FakeRemote {
    pub deleted: Mutex<Vec<(MediaKind, String)>>,
}

#[async_trait]
impl RemoteStorage for FakeRemote {
    async fn delete_folder(&self, kind: MediaKind, name: &str) -> Result<()> {
        self.deleted.lock().unwrap().push((kind, name.to_string()));
        Ok(())
    }
}

/// Prober returning a fixed 1080p stream and writing a dummy thumbnail.
#[derive(Default)]
pub struct FakeProber {
    pub probed: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl VideoProber for FakeProber {
    async fn probe(&self, video: &Path) -> Result<ProbeInfo> {
        self.probed.lock().unwrap().push(video.to_path_buf());
        Ok(ProbeInfo {
            duration: 245.0,
            video: VideoStream {
                codec: "h264".to_string(),
                width: 1920,
                height: 1080,
                aspect: "16:9".to_string(),
            },
            audio: AudioStream {
                codec: "aac".to_string(),
                channels: 2,
                language: "und".to_string(),
            },
        })
    }

    async fn thumbnail(&self, _video: &Path, target: &Path) -> Result<()> {
        fs::write(target, b"thumb")?;
        Ok(())
    }
}

/// Fakes handed to a context, kept for assertions.
pub struct Fakes {
    pub provider: Arc<FakeProvider>,
    pub media_center: Arc<FakeMediaCenter>,
    pub remote: Arc<FakeRemote>,
    pub prober: Arc<FakeProber>,
}

pub fn context(config: Config, provider: FakeProvider) -> (PipelineContext, Fakes) {
    let fakes = Fakes {
        provider: Arc::new(provider),
        media_center: Arc::new(FakeMediaCenter::default()),
        remote: Arc::new(FakeRemote::default()),
        prober: Arc::new(FakeProber::default()),
    };
    let ctx = PipelineContext::with_services(
        config,
        fakes.provider.clone(),
        fakes.media_center.clone(),
        fakes.remote.clone(),
        fakes.prober.clone(),
    );
    (ctx, fakes)
}

pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"x").unwrap();
}
