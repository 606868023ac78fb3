//! Context shared by every pipeline activity.

use crate::core::parser::NameParser;
use crate::models::config::Config;
use crate::services::ffprobe::FfmpegProber;
use crate::services::kodi::KodiClient;
use crate::services::provider::{MediaCenter, MetadataProvider, RemoteStorage, VideoProber};
use crate::services::tmdb::TmdbClient;
use crate::services::webdav::WebDavClient;
use crate::Result;
use std::sync::Arc;

/// Read-only configuration plus the collaborators, passed to every operation.
#[derive(Clone)]
pub struct PipelineContext {
    pub config: Arc<Config>,
    pub parser: Arc<NameParser>,
    pub provider: Arc<dyn MetadataProvider>,
    pub media_center: Arc<dyn MediaCenter>,
    pub remote: Arc<dyn RemoteStorage>,
    pub prober: Arc<dyn VideoProber>,
}

impl PipelineContext {
    /// Context wired to the real TMDB, Kodi, WebDAV and ffmpeg clients.
    pub fn from_config(config: Config) -> Result<Self> {
        let provider = TmdbClient::from_config(&config.tmdb)?;
        let media_center = KodiClient::new(&config.kodi)?;
        let remote = WebDavClient::new(&config.webdav)?;
        let prober = FfmpegProber::new(&config.ffmpeg);

        Ok(Self {
            parser: Arc::new(NameParser::new(&config)),
            config: Arc::new(config),
            provider: Arc::new(provider),
            media_center: Arc::new(media_center),
            remote: Arc::new(remote),
            prober: Arc::new(prober),
        })
    }

    /// Context with caller-supplied collaborators.
    pub fn with_services(
        config: Config,
        provider: Arc<dyn MetadataProvider>,
        media_center: Arc<dyn MediaCenter>,
        remote: Arc<dyn RemoteStorage>,
        prober: Arc<dyn VideoProber>,
    ) -> Self {
        Self {
            parser: Arc::new(NameParser::new(&config)),
            config: Arc::new(config),
            provider,
            media_center,
            remote,
            prober,
        }
    }
}
