//! WebDAV client for removing migrated source folders.

use crate::models::config::WebDavConfig;
use crate::models::media::MediaKind;
use crate::services::provider::RemoteStorage;
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// WebDAV client.
pub struct WebDavClient {
    config: WebDavConfig,
    client: reqwest::Client,
}

impl WebDavClient {
    pub fn new(config: &WebDavConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(CONNECTION_TIMEOUT)
            .build()?;
        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    /// Enabled and fully configured.
    pub fn is_enabled(&self) -> bool {
        let c = &self.config;
        c.enable
            && !c.url.is_empty()
            && !c.username.is_empty()
            && !c.movies_dir.is_empty()
            && !c.shows_dir.is_empty()
    }

    /// Collection URL of a top-level folder.
    pub fn folder_url(&self, kind: MediaKind, name: &str) -> Result<String> {
        let root = match kind {
            MediaKind::Movies => &self.config.movies_dir,
            MediaKind::Shows => &self.config.shows_dir,
            MediaKind::MusicVideos => {
                return Err(crate::Error::RemoteStorage(
                    "music videos have no remote folder".to_string(),
                ))
            }
        };

        let root = root
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        Ok(format!(
            "{}/{}/{}/",
            self.config.url.trim_end_matches('/'),
            root,
            urlencoding::encode(name)
        ))
    }
}

#[async_trait]
impl RemoteStorage for WebDavClient {
    async fn delete_folder(&self, kind: MediaKind, name: &str) -> Result<()> {
        if !self.is_enabled() {
            return Err(crate::Error::RemoteStorage(
                "webdav is not configured".to_string(),
            ));
        }
        if name.is_empty() || name.contains('/') {
            return Err(crate::Error::RemoteStorage(format!(
                "refusing to delete {:?}",
                name
            )));
        }

        let url = self.folder_url(kind, name)?;
        let resp = self
            .client
            .delete(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            tracing::info!("Deleted remote folder {}", url);
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(crate::Error::RemoteStorage(format!(
            "DELETE {} failed ({}): {}",
            url, status, body
        )))
    }
}
