//! Kodi JSON-RPC client.
//!
//! Refresh requests look the item up by original title first, since Kodi's
//! refresh methods take library ids.

use crate::models::config::KodiConfig;
use crate::services::provider::{MediaCenter, RefreshRequest};
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Kodi JSON-RPC client. A disabled config turns every call into a no-op.
pub struct KodiClient {
    config: KodiConfig,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl KodiClient {
    pub fn new(config: &KodiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            config: config.clone(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enable
    }

    /// Send one JSON-RPC call and return its `result`.
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
        });

        let mut request = self.client.post(&self.config.json_rpc).json(&body);
        if !self.config.username.is_empty() {
            request = request.basic_auth(&self.config.username, Some(&self.config.password));
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(crate::Error::MediaCenter(format!("{} returned {}", method, status)));
        }

        let resp: RpcResponse = resp.json().await?;
        if let Some(err) = resp.error {
            return Err(crate::Error::MediaCenter(format!(
                "{} failed ({}): {}",
                method, err.code, err.message
            )));
        }
        Ok(resp.result.unwrap_or(Value::Null))
    }

    /// Check the endpoint answers `JSONRPC.Ping`.
    pub async fn ping(&self) -> Result<bool> {
        let result = self.call("JSONRPC.Ping", json!({})).await?;
        Ok(result.as_str() == Some("pong"))
    }

    /// Library id of the first item matching an original title.
    async fn find_id(&self, method: &str, list_key: &str, id_key: &str, title: &str) -> Result<Option<u64>> {
        let result = self
            .call(
                method,
                json!({
                    "filter": {"field": "originaltitle", "operator": "is", "value": title},
                    "limits": {"start": 0, "end": 1},
                }),
            )
            .await?;
        Ok(first_id(&result, list_key, id_key))
    }

    async fn refresh_movie(&self, title: &str) -> Result<()> {
        match self.find_id("VideoLibrary.GetMovies", "movies", "movieid", title).await? {
            Some(id) => {
                self.call("VideoLibrary.RefreshMovie", json!({"movieid": id, "ignorenfo": false}))
                    .await?;
            }
            None => tracing::debug!("Kodi has no movie {:?} yet", title),
        }
        Ok(())
    }

    async fn refresh_show(&self, title: &str) -> Result<()> {
        match self.find_id("VideoLibrary.GetTVShows", "tvshows", "tvshowid", title).await? {
            Some(id) => {
                self.call(
                    "VideoLibrary.RefreshTVShow",
                    json!({"tvshowid": id, "ignorenfo": false}),
                )
                .await?;
            }
            None => tracing::debug!("Kodi has no show {:?} yet", title),
        }
        Ok(())
    }

    async fn refresh_episode(&self, show: &str, season: u32, episode: u32) -> Result<()> {
        let Some(show_id) = self
            .find_id("VideoLibrary.GetTVShows", "tvshows", "tvshowid", show)
            .await?
        else {
            tracing::debug!("Kodi has no show {:?} yet", show);
            return Ok(());
        };

        let result = self
            .call(
                "VideoLibrary.GetEpisodes",
                json!({
                    "tvshowid": show_id,
                    "season": season,
                    "filter": {"field": "episode", "operator": "is", "value": episode.to_string()},
                }),
            )
            .await?;

        match first_id(&result, "episodes", "episodeid") {
            Some(id) => {
                self.call(
                    "VideoLibrary.RefreshEpisode",
                    json!({"episodeid": id, "ignorenfo": false}),
                )
                .await?;
            }
            None => tracing::debug!("Kodi has no {} s{:02}e{:02} yet", show, season, episode),
        }
        Ok(())
    }
}

fn first_id(result: &Value, list_key: &str, id_key: &str) -> Option<u64> {
    result
        .get(list_key)?
        .as_array()?
        .first()?
        .get(id_key)?
        .as_u64()
}

#[async_trait]
impl MediaCenter for KodiClient {
    async fn refresh(&self, request: RefreshRequest) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        match request {
            RefreshRequest::Movie { title } => self.refresh_movie(&title).await,
            RefreshRequest::TvShow { title } => self.refresh_show(&title).await,
            RefreshRequest::Episode {
                show,
                season,
                episode,
            } => self.refresh_episode(&show, season, episode).await,
        }
    }

    async fn scan(&self, path: Option<&Path>) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        let params = match path {
            Some(path) => json!({"directory": path.to_string_lossy(), "showdialogs": false}),
            None => json!({"showdialogs": false}),
        };
        self.call("VideoLibrary.Scan", params).await?;
        Ok(())
    }

    async fn clean(&self) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        self.call("VideoLibrary.Clean", json!({"showdialogs": false})).await?;
        Ok(())
    }
}
