//! TMDB API client.

use crate::models::config::TmdbConfig;
use crate::models::search::{
    EpisodeDetail, EpisodeGroupDetail, MovieDetail, QueryVariant, SearchKind, SearchResponse,
    SearchResult, TvDetail,
};
use crate::services::provider::MetadataProvider;
use crate::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Languages requested for logos.
const IMAGE_LANGUAGES: &str = "zh,en,null";

/// TMDB API client.
pub struct TmdbClient {
    api_key: String,
    language: String,
    image_host: String,
    /// Whether to use Bearer token authentication (API v4 style)
    use_bearer: bool,
    client: reqwest::Client,
}

impl TmdbClient {
    /// Create a client from the `[tmdb]` section.
    /// Supports both API key (v3) and Bearer token (v4) formats.
    pub fn from_config(config: &TmdbConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(crate::Error::TmdbApiKeyMissing)?;

        // Bearer tokens start with "eyJ" (base64 encoded JWT header)
        let use_bearer = api_key.starts_with("eyJ");

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            api_key,
            language: config.language.clone(),
            image_host: config.image_host.trim_end_matches('/').to_string(),
            use_bearer,
            client,
        })
    }

    /// Build a request with proper authentication.
    fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        if self.use_bearer {
            request.header("Authorization", format!("Bearer {}", self.api_key))
        } else {
            request
        }
    }

    /// Build URL with optional api_key parameter (only for v3 style).
    fn build_url(&self, path: &str, extra_params: &str) -> String {
        if self.use_bearer {
            format!(
                "{}/{}?language={}{}",
                TMDB_BASE_URL, path, self.language, extra_params
            )
        } else {
            format!(
                "{}/{}?api_key={}&language={}{}",
                TMDB_BASE_URL, path, self.api_key, self.language, extra_params
            )
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, extra_params: &str) -> Result<T> {
        let url = self.build_url(path, extra_params);
        let resp = self.build_request(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(crate::Error::Tmdb(format!("{} returned {}", path, status)));
        }
        Ok(resp.json().await?)
    }

    /// Verify API key is valid.
    pub async fn verify_api_key(&self) -> Result<bool> {
        let url = if self.use_bearer {
            format!("{}/authentication", TMDB_BASE_URL)
        } else {
            format!("{}/authentication?api_key={}", TMDB_BASE_URL, self.api_key)
        };

        match self.build_request(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Original-size image URL.
    pub fn image_url(&self, image_path: &str) -> String {
        format!("{}/t/p/original{}", self.image_host, image_path)
    }
}

/// Query string for one search variant.
fn search_params(kind: SearchKind, query: &QueryVariant) -> String {
    let year_param = match (kind, query.year) {
        (SearchKind::Movie, Some(y)) => format!("&year={}&primary_release_year={}", y, y),
        (SearchKind::Tv, Some(y)) => format!("&first_air_date_year={}", y),
        (_, None) => String::new(),
    };
    format!(
        "&query={}&page=1&include_adult=true{}",
        urlencoding::encode(&query.title),
        year_param
    )
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn search(&self, kind: SearchKind, query: &QueryVariant) -> Result<Vec<SearchResult>> {
        let path = match kind {
            SearchKind::Movie => "search/movie",
            SearchKind::Tv => "search/tv",
        };
        let resp: SearchResponse = self.get_json(path, &search_params(kind, query)).await?;
        Ok(resp.results)
    }

    async fn movie_detail(&self, id: u64) -> Result<MovieDetail> {
        self.get_json(
            &format!("movie/{}", id),
            &format!(
                "&append_to_response=credits,images&include_image_language={}",
                IMAGE_LANGUAGES
            ),
        )
        .await
    }

    async fn tv_detail(&self, id: u64) -> Result<TvDetail> {
        self.get_json(
            &format!("tv/{}", id),
            &format!(
                "&append_to_response=credits,images&include_image_language={}",
                IMAGE_LANGUAGES
            ),
        )
        .await
    }

    async fn episode_group(&self, group_id: &str) -> Result<EpisodeGroupDetail> {
        self.get_json(
            &format!("tv/episode_group/{}", urlencoding::encode(group_id)),
            "",
        )
        .await
    }

    async fn episode_detail(&self, tv_id: u64, season: u32, episode: u32) -> Result<EpisodeDetail> {
        self.get_json(
            &format!("tv/{}/season/{}/episode/{}", tv_id, season, episode),
            "",
        )
        .await
    }

    /// Download an original-size image.
    async fn download_image(&self, image_path: &str, target: &Path) -> Result<()> {
        let url = self.image_url(image_path);
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(crate::Error::Tmdb(format!("{} returned {}", url, status)));
        }
        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Err(crate::Error::Tmdb(format!("{} returned an empty body", url)));
        }

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(target, &bytes).await?;
        tracing::debug!("Downloaded {} to {:?}", url, target);
        Ok(())
    }
}
