//! TMDB API preflight check.

use super::CheckResult;
use crate::models::config::TmdbConfig;
use crate::services::tmdb::TmdbClient;

const NAME: &str = "TMDB API";

/// The key is present and accepted by TMDB.
pub async fn check(config: &TmdbConfig) -> CheckResult {
    let client = match TmdbClient::from_config(config) {
        Ok(client) => client,
        Err(crate::Error::TmdbApiKeyMissing) => {
            return CheckResult::fail(
                NAME,
                "API key not configured",
                "Set [tmdb] api_key or the TMDB_API_KEY environment variable",
            )
        }
        Err(e) => return CheckResult::fail(NAME, &e.to_string(), "Check the [tmdb] section"),
    };

    match client.verify_api_key().await {
        Ok(true) => CheckResult::ok(NAME, &format!("connected ({})", config.language)),
        Ok(false) => CheckResult::fail(
            NAME,
            "API key rejected",
            "Check [tmdb] api_key or the TMDB_API_KEY environment variable",
        ),
        Err(e) => {
            tracing::debug!("TMDB preflight request failed: {}", e);
            CheckResult::fail(NAME, "connection failed", "Check your network connection")
        }
    }
}
