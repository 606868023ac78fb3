//! Kodi JSON-RPC preflight check.

use super::CheckResult;
use crate::models::config::KodiConfig;
use crate::services::kodi::KodiClient;

/// Check that the JSON-RPC endpoint answers a ping.
pub async fn check(config: &KodiConfig) -> CheckResult {
    let client = match KodiClient::new(config) {
        Ok(client) => client,
        Err(e) => return CheckResult::fail("Kodi", &e.to_string(), "Check the [kodi] section"),
    };

    match client.ping().await {
        Ok(true) => CheckResult::ok("Kodi", &format!("connected ({})", config.json_rpc)),
        Ok(false) => CheckResult::fail(
            "Kodi",
            "unexpected ping response",
            "Check that [kodi] json_rpc points at Kodi's /jsonrpc endpoint",
        ),
        Err(_) => CheckResult::fail(
            "Kodi",
            "connection failed",
            "Enable remote control over HTTP in Kodi and check [kodi] credentials",
        ),
    }
}
