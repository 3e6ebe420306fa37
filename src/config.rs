//! Configuration for the Kalshi market monitor

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Monitor configuration loaded from the environment.
///
/// Constructed once at process start and passed by reference into the poll
/// loops; there is no ambient global client or config state.
#[derive(Debug, Clone)]
pub struct Config {
    /// Kalshi API key id sent with every signed request
    pub api_key_id: String,

    /// Path to the PEM private key used for request signing
    pub private_key_file: PathBuf,

    /// Base URL of the trade API
    pub api_base: String,

    /// Directory where monitor log files are written
    pub log_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing credential material is a fatal startup condition, surfaced
    /// here before any network call is attempted.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let api_key_id = env::var("KALSHI_API_KEY_ID")
            .ok()
            .filter(|s| !s.is_empty())
            .context("KALSHI_API_KEY_ID not set (required for API request signing)")?;

        let private_key_file = env::var("KALSHI_PRIVATE_KEY_FILE")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .context("KALSHI_PRIVATE_KEY_FILE not set (path to the PEM signing key)")?;

        let api_base = env::var("KALSHI_API_BASE")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| KalshiApi::BASE_URL.to_string());

        let log_dir = env::var("MONITOR_LOG_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("monitor_logs"));

        Ok(Self {
            api_key_id,
            private_key_file,
            api_base,
            log_dir,
        })
    }
}

/// Kalshi trade API endpoints
pub struct KalshiApi;

impl KalshiApi {
    pub const BASE_URL: &'static str = "https://api.elections.kalshi.com";

    /// Every API path carries this prefix; the signed message covers the
    /// full path, query parameters excluded.
    pub const PREFIX: &'static str = "/trade-api/v2";

    pub fn markets_path() -> String {
        format!("{}/markets", Self::PREFIX)
    }

    pub fn market_path(ticker: &str) -> String {
        format!("{}/markets/{}", Self::PREFIX, ticker)
    }

    pub fn series_path() -> String {
        format!("{}/series", Self::PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_fail_before_any_network_call() {
        env::remove_var("KALSHI_API_KEY_ID");
        env::remove_var("KALSHI_PRIVATE_KEY_FILE");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("KALSHI_API_KEY_ID"));

        env::set_var("KALSHI_API_KEY_ID", "key-id");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("KALSHI_PRIVATE_KEY_FILE"));

        env::set_var("KALSHI_PRIVATE_KEY_FILE", "/tmp/key.pem");
        let config = Config::from_env().unwrap();
        assert_eq!(config.api_key_id, "key-id");
        assert_eq!(config.api_base, KalshiApi::BASE_URL);

        env::remove_var("KALSHI_API_KEY_ID");
        env::remove_var("KALSHI_PRIVATE_KEY_FILE");
    }

    #[test]
    fn market_path_embeds_ticker() {
        assert_eq!(
            KalshiApi::market_path("KXTEST-26JAN-ABC"),
            "/trade-api/v2/markets/KXTEST-26JAN-ABC"
        );
    }
}
