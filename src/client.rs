//! Signed HTTP client for the Kalshi trade API
//!
//! Thin collaborator around reqwest: builds signed GET requests, decodes
//! JSON, and surfaces typed errors. Retries, backoff, and connection
//! management are intentionally absent; the poll loops log a failed cycle
//! and continue at the next tick.

use crate::config::{Config, KalshiApi};
use crate::pagination::paginate;
use crate::types::{Market, MarketsPage, SeriesInfo, SeriesPage};
use anyhow::Context;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use reqwest::Client;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::pss::BlindedSigningKey;
use rsa::sha2::Sha256;
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use rsa::RsaPrivateKey;
use serde::de::DeserializeOwned;
use std::fs;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Page size for market listings.
const MARKET_PAGE_LIMIT: u32 = 100;

/// Page size for the series listing.
const SERIES_PAGE_LIMIT: u32 = 1000;

/// Safety ceiling on pagination. A listing that still returns a cursor
/// after this many pages is treated as a broken upstream contract.
const MAX_PAGES: u32 = 100;

/// Errors from trade API calls.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("request signing failed: {0}")]
    Signing(#[from] rsa::signature::Error),

    #[error("pagination exceeded {pages} pages without exhausting the listing")]
    PaginationExhausted { pages: u32 },
}

/// `get_market` wraps the payload in a `market` envelope.
#[derive(Debug, serde::Deserialize)]
struct MarketEnvelope {
    market: Market,
}

/// Signed client for the Kalshi trade API.
pub struct KalshiClient {
    http: Client,
    base_url: String,
    key_id: String,
    signing_key: BlindedSigningKey<Sha256>,
}

impl KalshiClient {
    /// Builds a client from configuration.
    ///
    /// Reads and parses the PEM signing key; a missing or malformed key is
    /// fatal here, before any network call is attempted.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let pem = fs::read_to_string(&config.private_key_file).with_context(|| {
            format!(
                "failed to read private key file {:?}",
                config.private_key_file
            )
        })?;

        let key = RsaPrivateKey::from_pkcs8_pem(&pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(&pem))
            .context("private key is not valid PKCS#8 or PKCS#1 PEM")?;

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: config.api_base.clone(),
            key_id: config.api_key_id.clone(),
            signing_key: BlindedSigningKey::<Sha256>::new(key),
        })
    }

    /// Signature headers for one request: RSA-PSS-SHA256 over
    /// `timestamp_ms + METHOD + path`.
    fn sign(&self, method: &str, path: &str) -> Result<(String, String), ClientError> {
        let timestamp = Utc::now().timestamp_millis().to_string();
        let message = format!("{}{}{}", timestamp, method, path);
        let signature = self
            .signing_key
            .try_sign_with_rng(&mut rand::rngs::OsRng, message.as_bytes())?;
        Ok((timestamp, BASE64.encode(signature.to_bytes())))
    }

    /// Signed GET returning decoded JSON. `path` is the full API path;
    /// query parameters are not part of the signed message.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let (timestamp, signature) = self.sign("GET", path)?;
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .query(params)
            .header("KALSHI-ACCESS-KEY", &self.key_id)
            .header("KALSHI-ACCESS-SIGNATURE", signature)
            .header("KALSHI-ACCESS-TIMESTAMP", timestamp)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, body });
        }

        Ok(response.json().await?)
    }

    /// One page of the market listing, optionally scoped to a series.
    pub async fn get_markets(
        &self,
        series_ticker: Option<&str>,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<MarketsPage, ClientError> {
        let mut params: Vec<(&str, String)> = vec![("limit", limit.to_string())];
        if let Some(series) = series_ticker {
            params.push(("series_ticker", series.to_string()));
        }
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor.to_string()));
        }
        self.get(&KalshiApi::markets_path(), &params).await
    }

    /// Details for a single market.
    pub async fn get_market(&self, ticker: &str) -> Result<Market, ClientError> {
        let envelope: MarketEnvelope = self.get(&KalshiApi::market_path(ticker), &[]).await?;
        Ok(envelope.market)
    }

    /// One page of the series listing.
    pub async fn get_series_page(
        &self,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<SeriesPage, ClientError> {
        let mut params: Vec<(&str, String)> = vec![("limit", limit.to_string())];
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor.to_string()));
        }
        self.get(&KalshiApi::series_path(), &params).await
    }

    /// All markets in a series across every page, in arrival order.
    pub async fn fetch_series_markets(
        &self,
        series_ticker: &str,
    ) -> Result<Vec<Market>, ClientError> {
        paginate(MAX_PAGES, |cursor| async move {
            let page = self
                .get_markets(Some(series_ticker), MARKET_PAGE_LIMIT, cursor.as_deref())
                .await?;
            Ok((page.markets, page.cursor))
        })
        .await
    }

    /// The complete series listing across every page.
    pub async fn fetch_all_series(&self) -> Result<Vec<SeriesInfo>, ClientError> {
        paginate(MAX_PAGES, |cursor| async move {
            let page = self
                .get_series_page(SERIES_PAGE_LIMIT, cursor.as_deref())
                .await?;
            Ok((page.series, page.cursor))
        })
        .await
    }
}
