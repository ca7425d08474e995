use crate::config::Settings;
use crate::ingest::error::FetchError;
use crate::ingest::types::TickerRecord;
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;

const API_KEY_HEADER: &str = "x-mbx-apikey";

#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Returns the full ticker listing. One call, no retry.
    async fn fetch_tickers(&self) -> Result<Vec<TickerRecord>, FetchError>;
}

/// Public 24h ticker listing (`GET /api/v3/ticker/24hr`). The endpoint does
/// not require a key, but one is sent when the credential store provides it.
#[derive(Debug, Clone)]
pub struct BinanceTickerSource {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl BinanceTickerSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build ticker http client")?;

        Ok(Self {
            http,
            url: url.into(),
            api_key: None,
        })
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Self::new(
            settings.ticker_url.clone(),
            Duration::from_secs(settings.http_timeout_secs),
        )
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            match HeaderValue::from_str(api_key) {
                Ok(v) => {
                    headers.insert(API_KEY_HEADER, v);
                }
                Err(_) => tracing::warn!("api key is not a valid header value; sending without it"),
            }
        }
        headers
    }
}

#[async_trait::async_trait]
impl PriceSource for BinanceTickerSource {
    fn source_name(&self) -> &'static str {
        "binance_ticker_24hr"
    }

    async fn fetch_tickers(&self) -> Result<Vec<TickerRecord>, FetchError> {
        let res = self
            .http
            .get(&self.url)
            .headers(self.headers())
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = res.status();
        let text = res.text().await.map_err(FetchError::Transport)?;

        if !status.is_success() {
            return Err(FetchError::Status { status, body: text });
        }

        let records = serde_json::from_str::<Vec<TickerRecord>>(&text).map_err(FetchError::Decode)?;
        tracing::debug!(records = records.len(), url = %self.url, "fetched ticker listing");
        Ok(records)
    }
}
