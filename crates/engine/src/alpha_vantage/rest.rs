use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use common::{Interval, OutputSize, PriceBar, PriceSeriesProvider, ProviderError, Series};

pub const BASE_URL: &str = "https://www.alphavantage.co";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const BODY_PREVIEW: usize = 200;

/// REST client for the Alpha Vantage `FX_INTRADAY` endpoint.
pub struct AlphaVantageClient {
    api_key: String,
    base_url: String,
    output_size: OutputSize,
    http: Client,
}

impl AlphaVantageClient {
    pub fn new(
        api_key: impl Into<String>,
        output_size: OutputSize,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        Ok(Self {
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            output_size,
            http,
        })
    }

    /// Point the client at another host. Used by tests against a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn query_url(&self, symbol: &str, interval: Interval) -> Result<Url, ProviderError> {
        let (from, to) = split_pair(symbol)?;
        Url::parse_with_params(
            &format!("{}/query", self.base_url),
            &[
                ("function", "FX_INTRADAY"),
                ("from_symbol", from.as_str()),
                ("to_symbol", to.as_str()),
                ("interval", interval.as_str()),
                ("outputsize", self.output_size.as_str()),
                ("apikey", self.api_key.as_str()),
            ],
        )
        .map_err(|e| ProviderError::Http(e.to_string()))
    }
}

#[async_trait]
impl PriceSeriesProvider for AlphaVantageClient {
    async fn fetch(&self, symbol: &str, interval: Interval) -> Result<Series, ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey);
        }
        let url = self.query_url(symbol, interval)?;

        debug!(symbol, %interval, outputsize = self.output_size.as_str(), "Requesting FX intraday series");
        let resp = self.http.get(url).send().await.map_err(map_transport)?;

        let status = resp.status();
        let body = resp.text().await.map_err(map_transport)?;

        if !status.is_success() {
            return Err(ProviderError::Http(format!(
                "HTTP {status}: {}",
                preview(&body)
            )));
        }

        let series = parse_fx_intraday(&body, interval)?;
        debug!(symbol, bars = series.len(), "FX intraday series parsed");
        Ok(series)
    }
}

fn map_transport(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Http(e.to_string())
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(BODY_PREVIEW) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// Split a six-letter pair such as `eurusd` into `("EUR", "USD")`.
pub fn split_pair(symbol: &str) -> Result<(String, String), ProviderError> {
    let s = symbol.trim().to_ascii_uppercase();
    if s.len() == 6 && s.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok((s[..3].to_string(), s[3..].to_string()))
    } else {
        Err(ProviderError::InvalidSymbol(symbol.to_string()))
    }
}

/// Parse an `FX_INTRADAY` response body into a chronologically ordered series.
///
/// The provider reports throttling as a 200 with a `Note` or `Information`
/// field and bad requests with an `Error Message` field.
pub fn parse_fx_intraday(body: &str, interval: Interval) -> Result<Series, ProviderError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    let key = format!("Time Series FX ({interval})");
    let Some(raw) = value.get(&key) else {
        if let Some(note) = text_field(&value, "Note").or_else(|| text_field(&value, "Information")) {
            return Err(ProviderError::RateLimited(note));
        }
        if let Some(msg) = text_field(&value, "Error Message") {
            return Err(ProviderError::Rejected(msg));
        }
        return Err(ProviderError::Malformed(format!(
            "missing '{key}' in response: {}",
            preview(body)
        )));
    };

    let candles: HashMap<String, RawCandle> = serde_json::from_value(raw.clone())
        .map_err(|e| ProviderError::Malformed(e.to_string()))?;

    let mut bars = Vec::with_capacity(candles.len());
    for (stamp, candle) in candles {
        let timestamp = NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT)
            .map_err(|e| ProviderError::Malformed(format!("bad timestamp '{stamp}': {e}")))?
            .and_utc();
        bars.push(PriceBar {
            timestamp,
            open: parse_price(&stamp, "open", &candle.open)?,
            high: parse_price(&stamp, "high", &candle.high)?,
            low: parse_price(&stamp, "low", &candle.low)?,
            close: parse_price(&stamp, "close", &candle.close)?,
        });
    }
    bars.sort_by_key(|b| b.timestamp);

    Ok(Series::new(bars)?)
}

fn text_field(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(str::to_string)
}

fn parse_price(stamp: &str, field: &str, raw: &str) -> Result<f64, ProviderError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ProviderError::Malformed(format!("bad {field} '{raw}' at {stamp}")))
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawCandle {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
}
