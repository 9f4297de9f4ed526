use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use common::{Bar, Error, FeedRequest, PriceFeed, Result};

const BASE_URL: &str = "https://api.twelvedata.com";

/// REST client for the Twelve Data `time_series` endpoint.
pub struct TwelveDataClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl TwelveDataClient {
    /// Every request is bounded by `timeout`.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            http,
        })
    }

    /// Point the client at another host (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Transport error text with the cause chain, never the URL or the key.
    fn http_error(&self, e: reqwest::Error) -> Error {
        let mut text = if e.is_timeout() {
            "request timed out".to_string()
        } else if e.is_connect() {
            "connection failed".to_string()
        } else {
            "request failed".to_string()
        };
        let e = e.without_url();
        text.push_str(&format!(": {e}"));
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            text.push_str(&format!(": {cause}"));
            source = std::error::Error::source(cause);
        }
        if !self.api_key.is_empty() {
            text = text.replace(&self.api_key, "***");
        }
        Error::Http(text)
    }
}

#[async_trait]
impl PriceFeed for TwelveDataClient {
    async fn fetch_bars(&self, request: &FeedRequest) -> Result<Vec<Bar>> {
        let url = format!("{}/time_series", self.base_url);
        let output_size = request.output_size.to_string();

        debug!(
            symbol = %request.symbol,
            interval = %request.interval,
            output_size = request.output_size,
            "Fetching time series"
        );
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("symbol", request.symbol.as_str()),
                ("interval", request.interval.as_str()),
                ("outputsize", output_size.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.http_error(e))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| self.http_error(e))?;

        if !status.is_success() {
            return Err(Error::Feed(format!("HTTP {status}: {body}")));
        }

        let bars = parse_time_series(&body)?;
        debug!(bars = bars.len(), "Time series received");
        Ok(bars)
    }
}

/// Decode a `time_series` response body into bars, in feed order.
///
/// Twelve Data reports failures with HTTP 200 and `"status": "error"`, so the
/// payload is checked before the values. A response without `values` decodes
/// to an empty list.
pub fn parse_time_series(body: &str) -> Result<Vec<Bar>> {
    let resp: TimeSeriesResponse = serde_json::from_str(body)?;

    if resp.status.as_deref() == Some("error") {
        let code = resp.code.map(|c| c.to_string()).unwrap_or_else(|| "?".into());
        let message = resp.message.unwrap_or_else(|| "unknown error".into());
        return Err(Error::Feed(format!("API error {code}: {message}")));
    }

    resp.values.into_iter().map(RawBar::into_bar).collect()
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TimeSeriesResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    values: Vec<RawBar>,
}

#[derive(Deserialize)]
struct RawBar {
    datetime: String,
    open: Number,
    high: Number,
    low: Number,
    close: Number,
    #[serde(default)]
    volume: Option<Number>,
}

/// Prices arrive as strings, but plain JSON numbers are accepted too.
#[derive(Deserialize)]
#[serde(untagged)]
enum Number {
    Num(f64),
    Str(String),
}

impl Number {
    fn to_f64(&self, field: &str, datetime: &str) -> Result<f64> {
        let value = match self {
            Number::Num(v) => *v,
            Number::Str(s) => s.trim().parse::<f64>().map_err(|_| {
                Error::Feed(format!("bar {datetime}: field '{field}' is not a number: '{s}'"))
            })?,
        };
        if !value.is_finite() {
            return Err(Error::Feed(format!(
                "bar {datetime}: field '{field}' is not finite"
            )));
        }
        Ok(value)
    }
}

impl RawBar {
    fn into_bar(self) -> Result<Bar> {
        let dt = self.datetime.as_str();
        Ok(Bar {
            timestamp: parse_datetime(dt)?,
            open: self.open.to_f64("open", dt)?,
            high: self.high.to_f64("high", dt)?,
            low: self.low.to_f64("low", dt)?,
            close: self.close.to_f64("close", dt)?,
            volume: self
                .volume
                .as_ref()
                .map(|v| v.to_f64("volume", dt))
                .transpose()?,
        })
    }
}

/// `YYYY-MM-DD HH:MM:SS` for intraday intervals, `YYYY-MM-DD` for daily and above.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| Error::Feed(format!("unrecognised datetime '{s}'")))?;
    Ok(Utc.from_utc_datetime(&naive))
}
