//! Yahoo Finance chart API.
//!
//! The response parser is always available so captured payloads can be
//! decoded offline; the HTTP client sits behind the `fetch` feature.

use crate::data::{PriceBar, PriceSeries};
use crate::providers::ProviderError;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[cfg(feature = "fetch")]
pub use client::YahooProvider;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteData>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Decode a chart API payload into a daily series.
///
/// A "Not Found" error or a result without timestamps is an unknown ticker and
/// yields an empty series. Rows with no close are dropped; when the API repeats
/// a trading date (the live session bar) the later row wins.
pub fn parse_chart_response(ticker: &str, body: &str) -> Result<PriceSeries, ProviderError> {
    let response: YahooResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    if let Some(error) = response.chart.error {
        if error.code.eq_ignore_ascii_case("not found") {
            return Ok(PriceSeries::empty(ticker));
        }
        return Err(ProviderError::Api {
            code: error.code,
            description: error.description,
        });
    }

    let Some(data) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceSeries::empty(ticker));
    };
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars: Vec<PriceBar> = Vec::with_capacity(data.timestamp.len());
    for (i, ts) in data.timestamp.iter().enumerate() {
        let Some(close) = quote.close.get(i).copied().flatten() else {
            continue;
        };
        let date = ts
            .checked_add(data.meta.gmtoffset)
            .and_then(|local| DateTime::<Utc>::from_timestamp(local, 0))
            .ok_or_else(|| ProviderError::Parse(format!("timestamp out of range: {ts}")))?
            .date_naive();
        let pick = |column: &[Option<f64>]| column.get(i).copied().flatten().unwrap_or(close);
        let bar = PriceBar {
            date,
            open: pick(&quote.open),
            high: pick(&quote.high),
            low: pick(&quote.low),
            close,
            volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
        };

        match bars.last_mut() {
            Some(last) if last.date == date => *last = bar,
            Some(last) if last.date > date => continue,
            _ => bars.push(bar),
        }
    }

    PriceSeries::new(ticker, bars).map_err(|e| ProviderError::Parse(e.to_string()))
}

#[cfg(feature = "fetch")]
mod client {
    use super::{parse_chart_response, DEFAULT_BASE_URL};
    use crate::data::{HistoryWindow, PriceSeries};
    use crate::providers::{MarketDataProvider, ProviderError};
    use chrono::NaiveTime;
    use tracing::debug;

    /// Blocking Yahoo Finance client
    #[derive(Debug, Clone)]
    pub struct YahooProvider {
        client: reqwest::blocking::Client,
        base_url: String,
    }

    impl YahooProvider {
        pub fn new() -> Result<Self, ProviderError> {
            Self::with_base_url(DEFAULT_BASE_URL)
        }

        pub fn with_base_url(base_url: &str) -> Result<Self, ProviderError> {
            let client = reqwest::blocking::Client::builder()
                .user_agent("Mozilla/5.0 (X11; Linux x86_64) stock-dash")
                .build()
                .map_err(|e| ProviderError::Request(e.to_string()))?;

            Ok(Self {
                client,
                base_url: base_url.trim_end_matches('/').to_string(),
            })
        }

        fn query(window: &HistoryWindow) -> Vec<(&'static str, String)> {
            let mut params = vec![("interval", "1d".to_string())];
            match *window {
                HistoryWindow::Period(period) => params.push(("range", period.as_str().to_string())),
                HistoryWindow::Range { start, end } => {
                    let epoch = |d: chrono::NaiveDate| d.and_time(NaiveTime::default()).and_utc().timestamp();
                    params.push(("period1", epoch(start).to_string()));
                    params.push(("period2", epoch(end).to_string()));
                }
            }
            params
        }
    }

    impl MarketDataProvider for YahooProvider {
        fn fetch_daily_history(
            &self,
            ticker: &str,
            window: &HistoryWindow,
        ) -> Result<PriceSeries, ProviderError> {
            let url = format!("{}/{}", self.base_url, ticker);
            debug!(ticker, %url, "requesting chart");

            // Unknown symbols come back as 404 with a JSON error body, so the
            // status is not checked before parsing.
            let body = self
                .client
                .get(&url)
                .query(&Self::query(window))
                .send()
                .and_then(|r| r.text())
                .map_err(|e| ProviderError::Request(e.to_string()))?;

            parse_chart_response(ticker, &body)
        }
    }
}
