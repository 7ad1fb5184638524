//! Daily price history handling

use crate::error::{ForecastError, Result};
use chrono::{Months, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

/// One trading day of OHLCV data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Trading date
    pub date: NaiveDate,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Traded volume
    pub volume: u64,
}

impl PriceBar {
    /// A bar where only the close is known
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }
}

/// Lookback periods understood by market-data providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
}

impl Period {
    /// Provider-facing code, e.g. `"3mo"`
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
        }
    }

    /// Length of the period in calendar months
    pub fn months(&self) -> u32 {
        match self {
            Period::OneMonth => 1,
            Period::ThreeMonths => 3,
            Period::SixMonths => 6,
            Period::OneYear => 12,
            Period::TwoYears => 24,
            Period::FiveYears => 60,
        }
    }

    /// First date covered by the period when it ends on `anchor`
    pub fn start_from(&self, anchor: NaiveDate) -> NaiveDate {
        anchor
            .checked_sub_months(Months::new(self.months()))
            .unwrap_or(NaiveDate::MIN)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "1mo" => Ok(Period::OneMonth),
            "3mo" => Ok(Period::ThreeMonths),
            "6mo" => Ok(Period::SixMonths),
            "1y" => Ok(Period::OneYear),
            "2y" => Ok(Period::TwoYears),
            "5y" => Ok(Period::FiveYears),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unsupported history period: {other}"
            ))),
        }
    }
}

/// Which slice of history to request from a provider
///
/// A `Period` ends on the anchor date (inclusive). A `Range` covers
/// `start..end`, with `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryWindow {
    Period(Period),
    Range { start: NaiveDate, end: NaiveDate },
}

impl Default for HistoryWindow {
    fn default() -> Self {
        HistoryWindow::Period(Period::ThreeMonths)
    }
}

impl HistoryWindow {
    /// Build a range window, rejecting empty ranges
    pub fn range(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start >= end {
            return Err(ForecastError::InvalidParameter(format!(
                "History range start {start} must be before end {end}"
            )));
        }
        Ok(HistoryWindow::Range { start, end })
    }

    /// Whether `date` falls inside the window, with periods anchored at `anchor`
    pub fn contains(&self, date: NaiveDate, anchor: NaiveDate) -> bool {
        match *self {
            HistoryWindow::Period(period) => date >= period.start_from(anchor) && date <= anchor,
            HistoryWindow::Range { start, end } => date >= start && date < end,
        }
    }
}

/// Chronologically ordered daily price history for one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Create a series, validating that dates strictly increase and closes are finite
    pub fn new(ticker: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self> {
        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ForecastError::DataError(format!(
                    "Dates must be strictly increasing: {} follows {}",
                    pair[1].date, pair[0].date
                )));
            }
        }
        if let Some(bad) = bars.iter().find(|b| !b.close.is_finite()) {
            return Err(ForecastError::DataError(format!(
                "Non-finite close price on {}",
                bad.date
            )));
        }

        Ok(Self {
            ticker: ticker.into(),
            bars,
        })
    }

    /// A series with no rows, as returned for unknown tickers
    pub fn empty(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            bars: Vec::new(),
        }
    }

    /// Create a series from parallel date and close vectors
    pub fn from_closes(
        ticker: impl Into<String>,
        dates: Vec<NaiveDate>,
        closes: Vec<f64>,
    ) -> Result<Self> {
        if dates.len() != closes.len() {
            return Err(ForecastError::DataError(format!(
                "Dates length ({}) doesn't match closes length ({})",
                dates.len(),
                closes.len()
            )));
        }

        let bars = dates
            .into_iter()
            .zip(closes)
            .map(|(date, close)| PriceBar::from_close(date, close))
            .collect();
        Self::new(ticker, bars)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// Get the close prices as a vector
    pub fn close_prices(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Get the open prices as a vector
    pub fn open_prices(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.open).collect()
    }

    /// Keep only the bars inside `window`; periods are anchored at `anchor`
    pub fn within(&self, window: &HistoryWindow, anchor: NaiveDate) -> Self {
        Self {
            ticker: self.ticker.clone(),
            bars: self
                .bars
                .iter()
                .filter(|b| window.contains(b.date, anchor))
                .copied()
                .collect(),
        }
    }

    /// Exponential moving average of the closes
    pub fn ema(&self, span: usize) -> Result<Vec<f64>> {
        Ok(trade_math::moving_averages::ema_series(
            &self.close_prices(),
            span,
        )?)
    }

    /// Export as a polars DataFrame with date/open/high/low/close/volume columns
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let dates: Vec<String> = self
            .bars
            .iter()
            .map(|b| b.date.format("%Y-%m-%d").to_string())
            .collect();
        let opens: Vec<f64> = self.bars.iter().map(|b| b.open).collect();
        let highs: Vec<f64> = self.bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = self.bars.iter().map(|b| b.low).collect();
        let closes: Vec<f64> = self.bars.iter().map(|b| b.close).collect();
        let volumes: Vec<u64> = self.bars.iter().map(|b| b.volume).collect();

        let df = DataFrame::new(vec![
            Series::new("date", dates),
            Series::new("open", opens),
            Series::new("high", highs),
            Series::new("low", lows),
            Series::new("close", closes),
            Series::new("volume", volumes),
        ])?;

        Ok(df)
    }
}

/// Data loader for daily price history stored as CSV
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load price history from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P, ticker: &str) -> Result<PriceSeries> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(&df, ticker)
    }

    /// Build price history from an existing DataFrame
    pub fn from_dataframe(df: &DataFrame, ticker: &str) -> Result<PriceSeries> {
        let time_column = Self::detect_time_column(df)?;
        let close_column = Self::detect_column(df, &["close"])
            .or_else(|| Self::detect_column(df, &["adj close", "adj_close", "price"]))
            .ok_or_else(|| ForecastError::DataError("No close price column found".to_string()))?;

        let dates = Self::column_as_dates(df, &time_column)?;
        let closes = Self::column_as_f64(df, &close_column)?;
        let opens = match Self::detect_column(df, &["open"]) {
            Some(name) => Self::column_as_f64(df, &name)?,
            None => closes.clone(),
        };
        let highs = match Self::detect_column(df, &["high"]) {
            Some(name) => Self::column_as_f64(df, &name)?,
            None => closes.clone(),
        };
        let lows = match Self::detect_column(df, &["low"]) {
            Some(name) => Self::column_as_f64(df, &name)?,
            None => closes.clone(),
        };
        let volumes = match Self::detect_column(df, &["volume", "vol"]) {
            Some(name) => Self::column_as_f64(df, &name)?,
            None => vec![Some(0.0); dates.len()],
        };

        let mut bars = Vec::with_capacity(dates.len());
        for i in 0..dates.len() {
            // Rows without a date or close (holidays, halted sessions) are skipped.
            let (Some(date), Some(close)) = (dates[i], closes[i]) else {
                continue;
            };
            bars.push(PriceBar {
                date,
                open: opens[i].unwrap_or(close),
                high: highs[i].unwrap_or(close),
                low: lows[i].unwrap_or(close),
                close,
                volume: volumes[i].map(|v| v.max(0.0) as u64).unwrap_or(0),
            });
        }
        bars.sort_by_key(|b| b.date);

        PriceSeries::new(ticker, bars)
    }

    /// Detect the time column in a DataFrame
    fn detect_time_column(df: &DataFrame) -> Result<String> {
        df.get_column_names()
            .into_iter()
            .find(|name| {
                let lower = name.to_lowercase();
                lower.contains("date") || lower.contains("time")
            })
            .map(str::to_string)
            .ok_or_else(|| ForecastError::DataError("No time column found in data".to_string()))
    }

    /// First column whose lowercase name contains one of `needles`
    fn detect_column(df: &DataFrame, needles: &[&str]) -> Option<String> {
        needles.iter().find_map(|needle| {
            df.get_column_names()
                .into_iter()
                .find(|name| name.to_lowercase().contains(*needle))
                .map(str::to_string)
        })
    }

    fn column_as_f64(df: &DataFrame, column_name: &str) -> Result<Vec<Option<f64>>> {
        let col = df
            .column(column_name)?
            .cast(&DataType::Float64)
            .map_err(|e| {
                ForecastError::DataError(format!(
                    "Column '{column_name}' cannot be converted to f64: {e}"
                ))
            })?;

        Ok(col.f64()?.into_iter().collect())
    }

    fn column_as_dates(df: &DataFrame, column_name: &str) -> Result<Vec<Option<NaiveDate>>> {
        let col = df.column(column_name)?.cast(&DataType::Utf8)?;

        col.utf8()?
            .into_iter()
            .map(|value| value.map(parse_date).transpose())
            .collect()
    }
}

/// Parse `YYYY-MM-DD`, ignoring any time-of-day suffix
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| ForecastError::DataError(format!("Invalid date '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn rejects_out_of_order_dates() {
        let err = PriceSeries::from_closes(
            "AAPL",
            vec![day("2024-01-03"), day("2024-01-02")],
            vec![1.0, 2.0],
        )
        .unwrap_err();
        assert!(matches!(err, ForecastError::DataError(_)));

        let dup = PriceSeries::from_closes(
            "AAPL",
            vec![day("2024-01-02"), day("2024-01-02")],
            vec![1.0, 2.0],
        );
        assert!(dup.is_err());
    }

    #[test]
    fn rejects_non_finite_close() {
        let result = PriceSeries::from_closes("AAPL", vec![day("2024-01-02")], vec![f64::NAN]);
        assert!(result.is_err());
    }

    #[test]
    fn period_window_is_anchored() {
        let anchor = day("2024-04-30");
        let window = HistoryWindow::Period(Period::ThreeMonths);

        assert_eq!(Period::ThreeMonths.start_from(anchor), day("2024-01-30"));
        assert!(window.contains(day("2024-01-30"), anchor));
        assert!(!window.contains(day("2024-01-29"), anchor));
        assert!(!window.contains(day("2024-05-01"), anchor));
    }

    #[test]
    fn range_window_excludes_end() {
        let window = HistoryWindow::range(day("2024-01-01"), day("2024-02-01")).unwrap();
        assert!(window.contains(day("2024-01-01"), day("2030-01-01")));
        assert!(!window.contains(day("2024-02-01"), day("2030-01-01")));
        assert!(HistoryWindow::range(day("2024-02-01"), day("2024-02-01")).is_err());
    }

    #[test]
    fn period_parses_from_provider_codes() {
        assert_eq!("3mo".parse::<Period>().unwrap(), Period::ThreeMonths);
        assert_eq!("1Y".parse::<Period>().unwrap(), Period::OneYear);
        assert!("7d".parse::<Period>().is_err());
        assert_eq!(Period::SixMonths.to_string(), "6mo");
    }

    #[test]
    fn parse_date_accepts_timestamps() {
        assert_eq!(parse_date("2024-03-01 00:00:00").unwrap(), day("2024-03-01"));
        assert!(parse_date("03/01/2024").is_err());
    }
}
