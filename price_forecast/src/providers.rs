//! Market-data provider abstraction.
//!
//! The forecaster only needs one thing from the outside world: the daily price
//! history of a ticker over some window. [`MarketDataProvider`] is that seam.
//! Concrete sources live in the submodules:
//!
//! - [`memory::InMemoryProvider`] for fixtures and tests
//! - [`csv_dir::CsvDirectoryProvider`] for a directory of `<TICKER>.csv` files
//! - [`simulated::SimulatedProvider`] for an offline, deterministic random walk
//! - `yahoo::YahooProvider` (feature `fetch`) for live Yahoo Finance data
//!
//! Providers return an empty [`PriceSeries`] for tickers they know nothing
//! about. Turning that into a user-facing error is the caller's job.

pub mod csv_dir;
pub mod memory;
pub mod simulated;
pub mod yahoo;

use crate::data::{HistoryWindow, PriceSeries};
use thiserror::Error;

pub use csv_dir::CsvDirectoryProvider;
pub use memory::InMemoryProvider;
pub use simulated::SimulatedProvider;
#[cfg(feature = "fetch")]
pub use yahoo::YahooProvider;

/// Source of daily price history.
pub trait MarketDataProvider: Send + Sync {
    /// Fetch chronologically ordered daily bars for `ticker` inside `window`.
    ///
    /// An unknown ticker yields `Ok` with an empty series.
    fn fetch_daily_history(
        &self,
        ticker: &str,
        window: &HistoryWindow,
    ) -> Result<PriceSeries, ProviderError>;
}

impl<P: MarketDataProvider + ?Sized> MarketDataProvider for &P {
    fn fetch_daily_history(
        &self,
        ticker: &str,
        window: &HistoryWindow,
    ) -> Result<PriceSeries, ProviderError> {
        (**self).fetch_daily_history(ticker, window)
    }
}

impl MarketDataProvider for Box<dyn MarketDataProvider> {
    fn fetch_daily_history(
        &self,
        ticker: &str,
        window: &HistoryWindow,
    ) -> Result<PriceSeries, ProviderError> {
        self.as_ref().fetch_daily_history(ticker, window)
    }
}

/// Errors that can occur within a `MarketDataProvider` implementation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never produced a response (network failure, timeout).
    #[error("API request failed: {0}")]
    Request(String),

    /// The provider's API answered with an error payload.
    #[error("API error [{code}]: {description}")]
    Api { code: String, description: String },

    /// The response could not be understood.
    #[error("Failed to parse provider response: {0}")]
    Parse(String),

    /// A local data source (file, fixture) could not be read.
    #[error("Data source error: {0}")]
    Source(String),
}
