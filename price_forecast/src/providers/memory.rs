use crate::data::{HistoryWindow, PriceSeries};
use crate::providers::{MarketDataProvider, ProviderError};
use std::collections::HashMap;

/// Provider backed by series held in memory.
///
/// Tickers are matched case-insensitively. Period windows are anchored on the
/// last bar of each stored series rather than on the wall clock, so fixtures
/// stay valid regardless of when they are used.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    series: HashMap<String, PriceSeries>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a series under its own ticker
    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.insert(series);
        self
    }

    pub fn insert(&mut self, series: PriceSeries) {
        self.series
            .insert(series.ticker().to_uppercase(), series);
    }
}

impl MarketDataProvider for InMemoryProvider {
    fn fetch_daily_history(
        &self,
        ticker: &str,
        window: &HistoryWindow,
    ) -> Result<PriceSeries, ProviderError> {
        let Some(series) = self.series.get(&ticker.to_uppercase()) else {
            return Ok(PriceSeries::empty(ticker));
        };
        let Some(anchor) = series.last_date() else {
            return Ok(series.clone());
        };

        Ok(series.within(window, anchor))
    }
}
