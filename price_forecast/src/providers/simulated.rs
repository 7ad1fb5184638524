use crate::data::{HistoryWindow, PriceBar, PriceSeries};
use crate::providers::{MarketDataProvider, ProviderError};
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::collections::HashSet;

/// Offline provider producing a deterministic geometric random walk per ticker.
///
/// Bars fall on weekdays only. The same ticker, anchor and window always give
/// the same prices, which makes the dashboard usable without network access.
#[derive(Debug, Clone)]
pub struct SimulatedProvider {
    anchor: NaiveDate,
    start_price: f64,
    drift: f64,
    volatility: f64,
    unlisted: HashSet<String>,
}

impl SimulatedProvider {
    /// Walks ending on `anchor` (inclusive)
    pub fn new(anchor: NaiveDate) -> Self {
        Self {
            anchor,
            start_price: 100.0,
            drift: 0.0003,
            volatility: 0.015,
            unlisted: HashSet::new(),
        }
    }

    pub fn with_start_price(mut self, price: f64) -> Self {
        self.start_price = price;
        self
    }

    /// Daily log-return mean and standard deviation
    pub fn with_dynamics(mut self, drift: f64, volatility: f64) -> Self {
        self.drift = drift;
        self.volatility = volatility;
        self
    }

    /// Treat `ticker` as unknown: fetching it returns an empty series
    pub fn with_unlisted(mut self, ticker: &str) -> Self {
        self.unlisted.insert(ticker.to_uppercase());
        self
    }

    fn seed_for(ticker: &str) -> u64 {
        // FNV-1a, stable across platforms and toolchains.
        ticker
            .to_uppercase()
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325u64, |hash, byte| {
                (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
            })
    }

    fn span(&self, window: &HistoryWindow) -> (NaiveDate, NaiveDate) {
        match *window {
            HistoryWindow::Period(period) => (period.start_from(self.anchor), self.anchor),
            HistoryWindow::Range { start, end } => {
                let last = end.pred_opt().unwrap_or(end).min(self.anchor);
                (start, last)
            }
        }
    }
}

impl MarketDataProvider for SimulatedProvider {
    fn fetch_daily_history(
        &self,
        ticker: &str,
        window: &HistoryWindow,
    ) -> Result<PriceSeries, ProviderError> {
        let ticker = ticker.trim();
        if ticker.is_empty() || self.unlisted.contains(&ticker.to_uppercase()) {
            return Ok(PriceSeries::empty(ticker));
        }

        let returns = Normal::new(self.drift, self.volatility)
            .map_err(|e| ProviderError::Source(format!("invalid walk parameters: {e}")))?;
        let mut rng = StdRng::seed_from_u64(Self::seed_for(ticker));

        let (start, end) = self.span(window);
        let mut close = self.start_price * rng.gen_range(0.5..2.0);
        let mut bars = Vec::new();

        for date in start.iter_days().take_while(|d| *d <= end) {
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }
            let open = close;
            close = open * returns.sample(&mut rng).exp();
            let wiggle = open.max(close) * self.volatility * rng.gen::<f64>();
            bars.push(PriceBar {
                date,
                open,
                high: open.max(close) + wiggle,
                low: (open.min(close) - wiggle).max(0.0),
                close,
                volume: rng.gen_range(500_000..5_000_000),
            });
        }

        PriceSeries::new(ticker, bars).map_err(|e| ProviderError::Source(e.to_string()))
    }
}
