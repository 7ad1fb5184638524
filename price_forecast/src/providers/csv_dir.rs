use crate::data::{DataLoader, HistoryWindow, PriceSeries};
use crate::providers::{MarketDataProvider, ProviderError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Provider reading `<dir>/<TICKER>.csv` files.
///
/// A missing file means the ticker is unknown. Period windows are anchored on
/// the most recent row of the file.
#[derive(Debug, Clone)]
pub struct CsvDirectoryProvider {
    dir: PathBuf,
}

impl CsvDirectoryProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn locate(&self, ticker: &str) -> Option<PathBuf> {
        [ticker.to_string(), ticker.to_uppercase()]
            .into_iter()
            .map(|name| self.dir.join(format!("{name}.csv")))
            .find(|path| path.is_file())
    }
}

impl MarketDataProvider for CsvDirectoryProvider {
    fn fetch_daily_history(
        &self,
        ticker: &str,
        window: &HistoryWindow,
    ) -> Result<PriceSeries, ProviderError> {
        let Some(path) = self.locate(ticker) else {
            debug!(ticker, dir = %self.dir.display(), "no CSV file for ticker");
            return Ok(PriceSeries::empty(ticker));
        };

        let series = DataLoader::from_csv(&path, ticker)
            .map_err(|e| ProviderError::Source(format!("{}: {e}", path.display())))?;

        Ok(match series.last_date() {
            Some(anchor) => series.within(window, anchor),
            None => series,
        })
    }
}
