//! The forecasting pipeline.
//!
//! [`Forecaster::forecast`] fetches recent history for a ticker, holds out the
//! most recent samples, grid-searches an RBF SVR on the rest, and returns a
//! [`ForecastBundle`] with the held-out actuals, the model's predictions for
//! them, and a forward projection.
//!
//! The model's only feature is a sample's position in the fetched window, so
//! the projection continues those positions past the last held-out sample.

use crate::bundle::{DatedPoint, ForecastBundle, IndexedPoint};
use crate::config::ForecastConfig;
use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use crate::models::FittedRegressor;
use crate::providers::MarketDataProvider;
use crate::split::{samples_from_series, train_test_split};
use crate::tuning::GridSearch;
use crate::utils::{calendar_dates_from, validate_horizon};
use chrono::{Local, NaiveDate};
use tracing::{debug, info};

/// Produces forecasts from a market-data provider
#[derive(Debug, Clone)]
pub struct Forecaster<P> {
    provider: P,
    config: ForecastConfig,
}

impl<P: MarketDataProvider> Forecaster<P> {
    /// Forecaster with the default configuration
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            config: ForecastConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast `ticker` over `horizon_days` days counted from today.
    ///
    /// The bundle holds `horizon_days - 1` forecast points dated today onward.
    ///
    /// # Errors
    ///
    /// - [`ForecastError::InvalidHorizon`] if `horizon_days < 1`; the provider
    ///   is not called.
    /// - [`ForecastError::DataUnavailable`] if the provider has no rows.
    /// - [`ForecastError::Provider`] for failures inside the provider.
    pub fn forecast(&self, ticker: &str, horizon_days: i64) -> Result<ForecastBundle> {
        self.forecast_as_of(ticker, horizon_days, Local::now().date_naive())
    }

    /// Same as [`forecast`](Self::forecast) with an explicit "today"
    pub fn forecast_as_of(
        &self,
        ticker: &str,
        horizon_days: i64,
        today: NaiveDate,
    ) -> Result<ForecastBundle> {
        let horizon = validate_horizon(horizon_days)?;
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Ticker must not be empty".to_string(),
            ));
        }

        info!(ticker, horizon_days = horizon, history = ?self.config.history, "fetching price history");
        let series = self
            .provider
            .fetch_daily_history(ticker, &self.config.history)?;

        forecast_series(&series, horizon, today, &self.config)
    }
}

/// Run the pipeline on an already fetched series.
///
/// `horizon_days` must be at least 1.
pub fn forecast_series(
    series: &PriceSeries,
    horizon_days: usize,
    today: NaiveDate,
    config: &ForecastConfig,
) -> Result<ForecastBundle> {
    if horizon_days < 1 {
        return Err(ForecastError::InvalidHorizon(horizon_days as i64));
    }
    if series.is_empty() {
        return Err(ForecastError::DataUnavailable(series.ticker().to_string()));
    }

    let samples = samples_from_series(series);
    let split = train_test_split(&samples, config.test_fraction)?;
    debug!(
        train = split.train.len(),
        test = split.test.len(),
        "split price history"
    );

    let search = GridSearch::new(config.grid.clone(), config.cv_folds).with_solver(config.solver);
    let result = search.fit(&split.train_features(), &split.train_targets())?;
    info!(
        ticker = series.ticker(),
        params = %result.best_params,
        cv_score = result.best_score,
        "selected hyperparameters"
    );
    let model = &result.model;

    let actual: Vec<IndexedPoint> = split
        .test
        .iter()
        .map(|s| IndexedPoint {
            index: s.index,
            value: s.close,
        })
        .collect();
    let predicted: Vec<IndexedPoint> = split
        .test
        .iter()
        .map(|s| IndexedPoint {
            index: s.index,
            value: model.predict_one(s.index as f64),
        })
        .collect();

    let last_index = split.last_test_index().ok_or_else(|| {
        ForecastError::DataError("Held-out subset is empty".to_string())
    })?;
    let dates = calendar_dates_from(today, horizon_days)?;
    let forecast: Vec<DatedPoint> = (last_index + 1..last_index + horizon_days)
        .zip(dates)
        .map(|(index, date)| DatedPoint {
            date,
            value: model.predict_one(index as f64),
        })
        .collect();

    ForecastBundle::new(
        series.ticker(),
        horizon_days,
        actual,
        predicted,
        forecast,
        result.best_params,
        result.best_score,
    )
}
