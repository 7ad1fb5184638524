use chrono::{Datelike, Days, NaiveDate, Weekday};
use pretty_assertions::assert_eq;
use price_forecast::providers::{InMemoryProvider, ProviderError};
use price_forecast::{
    ForecastConfig, ForecastError, Forecaster, HistoryWindow, HyperparameterGrid,
    MarketDataProvider, PriceSeries,
};
use rstest::rstest;
use std::sync::atomic::{AtomicUsize, Ordering};

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// `n` weekday closes starting on Monday 2024-01-01
fn weekday_series(ticker: &str, n: usize) -> PriceSeries {
    let mut dates = Vec::with_capacity(n);
    let mut date = day("2024-01-01");
    while dates.len() < n {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(date);
        }
        date = date + Days::new(1);
    }
    let closes = (0..n)
        .map(|i| 150.0 + 0.2 * i as f64 + 3.0 * (i as f64 / 4.0).sin())
        .collect();
    PriceSeries::from_closes(ticker, dates, closes).unwrap()
}

fn small_config() -> ForecastConfig {
    ForecastConfig::default().with_grid(HyperparameterGrid {
        c: vec![1.0, 100.0],
        epsilon: vec![0.01, 0.1],
        gamma: vec![0.01, 0.1],
    })
}

fn forecaster() -> Forecaster<InMemoryProvider> {
    let provider = InMemoryProvider::new().with_series(weekday_series("AAPL", 60));
    Forecaster::new(provider).with_config(small_config()).unwrap()
}

/// Counts calls and delegates to an in-memory provider
struct CountingProvider {
    inner: InMemoryProvider,
    calls: AtomicUsize,
}

impl MarketDataProvider for CountingProvider {
    fn fetch_daily_history(
        &self,
        ticker: &str,
        window: &HistoryWindow,
    ) -> Result<PriceSeries, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_daily_history(ticker, window)
    }
}

struct FailingProvider;

impl MarketDataProvider for FailingProvider {
    fn fetch_daily_history(
        &self,
        _ticker: &str,
        _window: &HistoryWindow,
    ) -> Result<PriceSeries, ProviderError> {
        Err(ProviderError::Request("connection refused".to_string()))
    }
}

#[test]
fn sixty_days_with_five_day_horizon() {
    let today = day("2024-04-01");
    let bundle = forecaster().forecast_as_of("AAPL", 5, today).unwrap();

    let actual_x: Vec<usize> = bundle.actual().iter().map(|p| p.index).collect();
    let predicted_x: Vec<usize> = bundle.predicted().iter().map(|p| p.index).collect();
    assert_eq!(actual_x, vec![54, 55, 56, 57, 58, 59]);
    assert_eq!(predicted_x, actual_x);

    let forecast_dates: Vec<NaiveDate> = bundle.forecast().iter().map(|p| p.date).collect();
    assert_eq!(
        forecast_dates,
        vec![
            day("2024-04-01"),
            day("2024-04-02"),
            day("2024-04-03"),
            day("2024-04-04"),
        ]
    );
    assert_eq!(bundle.horizon_days(), 5);
    assert_eq!(bundle.ticker(), "AAPL");
    assert!(bundle.forecast().iter().all(|p| p.value.is_finite()));
}

#[test]
fn default_config_runs_the_full_grid() {
    let provider = InMemoryProvider::new().with_series(weekday_series("AAPL", 60));
    let forecaster = Forecaster::new(provider);
    assert_eq!(forecaster.config(), &ForecastConfig::default());

    let bundle = forecaster
        .forecast_as_of("AAPL", 5, day("2024-04-01"))
        .unwrap();

    assert_eq!(bundle.actual().len(), 6);
    assert_eq!(bundle.forecast().len(), 4);
    assert_eq!(bundle.forecast()[0].date, day("2024-04-01"));
    assert!(HyperparameterGrid::default()
        .combinations()
        .contains(&bundle.best_params()));
    assert!(bundle.forecast().iter().all(|p| p.value.is_finite()));
}

#[test]
fn actual_values_are_the_held_out_closes() {
    let series = weekday_series("AAPL", 60);
    let bundle = forecaster()
        .forecast_as_of("aapl", 2, day("2024-04-01"))
        .unwrap();

    let expected: Vec<f64> = series.close_prices()[54..].to_vec();
    let actual: Vec<f64> = bundle.actual().iter().map(|p| p.value).collect();
    assert_eq!(actual, expected);
}

#[rstest]
#[case(1, 0)]
#[case(2, 1)]
#[case(8, 7)]
fn forecast_length_is_horizon_minus_one(#[case] horizon: i64, #[case] expected: usize) {
    let bundle = forecaster()
        .forecast_as_of("AAPL", horizon, day("2024-04-01"))
        .unwrap();
    assert_eq!(bundle.forecast().len(), expected);
}

#[rstest]
#[case(0)]
#[case(-1)]
#[case(-30)]
fn invalid_horizon_skips_the_provider(#[case] horizon: i64) {
    let provider = CountingProvider {
        inner: InMemoryProvider::new().with_series(weekday_series("AAPL", 60)),
        calls: AtomicUsize::new(0),
    };
    let forecaster = Forecaster::new(provider);

    let result = forecaster.forecast("AAPL", horizon);
    assert!(matches!(result, Err(ForecastError::InvalidHorizon(h)) if h == horizon));
    assert_eq!(forecaster.provider().calls.load(Ordering::SeqCst), 0);
}

#[test]
fn unknown_ticker_is_data_unavailable() {
    let result = forecaster().forecast("ZZZZ", 5);
    assert!(matches!(result, Err(ForecastError::DataUnavailable(t)) if t == "ZZZZ"));
}

#[test]
fn provider_failures_propagate() {
    let result = Forecaster::new(FailingProvider).forecast("AAPL", 5);
    match result {
        Err(ForecastError::Provider(ProviderError::Request(msg))) => {
            assert_eq!(msg, "connection refused")
        }
        other => panic!("Expected provider error, got {other:?}"),
    }
}

#[test]
fn repeated_forecasts_are_identical() {
    let today = day("2024-04-01");
    let first = forecaster().forecast_as_of("AAPL", 6, today).unwrap();
    let second = forecaster().forecast_as_of("AAPL", 6, today).unwrap();
    assert_eq!(first, second);
}

#[test]
fn thread_count_does_not_change_the_result() {
    let today = day("2024-04-01");
    let parallel = forecaster().forecast_as_of("AAPL", 4, today).unwrap();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap();
    let sequential = pool
        .install(|| forecaster().forecast_as_of("AAPL", 4, today))
        .unwrap();

    assert_eq!(parallel.predicted(), sequential.predicted());
    assert_eq!(parallel.forecast(), sequential.forecast());
    assert_eq!(parallel.best_params(), sequential.best_params());
}

#[test]
fn selected_params_come_from_the_grid() {
    let bundle = forecaster()
        .forecast_as_of("AAPL", 3, day("2024-04-01"))
        .unwrap();
    let grid = small_config().grid;

    assert!(grid.combinations().contains(&bundle.best_params()));
    assert!(bundle.cv_score() <= 0.0);
}

#[test]
fn invalid_config_is_rejected() {
    let config = ForecastConfig {
        cv_folds: 1,
        ..ForecastConfig::default()
    };
    let result = Forecaster::new(InMemoryProvider::new()).with_config(config);
    assert!(matches!(result, Err(ForecastError::ConfigError(_))));
}
