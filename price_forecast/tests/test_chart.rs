use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use price_forecast::chart::{ema_figure, price_figure, AxisValue, TraceMode};
use price_forecast::providers::InMemoryProvider;
use price_forecast::{ForecastConfig, Forecaster, HyperparameterGrid, PriceSeries};

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn series() -> PriceSeries {
    let dates = day("2024-02-01").iter_days().take(40).collect();
    let closes = (0..40).map(|i| 20.0 + (i % 7) as f64).collect();
    PriceSeries::from_closes("TSLA", dates, closes).unwrap()
}

#[test]
fn forecast_figure_traces() {
    let config = ForecastConfig::default().with_grid(HyperparameterGrid {
        c: vec![1.0],
        epsilon: vec![0.1],
        gamma: vec![0.1],
    });
    let forecaster = Forecaster::new(InMemoryProvider::new().with_series(series()))
        .with_config(config)
        .unwrap();
    let bundle = forecaster.forecast_as_of("TSLA", 3, day("2024-04-01")).unwrap();
    let figure = bundle.to_figure();

    assert_eq!(figure.title, "Predicted Stock Prices for 2 Days");
    assert_eq!(figure.x_axis_title, "Date");
    assert_eq!(figure.y_axis_title, "Close Price");

    let names: Vec<&str> = figure.traces.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Actual", "Predicted", "Forecast"]);

    let actual = figure.trace("Actual").unwrap();
    let predicted = figure.trace("Predicted").unwrap();
    let forecast = figure.trace("Forecast").unwrap();
    assert_eq!(actual.mode, TraceMode::Markers);
    assert_eq!(predicted.mode, TraceMode::Lines);
    assert_eq!(forecast.mode, TraceMode::LinesMarkers);
    assert_eq!(actual.x, predicted.x);
    assert_eq!(actual.x[0], AxisValue::Index(36));
    assert_eq!(
        forecast.x,
        vec![AxisValue::Date(day("2024-04-01")), AxisValue::Date(day("2024-04-02"))]
    );

    let json: serde_json::Value = serde_json::from_str(&figure.to_json().unwrap()).unwrap();
    assert_eq!(json["traces"][2]["mode"], "lines+markers");
    assert_eq!(json["traces"][2]["x"][1], "2024-04-02");
    assert_eq!(json["traces"][0]["x"][0], 36);
}

#[test]
fn price_and_indicator_figures() {
    let series = series();

    let prices = price_figure(&series);
    assert_eq!(prices.traces.len(), 2);
    assert_eq!(prices.trace("Close").unwrap().len(), 40);

    let ema = ema_figure(&series, 20).unwrap();
    let trace = ema.trace("EMA_20").unwrap();
    assert_eq!(trace.len(), 40);
    assert_eq!(trace.x[0], AxisValue::Date(day("2024-02-01")));
    // Seeded with the first close and smoothed with alpha = 2 / 21
    approx::assert_relative_eq!(trace.y[1], 20.0 + 2.0 / 21.0, epsilon = 1e-12);
}

#[test]
fn accuracy_of_held_out_predictions() {
    let config = ForecastConfig::default().with_grid(HyperparameterGrid {
        c: vec![10.0],
        epsilon: vec![0.1],
        gamma: vec![0.1],
    });
    let forecaster = Forecaster::new(InMemoryProvider::new().with_series(series()))
        .with_config(config)
        .unwrap();
    let bundle = forecaster.forecast_as_of("TSLA", 2, day("2024-04-01")).unwrap();

    let accuracy = bundle.test_accuracy().unwrap();
    assert!(accuracy.mae >= 0.0);
    approx::assert_relative_eq!(accuracy.rmse, accuracy.mse.sqrt(), epsilon = 1e-12);
}
