use chrono::NaiveDate;
use price_forecast::providers::SimulatedProvider;
use price_forecast::{ForecastConfig, Forecaster, HyperparameterGrid};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Price Forecast: Basic Forecast Example");
    println!("======================================\n");

    let today = NaiveDate::from_ymd_opt(2024, 6, 28).ok_or("invalid date")?;
    let provider = SimulatedProvider::new(today).with_start_price(180.0);

    // A reduced grid keeps the example quick
    let config = ForecastConfig::default().with_grid(HyperparameterGrid {
        c: vec![1.0, 100.0, 1000.0],
        epsilon: vec![0.01, 0.1],
        gamma: vec![0.001, 0.01, 0.1],
    });
    let forecaster = Forecaster::new(provider).with_config(config)?;

    let bundle = forecaster.forecast_as_of("AAPL", 6, today)?;
    println!("Best parameters: {}", bundle.best_params());
    println!("Cross-validated score (neg. MAE): {:.4}", bundle.cv_score());
    println!("Held-out accuracy:\n{}\n", bundle.test_accuracy()?);

    println!("{}", bundle.title());
    for point in bundle.forecast() {
        println!("  {}: {:.2}", point.date, point.value);
    }

    Ok(())
}
