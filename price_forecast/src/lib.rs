//! # Price Forecast
//!
//! Short-horizon stock price forecasting for a dashboard.
//!
//! ## Features
//!
//! - Daily price history from pluggable providers (in-memory, CSV directory,
//!   simulated, and Yahoo Finance behind the `fetch` feature)
//! - RBF support vector regression solved with SMO
//! - Exhaustive hyperparameter grid search with contiguous k-fold
//!   cross-validation, evaluated in parallel
//! - Chart-ready figures for the forecast, raw prices and the EMA indicator
//! - TOML configuration for the history window, split and grid
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use price_forecast::providers::SimulatedProvider;
//! use price_forecast::Forecaster;
//!
//! let today = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
//! let forecaster = Forecaster::new(SimulatedProvider::new(today));
//!
//! // Five days counted from today: four forecast points
//! let bundle = forecaster.forecast_as_of("AAPL", 5, today)?;
//! println!("{}", bundle.to_figure().to_json()?);
//! # Ok::<(), price_forecast::ForecastError>(())
//! ```

pub mod bundle;
pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod forecaster;
pub mod models;
pub mod providers;
pub mod split;
pub mod tuning;
pub mod utils;

// Re-export commonly used types
pub use crate::bundle::{DatedPoint, ForecastBundle, IndexedPoint};
pub use crate::config::ForecastConfig;
pub use crate::data::{DataLoader, HistoryWindow, Period, PriceBar, PriceSeries};
pub use crate::error::{ForecastError, Result};
pub use crate::forecaster::{forecast_series, Forecaster};
pub use crate::models::svr::{Svr, SvrParams};
pub use crate::providers::{MarketDataProvider, ProviderError};
pub use crate::tuning::{GridSearch, HyperparameterGrid};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
