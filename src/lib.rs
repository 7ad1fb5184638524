//! # Stock Dash
//!
//! Umbrella crate for the stock dashboard workspace.
//!
//! - [`trade_math`]: numeric building blocks (RBF kernel, EMA, error metrics)
//! - [`price_forecast`]: price history providers, the SVR forecaster and
//!   chart-ready figures
//!
//! ## Example
//!
//! ```
//! use stock_dash_workspace::price_forecast::chart::ema_figure;
//! use stock_dash_workspace::price_forecast::data::parse_date;
//! use stock_dash_workspace::price_forecast::PriceSeries;
//!
//! let dates = ["2024-01-02", "2024-01-03", "2024-01-04"]
//!     .iter()
//!     .map(|d| parse_date(d).unwrap())
//!     .collect();
//! let series = PriceSeries::from_closes("AAPL", dates, vec![10.0, 11.0, 12.0]).unwrap();
//!
//! let figure = ema_figure(&series, 20).unwrap();
//! assert_eq!(figure.title, "20-Day Exponential Moving Average");
//! ```

pub use price_forecast;
pub use trade_math;
