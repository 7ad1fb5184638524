//! Error types for the price_forecast crate

use crate::providers::ProviderError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the price_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The market-data provider returned no rows for the ticker
    #[error("No price data available for ticker '{0}'")]
    DataUnavailable(String),

    /// The requested horizon is shorter than one day
    #[error("Invalid forecast horizon: {0} (must be at least 1 day)")]
    InvalidHorizon(i64),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error raised while fitting or evaluating a model
    #[error("Model error: {0}")]
    ModelError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error in a configuration file or value
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Opaque failure from the market-data provider
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Error from numeric helpers
    #[error("Math error: {0}")]
    Math(#[from] trade_math::MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}
