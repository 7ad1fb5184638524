//! # Trade Math
//!
//! Numeric building blocks for price forecasting.
//! This crate has no I/O and no notion of tickers or dates; it works on plain
//! slices of `f64` so the forecasting crate can stay focused on data flow.

use thiserror::Error;

pub mod kernels;
pub mod metrics;
pub mod moving_averages;

/// Errors that can occur in trading-related calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for trading math operations
pub type Result<T> = std::result::Result<T, MathError>;
