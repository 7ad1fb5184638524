//! Error metrics for comparing predictions against observed values

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

fn check_lengths(predicted: &[f64], actual: &[f64]) -> Result<()> {
    if predicted.len() != actual.len() {
        return Err(MathError::InvalidInput(format!(
            "Predicted length ({}) doesn't match actual length ({})",
            predicted.len(),
            actual.len()
        )));
    }
    if predicted.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot score an empty set of predictions".to_string(),
        ));
    }
    Ok(())
}

/// Mean absolute error between predictions and observations
pub fn mean_absolute_error(predicted: &[f64], actual: &[f64]) -> Result<f64> {
    check_lengths(predicted, actual)?;

    let sum: f64 = predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (a - p).abs())
        .sum();

    Ok(sum / predicted.len() as f64)
}

/// Calculate accuracy metrics for a set of predictions vs actual values
pub fn forecast_accuracy(predicted: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    check_lengths(predicted, actual)?;

    let n = predicted.len() as f64;
    let errors: Vec<f64> = predicted
        .iter()
        .zip(actual)
        .map(|(&p, &a)| a - p)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;
    let rmse = mse.sqrt();

    // Zero observations are skipped in the numerator but still counted in n.
    let mape = actual
        .iter()
        .zip(&errors)
        .filter(|(&a, _)| a != 0.0)
        .map(|(&a, &e)| (e.abs() / a.abs()) * 100.0)
        .sum::<f64>()
        / n;

    let smape = actual
        .iter()
        .zip(predicted)
        .map(|(&a, &p)| {
            let denom = a.abs() + p.abs();
            if denom == 0.0 {
                0.0
            } else {
                200.0 * (a - p).abs() / denom
            }
        })
        .sum::<f64>()
        / n;

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse,
        mape,
        smape,
    })
}

/// Forecast accuracy metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        writeln!(f, "  SMAPE: {:.4}%", self.smape)?;
        Ok(())
    }
}
