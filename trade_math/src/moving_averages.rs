//! Moving average calculation implementations
//!
//! The exponential moving average here is seeded with the first observation
//! and updated recursively, which is what charting front ends expect from an
//! "EMA with span N":
//!
//! ```text
//! alpha  = 2 / (span + 1)
//! ema[0] = x[0]
//! ema[t] = alpha * x[t] + (1 - alpha) * ema[t-1]
//! ```

use crate::{MathError, Result};

/// Exponential Moving Average (EMA) implementation
#[derive(Debug, Clone)]
pub struct ExponentialMovingAverage {
    span: usize,
    alpha: f64,
    current_ema: Option<f64>,
}

impl ExponentialMovingAverage {
    /// Create a new Exponential Moving Average with the specified span
    pub fn new(span: usize) -> Result<Self> {
        if span == 0 {
            return Err(MathError::InvalidInput(
                "Span must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            span,
            alpha: 2.0 / (span as f64 + 1.0),
            current_ema: None,
        })
    }

    /// Update the EMA with a new value and return the updated average
    pub fn update(&mut self, value: f64) -> Result<f64> {
        if !value.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "EMA input must be finite, got {value}"
            )));
        }

        let next = match self.current_ema {
            None => value,
            Some(current) => self.alpha * value + (1.0 - self.alpha) * current,
        };
        self.current_ema = Some(next);

        Ok(next)
    }

    /// Get the current EMA value
    pub fn value(&self) -> Result<f64> {
        self.current_ema.ok_or_else(|| {
            MathError::InsufficientData("EMA has not seen any values yet".to_string())
        })
    }

    /// Get the span
    pub fn span(&self) -> usize {
        self.span
    }

    /// Get the smoothing factor
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Reset the EMA, clearing all values
    pub fn reset(&mut self) {
        self.current_ema = None;
    }
}

/// Compute the EMA of every prefix of `values`, one output per input.
pub fn ema_series(values: &[f64], span: usize) -> Result<Vec<f64>> {
    let mut ema = ExponentialMovingAverage::new(span)?;
    values.iter().map(|&v| ema.update(v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ema_seeded_with_first_value() {
        let mut ema = ExponentialMovingAverage::new(3).unwrap();

        assert!(ema.value().is_err());

        assert_eq!(ema.update(2.0).unwrap(), 2.0);
        // alpha = 0.5
        assert_relative_eq!(ema.update(4.0).unwrap(), 3.0);
        assert_relative_eq!(ema.update(6.0).unwrap(), 4.5);
        assert_relative_eq!(ema.value().unwrap(), 4.5);
    }

    #[test]
    fn test_ema_series_span_20() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let ema = ema_series(&closes, 20).unwrap();

        assert_eq!(ema.len(), closes.len());
        assert_eq!(ema[0], 100.0);

        let alpha = 2.0 / 21.0;
        let expected_second = alpha * 101.0 + (1.0 - alpha) * 100.0;
        assert_relative_eq!(ema[1], expected_second, epsilon = 1e-12);

        // A rising series keeps the average below the latest price.
        assert!(ema[29] < closes[29]);
    }

    #[test]
    fn test_ema_rejects_bad_input() {
        assert!(ExponentialMovingAverage::new(0).is_err());
        assert!(ema_series(&[1.0, f64::NAN], 5).is_err());
        assert!(ema_series(&[], 5).unwrap().is_empty());
    }

    #[test]
    fn test_reset() {
        let mut ema = ExponentialMovingAverage::new(4).unwrap();
        ema.update(10.0).unwrap();
        ema.reset();
        assert!(ema.value().is_err());
        assert_eq!(ema.span(), 4);
        assert_relative_eq!(ema.alpha(), 0.4);
    }
}
