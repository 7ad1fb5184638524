//! The forecast result handed to the rendering layer

use crate::chart::{AxisValue, Figure, Trace, TraceMode};
use crate::error::{ForecastError, Result};
use crate::models::svr::SvrParams;
use chrono::NaiveDate;
use serde::Serialize;
use trade_math::metrics::{forecast_accuracy, ForecastAccuracy};

/// A value at a sample position
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndexedPoint {
    pub index: usize,
    pub value: f64,
}

/// A value on a calendar date
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DatedPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Held-out actual prices, model predictions for them, and the forward forecast.
///
/// `actual` and `predicted` share the same sample positions. `forecast` holds
/// `horizon_days - 1` points dated from the day the forecast was made.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastBundle {
    ticker: String,
    horizon_days: usize,
    actual: Vec<IndexedPoint>,
    predicted: Vec<IndexedPoint>,
    forecast: Vec<DatedPoint>,
    best_params: SvrParams,
    cv_score: f64,
}

impl ForecastBundle {
    pub(crate) fn new(
        ticker: &str,
        horizon_days: usize,
        actual: Vec<IndexedPoint>,
        predicted: Vec<IndexedPoint>,
        forecast: Vec<DatedPoint>,
        best_params: SvrParams,
        cv_score: f64,
    ) -> Result<Self> {
        let same_positions = actual.len() == predicted.len()
            && actual
                .iter()
                .zip(&predicted)
                .all(|(a, p)| a.index == p.index);
        if !same_positions {
            return Err(ForecastError::ModelError(
                "Predicted points must align with actual points".to_string(),
            ));
        }
        if forecast.len() + 1 != horizon_days {
            return Err(ForecastError::ModelError(format!(
                "Expected {} forecast points for a {horizon_days}-day horizon, got {}",
                horizon_days.saturating_sub(1),
                forecast.len()
            )));
        }

        Ok(Self {
            ticker: ticker.to_string(),
            horizon_days,
            actual,
            predicted,
            forecast,
            best_params,
            cv_score,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn horizon_days(&self) -> usize {
        self.horizon_days
    }

    pub fn actual(&self) -> &[IndexedPoint] {
        &self.actual
    }

    pub fn predicted(&self) -> &[IndexedPoint] {
        &self.predicted
    }

    pub fn forecast(&self) -> &[DatedPoint] {
        &self.forecast
    }

    /// Hyperparameters chosen by the grid search
    pub fn best_params(&self) -> SvrParams {
        self.best_params
    }

    /// Best mean cross-validated score (negative MAE)
    pub fn cv_score(&self) -> f64 {
        self.cv_score
    }

    pub fn title(&self) -> String {
        format!(
            "Predicted Stock Prices for {} Days",
            self.horizon_days.saturating_sub(1)
        )
    }

    /// Error metrics of the predictions on the held-out days
    pub fn test_accuracy(&self) -> Result<ForecastAccuracy> {
        let actual: Vec<f64> = self.actual.iter().map(|p| p.value).collect();
        let predicted: Vec<f64> = self.predicted.iter().map(|p| p.value).collect();
        Ok(forecast_accuracy(&predicted, &actual)?)
    }

    /// Actual (markers), Predicted (lines) and Forecast (lines+markers) traces
    pub fn to_figure(&self) -> Figure {
        let indexed = |points: &[IndexedPoint]| -> Vec<(AxisValue, f64)> {
            points
                .iter()
                .map(|p| (AxisValue::Index(p.index), p.value))
                .collect()
        };

        Figure::new(self.title())
            .with_axes("Date", "Close Price")
            .with_trace(Trace::from_points(
                "Actual",
                TraceMode::Markers,
                indexed(&self.actual),
            ))
            .with_trace(Trace::from_points(
                "Predicted",
                TraceMode::Lines,
                indexed(&self.predicted),
            ))
            .with_trace(Trace::from_points(
                "Forecast",
                TraceMode::LinesMarkers,
                self.forecast
                    .iter()
                    .map(|p| (AxisValue::Date(p.date), p.value)),
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_date;

    fn params() -> SvrParams {
        SvrParams {
            c: 1.0,
            epsilon: 0.1,
            gamma: 0.1,
        }
    }

    fn points(values: &[(usize, f64)]) -> Vec<IndexedPoint> {
        values
            .iter()
            .map(|&(index, value)| IndexedPoint { index, value })
            .collect()
    }

    #[test]
    fn rejects_misaligned_predictions() {
        let result = ForecastBundle::new(
            "AAPL",
            1,
            points(&[(8, 1.0), (9, 2.0)]),
            points(&[(8, 1.0), (10, 2.0)]),
            vec![],
            params(),
            -1.0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn figure_and_accuracy() {
        let bundle = ForecastBundle::new(
            "AAPL",
            2,
            points(&[(8, 10.0), (9, 12.0)]),
            points(&[(8, 11.0), (9, 11.0)]),
            vec![DatedPoint {
                date: parse_date("2024-05-01").unwrap(),
                value: 11.5,
            }],
            params(),
            -0.5,
        )
        .unwrap();

        assert_eq!(bundle.title(), "Predicted Stock Prices for 1 Days");
        assert_eq!(bundle.test_accuracy().unwrap().mae, 1.0);

        let figure = bundle.to_figure();
        assert_eq!(figure.y_axis_title, "Close Price");
        assert_eq!(figure.trace("Actual").unwrap().mode, TraceMode::Markers);
        assert_eq!(figure.trace("Predicted").unwrap().x, vec![AxisValue::Index(8), AxisValue::Index(9)]);
        assert_eq!(
            figure.trace("Forecast").unwrap().x,
            vec![AxisValue::Date(parse_date("2024-05-01").unwrap())]
        );
    }
}
