//! Chart-ready figure descriptions.
//!
//! A [`Figure`] is a plain value that a rendering layer can draw as an
//! overlaid line/scatter chart. It serializes to JSON with one entry per
//! trace, each holding paired `x`/`y` arrays.

use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::Serialize;

/// How a trace is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TraceMode {
    #[serde(rename = "markers")]
    Markers,
    #[serde(rename = "lines")]
    Lines,
    #[serde(rename = "lines+markers")]
    LinesMarkers,
}

/// A horizontal-axis value: a sample position or a calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AxisValue {
    Index(usize),
    Date(NaiveDate),
}

/// One labelled series on a figure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    pub mode: TraceMode,
    pub x: Vec<AxisValue>,
    pub y: Vec<f64>,
}

impl Trace {
    /// Build a trace from `(x, y)` pairs
    pub fn from_points<I>(name: &str, mode: TraceMode, points: I) -> Self
    where
        I: IntoIterator<Item = (AxisValue, f64)>,
    {
        let (x, y) = points.into_iter().unzip();
        Self {
            name: name.to_string(),
            mode,
            x,
            y,
        }
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

/// Titled collection of traces sharing two axes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub traces: Vec<Trace>,
}

impl Figure {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_axis_title: "Date".to_string(),
            y_axis_title: "Close Price".to_string(),
            traces: Vec::new(),
        }
    }

    pub fn with_axes(mut self, x_axis_title: &str, y_axis_title: &str) -> Self {
        self.x_axis_title = x_axis_title.to_string();
        self.y_axis_title = y_axis_title.to_string();
        self
    }

    pub fn with_trace(mut self, trace: Trace) -> Self {
        self.traces.push(trace);
        self
    }

    /// Look up a trace by its label
    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.traces.iter().find(|t| t.name == name)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ForecastError::DataError(format!("Failed to serialize figure: {e}")))
    }
}

fn dated(series: &PriceSeries, values: &[f64]) -> Vec<(AxisValue, f64)> {
    series
        .dates()
        .into_iter()
        .map(AxisValue::Date)
        .zip(values.iter().copied())
        .collect()
}

/// Close and open prices over time
pub fn price_figure(series: &PriceSeries) -> Figure {
    Figure::new("Stock Prices Over Time")
        .with_axes("Date", "Price")
        .with_trace(Trace::from_points(
            "Close",
            TraceMode::Lines,
            dated(series, &series.close_prices()),
        ))
        .with_trace(Trace::from_points(
            "Open",
            TraceMode::Lines,
            dated(series, &series.open_prices()),
        ))
}

/// Exponential moving average of the closes
pub fn ema_figure(series: &PriceSeries, span: usize) -> Result<Figure> {
    let ema = series.ema(span)?;
    Ok(Figure::new(format!("{span}-Day Exponential Moving Average"))
        .with_axes("Date", &format!("EMA_{span}"))
        .with_trace(Trace::from_points(
            &format!("EMA_{span}"),
            TraceMode::LinesMarkers,
            dated(series, &ema),
        )))
}
