//! Forecast configuration, loadable from TOML.
//!
//! Every field has a default, so a config file only needs the keys it
//! overrides:
//!
//! ```toml
//! history = "6mo"
//! cv_folds = 3
//!
//! [grid]
//! c = [1.0, 100.0]
//! gamma = [0.01, 0.1]
//! ```

use crate::data::HistoryWindow;
use crate::error::{ForecastError, Result};
use crate::models::svr::SolverSettings;
use crate::tuning::HyperparameterGrid;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// How much history to request from the provider
    pub history: HistoryWindow,
    /// Fraction of the most recent samples held out for testing
    pub test_fraction: f64,
    /// Number of cross-validation folds in the grid search
    pub cv_folds: usize,
    pub grid: HyperparameterGrid,
    pub solver: SolverSettings,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            history: HistoryWindow::default(),
            test_fraction: 0.1,
            cv_folds: 5,
            grid: HyperparameterGrid::default(),
            solver: SolverSettings::default(),
        }
    }
}

impl ForecastConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ForecastError::ConfigError(e.to_string()))
    }

    pub fn with_grid(mut self, grid: HyperparameterGrid) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_history(mut self, history: HistoryWindow) -> Self {
        self.history = history;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ForecastError::ConfigError(format!(
                "test_fraction must be between 0 and 1, got {}",
                self.test_fraction
            )));
        }
        if self.cv_folds < 2 {
            return Err(ForecastError::ConfigError(format!(
                "cv_folds must be at least 2, got {}",
                self.cv_folds
            )));
        }
        if !(self.solver.tolerance.is_finite() && self.solver.tolerance > 0.0) {
            return Err(ForecastError::ConfigError(format!(
                "solver.tolerance must be positive, got {}",
                self.solver.tolerance
            )));
        }
        if self.solver.max_iterations == 0 {
            return Err(ForecastError::ConfigError(
                "solver.max_iterations must be positive".to_string(),
            ));
        }
        if let HistoryWindow::Range { start, end } = self.history {
            if start >= end {
                return Err(ForecastError::ConfigError(format!(
                    "history range start {start} must be before end {end}"
                )));
            }
        }
        self.grid
            .validate()
            .map_err(|e| ForecastError::ConfigError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{parse_date, Period};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ForecastConfig::from_toml_str("").unwrap();
        assert_eq!(config, ForecastConfig::default());
        assert_eq!(config.history, HistoryWindow::Period(Period::ThreeMonths));
        assert_eq!(config.grid.len(), 120);
    }

    #[test]
    fn partial_overrides() {
        let config = ForecastConfig::from_toml_str(
            r#"
            history = "6mo"
            cv_folds = 3

            [grid]
            c = [1.0, 100.0]

            [solver]
            max_iterations = 5000
            "#,
        )
        .unwrap();

        assert_eq!(config.history, HistoryWindow::Period(Period::SixMonths));
        assert_eq!(config.cv_folds, 3);
        assert_eq!(config.grid.c, vec![1.0, 100.0]);
        assert_eq!(config.grid.gamma, HyperparameterGrid::default().gamma);
        assert_eq!(config.solver.max_iterations, 5000);
        assert_eq!(config.solver.tolerance, 1e-3);
    }

    #[test]
    fn date_range_history() {
        let config = ForecastConfig::from_toml_str(
            r#"history = { start = "2024-01-01", end = "2024-04-01" }"#,
        )
        .unwrap();
        assert_eq!(
            config.history,
            HistoryWindow::Range {
                start: parse_date("2024-01-01").unwrap(),
                end: parse_date("2024-04-01").unwrap(),
            }
        );
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(ForecastConfig::from_toml_str("test_fraction = 1.5").is_err());
        assert!(ForecastConfig::from_toml_str("cv_folds = 1").is_err());
        assert!(ForecastConfig::from_toml_str("history = \"7d\"").is_err());
        assert!(ForecastConfig::from_toml_str("[grid]\nepsilon = []").is_err());
        assert!(ForecastConfig::from_toml_str("[solver]\ntolerance = 0.0").is_err());
    }

    #[test]
    fn toml_output_parses_back() {
        let config = ForecastConfig::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("history = \"3mo\""));
        assert_eq!(ForecastConfig::from_toml_str(&text).unwrap(), config);
    }
}
