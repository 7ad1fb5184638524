//! Exhaustive hyperparameter search with k-fold cross-validation.
//!
//! Every candidate is scored independently, so candidates are evaluated in
//! parallel with rayon. Scores are collected back in grid order before the
//! winner is picked, which keeps the outcome identical to a sequential run.

use crate::error::{ForecastError, Result};
use crate::models::svr::{FittedSvr, SolverSettings, Svr, SvrParams};
use crate::models::{FittedRegressor, Regressor};
use crate::split::kfold;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;
use trade_math::metrics::mean_absolute_error;

/// Candidate values for each SVR hyperparameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HyperparameterGrid {
    /// Regularization strengths
    pub c: Vec<f64>,
    /// Tube half-widths
    pub epsilon: Vec<f64>,
    /// Kernel widths
    pub gamma: Vec<f64>,
}

impl Default for HyperparameterGrid {
    fn default() -> Self {
        Self {
            c: vec![0.001, 0.01, 0.1, 1.0, 100.0, 1000.0],
            epsilon: vec![0.0001, 0.001, 0.01, 0.1, 1.0],
            gamma: vec![0.001, 0.01, 0.1, 1.0],
        }
    }
}

impl HyperparameterGrid {
    /// Number of parameter combinations
    pub fn len(&self) -> usize {
        self.c.len() * self.epsilon.len() * self.gamma.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All combinations; `c` varies slowest and `gamma` fastest
    pub fn combinations(&self) -> Vec<SvrParams> {
        let mut combos = Vec::with_capacity(self.len());
        for &c in &self.c {
            for &epsilon in &self.epsilon {
                for &gamma in &self.gamma {
                    combos.push(SvrParams { c, epsilon, gamma });
                }
            }
        }
        combos
    }

    pub fn validate(&self) -> Result<()> {
        for (name, values) in [("C", &self.c), ("epsilon", &self.epsilon), ("gamma", &self.gamma)] {
            if values.is_empty() {
                return Err(ForecastError::InvalidParameter(format!(
                    "Hyperparameter grid has no candidates for {name}"
                )));
            }
        }
        self.combinations().iter().try_for_each(SvrParams::validate)
    }
}

/// Cross-validated score of one grid point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandidateScore {
    pub params: SvrParams,
    /// Mean negative MAE over folds (higher is better)
    pub mean_score: f64,
    /// Population standard deviation of the fold scores
    pub std_score: f64,
}

/// Outcome of a grid search
#[derive(Debug, Clone)]
pub struct GridSearchResult {
    pub best_params: SvrParams,
    pub best_score: f64,
    /// Scores for every candidate, in grid order
    pub candidates: Vec<CandidateScore>,
    /// Best candidate refitted on the full training set
    pub model: FittedSvr,
}

/// Grid search over RBF-SVR hyperparameters scored by negative mean absolute error
#[derive(Debug, Clone)]
pub struct GridSearch {
    grid: HyperparameterGrid,
    folds: usize,
    solver: SolverSettings,
}

impl GridSearch {
    pub fn new(grid: HyperparameterGrid, folds: usize) -> Self {
        Self {
            grid,
            folds,
            solver: SolverSettings::default(),
        }
    }

    pub fn with_solver(mut self, solver: SolverSettings) -> Self {
        self.solver = solver;
        self
    }

    pub fn grid(&self) -> &HyperparameterGrid {
        &self.grid
    }

    /// Score every candidate and refit the winner on all of `xs`/`ys`.
    ///
    /// Ties go to the candidate that comes first in grid order.
    pub fn fit(&self, xs: &[f64], ys: &[f64]) -> Result<GridSearchResult> {
        self.grid.validate()?;
        if xs.len() != ys.len() {
            return Err(ForecastError::ModelError(format!(
                "Features length ({}) doesn't match targets length ({})",
                xs.len(),
                ys.len()
            )));
        }
        let folds = kfold(xs.len(), self.folds)?;

        let candidates: Vec<CandidateScore> = self
            .grid
            .combinations()
            .into_par_iter()
            .map(|params| -> Result<CandidateScore> {
                let model = Svr::new(params).with_solver(self.solver);
                let scores = folds
                    .iter()
                    .map(|fold| -> Result<f64> {
                        let train: Vec<usize> = fold.train_indices(xs.len()).collect();
                        let train_x: Vec<f64> = train.iter().map(|&i| xs[i]).collect();
                        let train_y: Vec<f64> = train.iter().map(|&i| ys[i]).collect();
                        let fitted = model.fit(&train_x, &train_y)?;

                        let predicted = fitted.predict(&xs[fold.validation.clone()]);
                        let mae = mean_absolute_error(&predicted, &ys[fold.validation.clone()])?;
                        Ok(-mae)
                    })
                    .collect::<Result<Vec<f64>>>()?;

                let candidate = CandidateScore {
                    params,
                    mean_score: scores.iter().mean(),
                    std_score: scores.iter().population_std_dev(),
                };
                debug!(
                    params = %params,
                    mean_score = candidate.mean_score,
                    std_score = candidate.std_score,
                    "scored grid candidate"
                );
                Ok(candidate)
            })
            .collect::<Result<Vec<_>>>()?;

        let best = select_best(&candidates).ok_or_else(|| {
            ForecastError::ModelError("Grid search produced no candidates".to_string())
        })?;

        let model = Svr::new(best.params)
            .with_solver(self.solver)
            .fit(xs, ys)?;

        Ok(GridSearchResult {
            best_params: best.params,
            best_score: best.mean_score,
            candidates,
            model,
        })
    }
}

/// First candidate with the highest mean score; NaN scores never win
fn select_best(candidates: &[CandidateScore]) -> Option<CandidateScore> {
    let mut best: Option<CandidateScore> = None;
    for candidate in candidates {
        let score = candidate.mean_score;
        let better = match best {
            None => true,
            Some(current) => {
                score > current.mean_score || (current.mean_score.is_nan() && !score.is_nan())
            }
        };
        if better {
            best = Some(*candidate);
        }
    }
    best
}
