//! Epsilon support vector regression with an RBF kernel.
//!
//! The dual problem is solved with sequential minimal optimisation using
//! second-order working-set selection. The `2l` dual variables are laid out as
//! `alpha[0..l]` (upper-tube multipliers, sign +1) followed by
//! `alpha[l..2l]` (lower-tube multipliers, sign -1), so that
//!
//! ```text
//! Q[s][t] = sign(s) * sign(t) * K(x[s mod l], x[t mod l])
//! f(x)    = sum_k (alpha[k] - alpha[k + l]) * K(x[k], x) - rho
//! ```

use crate::error::{ForecastError, Result};
use crate::models::{FittedRegressor, Regressor};
use serde::{Deserialize, Serialize};
use std::fmt;
use trade_math::kernels::{rbf, rbf_gram};
use tracing::warn;

const TAU: f64 = 1e-12;

/// Hyperparameters of the RBF support vector regressor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SvrParams {
    /// Regularization strength
    pub c: f64,
    /// Half-width of the insensitive tube
    pub epsilon: f64,
    /// RBF kernel width
    pub gamma: f64,
}

impl SvrParams {
    pub fn new(c: f64, epsilon: f64, gamma: f64) -> Result<Self> {
        let params = Self { c, epsilon, gamma };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "C must be positive, got {}",
                self.c
            )));
        }
        if !(self.epsilon.is_finite() && self.epsilon >= 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "epsilon must be non-negative, got {}",
                self.epsilon
            )));
        }
        if !(self.gamma.is_finite() && self.gamma > 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "gamma must be positive, got {}",
                self.gamma
            )));
        }
        Ok(())
    }
}

impl fmt::Display for SvrParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "C={}, epsilon={}, gamma={}",
            self.c, self.epsilon, self.gamma
        )
    }
}

/// Stopping rules for the dual solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Maximal KKT violation accepted at convergence
    pub tolerance: f64,
    /// Hard cap on SMO iterations
    pub max_iterations: usize,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-3,
            max_iterations: 1_000_000,
        }
    }
}

/// RBF-kernel epsilon-SVR
#[derive(Debug, Clone)]
pub struct Svr {
    name: String,
    params: SvrParams,
    solver: SolverSettings,
}

impl Svr {
    pub fn new(params: SvrParams) -> Self {
        Self {
            name: format!("RBF SVR ({params})"),
            params,
            solver: SolverSettings::default(),
        }
    }

    pub fn with_solver(mut self, solver: SolverSettings) -> Self {
        self.solver = solver;
        self
    }

    pub fn params(&self) -> SvrParams {
        self.params
    }
}

/// Fitted RBF-kernel epsilon-SVR
#[derive(Debug, Clone)]
pub struct FittedSvr {
    params: SvrParams,
    support: Vec<f64>,
    coef: Vec<f64>,
    rho: f64,
    iterations: usize,
    converged: bool,
}

impl FittedSvr {
    pub fn params(&self) -> SvrParams {
        self.params
    }

    /// Feature values of the support vectors
    pub fn support_vectors(&self) -> &[f64] {
        &self.support
    }

    /// Dual coefficients `alpha - alpha*`, one per support vector
    pub fn dual_coef(&self) -> &[f64] {
        &self.coef
    }

    pub fn intercept(&self) -> f64 {
        -self.rho
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn converged(&self) -> bool {
        self.converged
    }
}

impl FittedRegressor for FittedSvr {
    fn predict_one(&self, x: f64) -> f64 {
        self.support
            .iter()
            .zip(&self.coef)
            .map(|(&sv, &coef)| coef * rbf(sv, x, self.params.gamma))
            .sum::<f64>()
            - self.rho
    }
}

impl Regressor for Svr {
    type Fitted = FittedSvr;

    fn fit(&self, xs: &[f64], ys: &[f64]) -> Result<FittedSvr> {
        self.params.validate()?;
        if xs.len() != ys.len() {
            return Err(ForecastError::ModelError(format!(
                "Features length ({}) doesn't match targets length ({})",
                xs.len(),
                ys.len()
            )));
        }
        if xs.is_empty() {
            return Err(ForecastError::ModelError(
                "Cannot fit on an empty training set".to_string(),
            ));
        }
        if xs.iter().chain(ys).any(|v| !v.is_finite()) {
            return Err(ForecastError::ModelError(
                "Training data contains non-finite values".to_string(),
            ));
        }

        let mut solver = DualSolver::new(xs, ys, self.params);
        let mut iterations = 0;
        let mut converged = false;
        while iterations < self.solver.max_iterations {
            let Some((i, j)) = solver.select_working_set(self.solver.tolerance) else {
                converged = true;
                break;
            };
            solver.update_pair(i, j);
            iterations += 1;
        }
        if !converged {
            warn!(
                params = %self.params,
                iterations,
                "SVR solver reached the iteration cap before converging"
            );
        }

        let rho = solver.rho();
        let l = xs.len();
        let (support, coef): (Vec<f64>, Vec<f64>) = (0..l)
            .map(|k| (xs[k], solver.alpha[k] - solver.alpha[k + l]))
            .filter(|&(_, c)| c != 0.0)
            .unzip();

        Ok(FittedSvr {
            params: self.params,
            support,
            coef,
            rho,
            iterations,
            converged,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

struct DualSolver {
    l: usize,
    c: f64,
    gram: Vec<f64>,
    alpha: Vec<f64>,
    grad: Vec<f64>,
}

impl DualSolver {
    fn new(xs: &[f64], ys: &[f64], params: SvrParams) -> Self {
        let l = xs.len();
        // With alpha = 0 the gradient equals the linear term.
        let grad = ys
            .iter()
            .map(|y| params.epsilon - y)
            .chain(ys.iter().map(|y| params.epsilon + y))
            .collect();

        Self {
            l,
            c: params.c,
            gram: rbf_gram(xs, params.gamma),
            alpha: vec![0.0; 2 * l],
            grad,
        }
    }

    fn sign(&self, t: usize) -> f64 {
        if t < self.l {
            1.0
        } else {
            -1.0
        }
    }

    fn kernel(&self, s: usize, t: usize) -> f64 {
        self.gram[(s % self.l) * self.l + (t % self.l)]
    }

    fn q(&self, s: usize, t: usize) -> f64 {
        self.sign(s) * self.sign(t) * self.kernel(s, t)
    }

    fn is_upper_bound(&self, t: usize) -> bool {
        self.alpha[t] >= self.c
    }

    fn is_lower_bound(&self, t: usize) -> bool {
        self.alpha[t] <= 0.0
    }

    /// Maximal violating pair with second-order choice of `j`; `None` once optimal
    fn select_working_set(&self, tolerance: f64) -> Option<(usize, usize)> {
        let n = 2 * self.l;

        let mut gmax = f64::NEG_INFINITY;
        let mut selected_i = None;
        for t in 0..n {
            if self.sign(t) > 0.0 {
                if !self.is_upper_bound(t) && -self.grad[t] >= gmax {
                    gmax = -self.grad[t];
                    selected_i = Some(t);
                }
            } else if !self.is_lower_bound(t) && self.grad[t] >= gmax {
                gmax = self.grad[t];
                selected_i = Some(t);
            }
        }
        let i = selected_i?;

        let mut gmax2 = f64::NEG_INFINITY;
        let mut selected_j = None;
        let mut best_obj = f64::INFINITY;
        for t in 0..n {
            let grad_diff = if self.sign(t) > 0.0 {
                if self.is_lower_bound(t) {
                    continue;
                }
                gmax2 = gmax2.max(self.grad[t]);
                gmax + self.grad[t]
            } else {
                if self.is_upper_bound(t) {
                    continue;
                }
                gmax2 = gmax2.max(-self.grad[t]);
                gmax - self.grad[t]
            };

            if grad_diff > 0.0 {
                let quad = 2.0 - 2.0 * self.kernel(i, t);
                let quad = if quad > 0.0 { quad } else { TAU };
                let obj = -(grad_diff * grad_diff) / quad;
                if obj <= best_obj {
                    best_obj = obj;
                    selected_j = Some(t);
                }
            }
        }

        if gmax + gmax2 < tolerance {
            return None;
        }
        selected_j.map(|j| (i, j))
    }

    /// Analytic two-variable step, clipped to the box `[0, C]`
    fn update_pair(&mut self, i: usize, j: usize) {
        let c = self.c;
        let (old_i, old_j) = (self.alpha[i], self.alpha[j]);
        let q_ij = self.q(i, j);

        if self.sign(i) != self.sign(j) {
            let quad = 2.0 + 2.0 * q_ij;
            let quad = if quad > 0.0 { quad } else { TAU };
            let delta = (-self.grad[i] - self.grad[j]) / quad;
            let diff = old_i - old_j;
            let (mut ai, mut aj) = (old_i + delta, old_j + delta);

            if diff > 0.0 {
                if aj < 0.0 {
                    aj = 0.0;
                    ai = diff;
                }
            } else if ai < 0.0 {
                ai = 0.0;
                aj = -diff;
            }
            if diff > 0.0 {
                if ai > c {
                    ai = c;
                    aj = c - diff;
                }
            } else if aj > c {
                aj = c;
                ai = c + diff;
            }
            self.alpha[i] = ai;
            self.alpha[j] = aj;
        } else {
            let quad = 2.0 - 2.0 * q_ij;
            let quad = if quad > 0.0 { quad } else { TAU };
            let delta = (self.grad[i] - self.grad[j]) / quad;
            let sum = old_i + old_j;
            let (mut ai, mut aj) = (old_i - delta, old_j + delta);

            if sum > c {
                if ai > c {
                    ai = c;
                    aj = sum - c;
                }
            } else if aj < 0.0 {
                aj = 0.0;
                ai = sum;
            }
            if sum > c {
                if aj > c {
                    aj = c;
                    ai = sum - c;
                }
            } else if ai < 0.0 {
                ai = 0.0;
                aj = sum;
            }
            self.alpha[i] = ai;
            self.alpha[j] = aj;
        }

        let delta_i = self.alpha[i] - old_i;
        let delta_j = self.alpha[j] - old_j;
        for t in 0..2 * self.l {
            self.grad[t] += self.q(i, t) * delta_i + self.q(j, t) * delta_j;
        }
    }

    /// Offset from the free variables, or the midpoint of the feasible interval
    fn rho(&self) -> f64 {
        let mut upper = f64::INFINITY;
        let mut lower = f64::NEG_INFINITY;
        let mut free_sum = 0.0;
        let mut free_count = 0usize;

        for t in 0..2 * self.l {
            let y_grad = self.sign(t) * self.grad[t];
            let positive = self.sign(t) > 0.0;
            if self.is_upper_bound(t) {
                if positive {
                    lower = lower.max(y_grad);
                } else {
                    upper = upper.min(y_grad);
                }
            } else if self.is_lower_bound(t) {
                if positive {
                    upper = upper.min(y_grad);
                } else {
                    lower = lower.max(y_grad);
                }
            } else {
                free_count += 1;
                free_sum += y_grad;
            }
        }

        if free_count > 0 {
            free_sum / free_count as f64
        } else {
            (upper + lower) / 2.0
        }
    }
}
