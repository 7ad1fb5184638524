//! Regression models over a single scalar feature

use crate::error::Result;
use std::fmt::Debug;

/// Model that has been fitted to training data
pub trait FittedRegressor: Debug + Send + Sync {
    /// Predict the target for one feature value
    fn predict_one(&self, x: f64) -> f64;

    /// Predict the target for every feature value
    fn predict(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.predict_one(x)).collect()
    }
}

/// Regression model that can be fitted to (feature, target) pairs
pub trait Regressor: Debug + Clone + Send + Sync {
    /// The type of fitted model produced
    type Fitted: FittedRegressor;

    /// Fit the model on paired features and targets
    fn fit(&self, xs: &[f64], ys: &[f64]) -> Result<Self::Fitted>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod svr;
