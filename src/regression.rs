//! Ordinary least squares

use crate::linalg_backends::{BackendLeastSquares, NdarrayLinAlgBackend};
use log::{debug, warn};
use ndarray::{concatenate, s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::Serialize;
use std::error::Error;

/// An ordinary least squares linear regression model.
///
/// Solves the overconstrained model `y = X b + c` by finding the `b` and `c`
/// that minimize `||y - X b - c||_2`, using an SVD least-squares solve so that
/// rank-deficient designs still yield the minimum-norm solution.
#[derive(Clone, Copy, Debug)]
pub struct LinearRegression {
    fit_intercept: bool,
}

/// A fitted linear regression model which can be used for making predictions.
#[derive(Clone, Debug, Serialize)]
pub struct FittedLinearRegression {
    intercept: f64,
    params: Array1<f64>,
}

impl Default for LinearRegression {
    fn default() -> Self {
        LinearRegression::new()
    }
}

impl LinearRegression {
    /// Create a default linear regression model.
    /// By default, an intercept will be fitted.
    pub fn new() -> LinearRegression {
        LinearRegression { fit_intercept: true }
    }

    /// Configure the linear regression model to fit an intercept.
    pub fn with_intercept(mut self, intercept: bool) -> Self {
        self.fit_intercept = intercept;
        self
    }

    pub fn fit(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<FittedLinearRegression, Box<dyn Error>> {
        self.fit_with_backend(x, y, &NdarrayLinAlgBackend)
    }

    /// Fit a linear regression model given a feature matrix `x` of shape
    /// `(n_samples, n_features)` and a target `y` of shape `(n_samples)`.
    pub fn fit_with_backend<B: BackendLeastSquares>(
        &self,
        x: ArrayView2<f64>,
        y: ArrayView1<f64>,
        backend: &B,
    ) -> Result<FittedLinearRegression, Box<dyn Error>> {
        let (n_samples, n_features) = x.dim();
        if n_samples != y.len() {
            return Err(format!(
                "Feature matrix has {} rows but target has {} entries.",
                n_samples,
                y.len()
            )
            .into());
        }
        if n_samples == 0 {
            return Err("Cannot fit a linear regression on zero samples.".into());
        }

        let ones = Array2::<f64>::ones((n_samples, 1));
        let design = if self.fit_intercept {
            concatenate(Axis(1), &[x.view(), ones.view()])?
        } else {
            x.to_owned()
        };
        let solved = backend
            .least_squares(&design, &y.to_owned())
            .map_err(|e| format!("Least squares solve failed: {}", e))?;
        if solved.rank < design.ncols() {
            warn!(
                "Design matrix is rank deficient (rank {} < {} columns); returning the minimum-norm solution.",
                solved.rank,
                design.ncols()
            );
        }

        let (intercept, params) = if self.fit_intercept {
            (solved.solution[n_features], solved.solution.slice(s![..n_features]).to_owned())
        } else {
            (0.0, solved.solution)
        };
        debug!("Fitted OLS params {:?}, intercept {}", params, intercept);
        Ok(FittedLinearRegression { intercept, params })
    }
}

/// View the fitted parameters and make predictions with a fitted
/// linear regression model.
impl FittedLinearRegression {
    /// Get the fitted parameters
    pub fn params(&self) -> &Array1<f64> {
        &self.params
    }

    /// Get the fitted intercept, 0. if no intercept was fitted
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Given an input matrix `x` with shape `(n_samples, n_features)`,
    /// returns the predicted target for every row.
    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>, Box<dyn Error>> {
        if x.ncols() != self.params.len() {
            return Err(format!(
                "Model was fitted on {} features but input has {}.",
                self.params.len(),
                x.ncols()
            )
            .into());
        }
        Ok(x.dot(&self.params) + self.intercept)
    }

    /// Convenience for single-regressor models: predicts from a vector of scores.
    pub fn predict_single(&self, scores: ArrayView1<f64>) -> Result<Array1<f64>, Box<dyn Error>> {
        self.predict(scores.insert_axis(Axis(1)))
    }
}
