//! Error metrics for continuous predictions.

use float_cmp::approx_eq;
use ndarray::ArrayView1;
use serde::Serialize;
use std::error::Error;

/// Mean squared error and coefficient of determination of one prediction set.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RegressionScores {
    pub mse: f64,
    pub r2: f64,
}

impl RegressionScores {
    pub fn compute(predicted: ArrayView1<f64>, actual: ArrayView1<f64>) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            mse: mean_squared_error(predicted, actual)?,
            r2: r2_score(predicted, actual)?,
        })
    }
}

fn check_lengths(predicted: &ArrayView1<f64>, actual: &ArrayView1<f64>) -> Result<(), Box<dyn Error>> {
    if predicted.len() != actual.len() {
        return Err(format!(
            "Prediction length {} does not match target length {}.",
            predicted.len(),
            actual.len()
        )
        .into());
    }
    if actual.is_empty() {
        return Err("Cannot score an empty prediction set.".into());
    }
    Ok(())
}

/// Mean squared error between two continuous variables
pub fn mean_squared_error(predicted: ArrayView1<f64>, actual: ArrayView1<f64>) -> Result<f64, Box<dyn Error>> {
    check_lengths(&predicted, &actual)?;
    let sum_sq: f64 = predicted.iter().zip(actual.iter()).map(|(p, a)| (p - a) * (p - a)).sum();
    Ok(sum_sq / actual.len() as f64)
}

// r2 = 1 - sum((pred_i - y_i)^2)/sum((mean_y - y_i)^2)
// the mean is taken over `actual`, not over the predictions
/// R squared coefficient, the proportion of the variance in the target that is
/// predictable from the model.
///
/// A constant target has no variance to explain: the score is 1.0 for an exact
/// prediction and 0.0 otherwise.
pub fn r2_score(predicted: ArrayView1<f64>, actual: ArrayView1<f64>) -> Result<f64, Box<dyn Error>> {
    check_lengths(&predicted, &actual)?;
    let mean = actual.mean().ok_or("Cannot take the mean of an empty target.")?;
    let ss_res: f64 = predicted.iter().zip(actual.iter()).map(|(p, a)| (a - p) * (a - p)).sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean) * (a - mean)).sum();
    let first = actual[0];
    if ss_tot == 0.0 || actual.iter().all(|&a| a == first) {
        // Exactness is judged relative to the target's own magnitude.
        let margin = 64.0 * f64::EPSILON * first.abs();
        let exact = predicted
            .iter()
            .all(|&p| approx_eq!(f64, p, first, epsilon = margin, ulps = 4));
        return Ok(if exact { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}
