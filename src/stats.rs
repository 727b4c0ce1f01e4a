// src/stats.rs

use log::warn;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use std::error::Error;

/// Column-wise standardization statistics (ddof = 0).
#[derive(Clone, Debug)]
pub struct ColumnScaling {
    pub mean: Array1<f64>,
    /// Population standard deviations, with constant columns replaced by 1.0.
    pub scale: Array1<f64>,
}

/// Centers each column on its mean and divides by its population standard
/// deviation. A column whose deviation is within rounding noise of its own
/// magnitude is treated as constant and only centered.
pub fn standardize(data: ArrayView2<f64>) -> Result<(Array2<f64>, ColumnScaling), Box<dyn Error>> {
    let mean = data
        .mean_axis(Axis(0))
        .ok_or("Cannot standardize a matrix with zero samples.")?;
    let mut standardized = &data - &mean;
    let magnitudes = data.map_axis(Axis(0), |column| column.iter().fold(0.0f64, |acc, v| acc.max(v.abs())));
    let std_devs = standardized.map_axis(Axis(0), |column| column.std(0.0));
    let mut scale = std_devs.clone();
    for (column, (value, &magnitude)) in scale.iter_mut().zip(magnitudes.iter()).enumerate() {
        if !is_degenerate(*value, magnitude) {
            continue;
        }
        warn!("Column {} has zero variance (std = {}); it is centered but not scaled.", column, value);
        *value = 1.0;
    }
    standardized /= &scale;
    Ok((standardized, ColumnScaling { mean, scale }))
}

fn is_degenerate(std_dev: f64, magnitude: f64) -> bool {
    !std_dev.is_finite() || std_dev <= 10.0 * f64::EPSILON * magnitude
}

/// Sample covariance of the columns of `data` (rows are observations), ddof = 1.
///
/// The result is the (n_features x n_features) matrix
/// `sum_i (x_i - mean)(x_i - mean)^T / (n - 1)`.
pub fn covariance(data: ArrayView2<f64>) -> Result<Array2<f64>, Box<dyn Error>> {
    let n_samples = data.nrows();
    if n_samples < 2 {
        return Err(format!("Covariance needs at least 2 samples, got {}.", n_samples).into());
    }
    let mean = data
        .mean_axis(Axis(0))
        .ok_or("Failed to compute column means.")?;
    let centered = &data - &mean;
    let mut cov = centered.t().dot(&centered);
    cov /= (n_samples - 1) as f64;
    Ok(cov)
}
