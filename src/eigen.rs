// src/eigen.rs

use crate::config::EigenOrder;
use crate::linalg_backends::BackendEigh;
use log::{debug, warn};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::Serialize;
use std::error::Error;

/// Eigenpairs of a covariance matrix in a known, configured order.
///
/// Eigenvector signs are whatever the solver produced and are never flipped.
#[derive(Clone, Debug, Serialize)]
pub struct CovarianceEigen {
    /// Shape: (n_features)
    pub eigenvalues: Array1<f64>,
    /// Shape: (n_features, n_features); column i belongs to eigenvalues[i].
    pub eigenvectors: Array2<f64>,
    pub order: EigenOrder,
}

/// A component retained by the Kaiser criterion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct KaiserComponent {
    /// Position in the eigenpair order.
    pub index: usize,
    pub eigenvalue: f64,
}

impl CovarianceEigen {
    /// Eigendecomposes a symmetric covariance matrix.
    ///
    /// With `EigenOrder::AsReturned` the solver's ordering is kept as is; with
    /// `EigenOrder::Descending` the pairs are sorted by decreasing eigenvalue.
    pub fn decompose<B: BackendEigh>(
        covariance: &Array2<f64>,
        order: EigenOrder,
        backend: &B,
    ) -> Result<Self, Box<dyn Error>> {
        let output = backend
            .eigh_upper(covariance)
            .map_err(|e| format!("Eigen decomposition of covariance matrix failed: {}", e))?;
        debug!("Solver eigenvalues (native order): {:?}", output.eigenvalues);

        let (eigenvalues, eigenvectors) = match order {
            EigenOrder::AsReturned => (output.eigenvalues, output.eigenvectors),
            EigenOrder::Descending => {
                let mut indices: Vec<usize> = (0..output.eigenvalues.len()).collect();
                indices.sort_by(|&a, &b| {
                    output.eigenvalues[b]
                        .partial_cmp(&output.eigenvalues[a])
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                (
                    output.eigenvalues.select(Axis(0), &indices),
                    output.eigenvectors.select(Axis(1), &indices),
                )
            }
        };
        Ok(Self { eigenvalues, eigenvectors, order })
    }

    pub fn n_components(&self) -> usize {
        self.eigenvalues.len()
    }

    pub fn total_variance(&self) -> f64 {
        self.eigenvalues.sum()
    }

    /// Each eigenvalue as a percentage of the eigenvalue sum.
    pub fn percent_variance(&self) -> Array1<f64> {
        let total = self.total_variance();
        if total.abs() <= f64::EPSILON {
            return Array1::zeros(self.eigenvalues.len());
        }
        self.eigenvalues.mapv(|v| v / total * 100.0)
    }

    /// Index of the component with the largest eigenvalue.
    pub fn leading_component(&self) -> Option<usize> {
        self.eigenvalues
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
    }

    /// Logs a warning if `component` is not the maximal-variance direction.
    pub fn warn_if_not_leading(&self, component: usize) {
        if let Some(leading) = self.leading_component() {
            if leading != component && component < self.n_components() {
                warn!(
                    "Component {} in {:?} order has eigenvalue {:.6}, but component {} carries the largest variance ({:.6}); \
                     scores built on component {} are not the first principal component.",
                    component,
                    self.order,
                    self.eigenvalues[component],
                    leading,
                    self.eigenvalues[leading],
                    component
                );
            }
        }
    }

    /// Components whose eigenvalue is strictly greater than the mean eigenvalue.
    pub fn kaiser_criterion(&self) -> Vec<KaiserComponent> {
        kaiser_criterion(self.eigenvalues.view())
    }

    /// Projects (already standardized) rows onto all eigenvectors.
    pub fn project(&self, data: ArrayView2<f64>) -> Result<Array2<f64>, Box<dyn Error>> {
        self.check_width(data.ncols())?;
        Ok(data.dot(&self.eigenvectors))
    }

    /// Dot product of every row with eigenvector column `component`.
    pub fn component_scores(&self, data: ArrayView2<f64>, component: usize) -> Result<Array1<f64>, Box<dyn Error>> {
        self.check_width(data.ncols())?;
        if component >= self.n_components() {
            return Err(format!(
                "Component {} is out of range for {} eigenvectors.",
                component,
                self.n_components()
            )
            .into());
        }
        Ok(data.dot(&self.eigenvectors.column(component)))
    }

    fn check_width(&self, n_cols: usize) -> Result<(), Box<dyn Error>> {
        if n_cols != self.eigenvectors.nrows() {
            return Err(format!(
                "Data has {} columns but eigenvectors have dimension {}.",
                n_cols,
                self.eigenvectors.nrows()
            )
            .into());
        }
        Ok(())
    }
}

/// Kaiser criterion over an arbitrary eigenvalue sequence, in sequence order.
pub fn kaiser_criterion(eigenvalues: ArrayView1<f64>) -> Vec<KaiserComponent> {
    let mean = match eigenvalues.mean() {
        Some(m) => m,
        None => return Vec::new(),
    };
    eigenvalues
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v > mean)
        .map(|(index, &eigenvalue)| KaiserComponent { index, eigenvalue })
        .collect()
}
