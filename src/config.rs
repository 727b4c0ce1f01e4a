// src/config.rs

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::path::PathBuf;

/// Order in which covariance eigenpairs are reported and indexed.
///
/// The symmetric solver does not promise any particular order (LAPACK returns
/// ascending eigenvalues), and eigenvector signs are solver-dependent either way.
/// `AsReturned` carries the solver order through untouched, so "component 0"
/// is whatever the solver put first; `Descending` sorts the pairs so that
/// component 0 is the direction of maximal variance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EigenOrder {
    AsReturned,
    Descending,
}

/// Parameters of a single analysis run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// CSV file with a header row.
    pub data_path: PathBuf,
    /// Header names of the feature columns, in the order used for every matrix.
    pub feature_columns: Vec<String>,
    /// Header name of the regression target.
    pub target_column: String,
    /// Fraction of leading rows used for training; the remainder is the test split.
    pub train_fraction: f64,
    /// Ordering applied to the covariance eigenpairs.
    pub eigen_order: EigenOrder,
    /// Index of the eigenvector used to build the single-component regression score.
    pub selected_component: usize,
    /// Training row whose single-component prediction is reported next to its target.
    pub spot_check_row: Option<usize>,
}

impl Default for AnalysisConfig {
    /// The process dataset layout: `T`, `P`, `TC`, `SV` predicting `Idx`, 80/20 split.
    fn default() -> Self {
        AnalysisConfig {
            data_path: PathBuf::from("Data1.csv"),
            feature_columns: ["T", "P", "TC", "SV"].iter().map(|s| s.to_string()).collect(),
            target_column: "Idx".to_string(),
            train_fraction: 0.8,
            eigen_order: EigenOrder::AsReturned,
            selected_component: 0,
            spot_check_row: Some(500),
        }
    }
}

impl AnalysisConfig {
    pub fn with_data_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn with_feature_columns<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.feature_columns = columns.iter().map(|c| c.as_ref().to_string()).collect();
        self
    }

    pub fn with_target_column<S: Into<String>>(mut self, column: S) -> Self {
        self.target_column = column.into();
        self
    }

    pub fn with_train_fraction(mut self, fraction: f64) -> Self {
        self.train_fraction = fraction;
        self
    }

    pub fn with_eigen_order(mut self, order: EigenOrder) -> Self {
        self.eigen_order = order;
        self
    }

    pub fn with_selected_component(mut self, component: usize) -> Self {
        self.selected_component = component;
        self
    }

    pub fn with_spot_check_row(mut self, row: Option<usize>) -> Self {
        self.spot_check_row = row;
        self
    }

    /// Checks the parameters that do not depend on the data itself.
    ///
    /// # Errors
    /// Returns an error if no feature columns are configured, a column name is
    /// repeated (including the target among the features), the train fraction is
    /// not strictly between 0 and 1, or the selected component is out of range.
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.feature_columns.is_empty() {
            return Err("At least one feature column must be configured.".into());
        }
        let mut seen = HashSet::new();
        for name in self.feature_columns.iter().chain(std::iter::once(&self.target_column)) {
            if !seen.insert(name.as_str()) {
                return Err(format!("Column '{}' is configured more than once.", name).into());
            }
        }
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(format!(
                "Train fraction must lie strictly between 0 and 1, got {}.",
                self.train_fraction
            )
            .into());
        }
        if self.selected_component >= self.feature_columns.len() {
            return Err(format!(
                "Selected component {} is out of range for {} features.",
                self.selected_component,
                self.feature_columns.len()
            )
            .into());
        }
        Ok(())
    }
}
