// src/dataset.rs

use csv::ReaderBuilder;
use log::{debug, info};
use ndarray::{s, Array1, Array2};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Samples as rows, named feature columns plus one numeric target.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    /// Shape: (n_samples, n_features)
    pub features: Array2<f64>,
    /// Shape: (n_samples)
    pub targets: Array1<f64>,
    pub feature_names: Vec<String>,
    pub target_name: String,
}

impl Dataset {
    /// Builds a dataset from in-memory arrays.
    ///
    /// # Errors
    /// Returns an error if the number of rows of `features` differs from the
    /// length of `targets`, or if the number of names differs from the number of columns.
    pub fn new(
        features: Array2<f64>,
        targets: Array1<f64>,
        feature_names: Vec<String>,
        target_name: String,
    ) -> Result<Self, Box<dyn Error>> {
        if features.nrows() != targets.len() {
            return Err(format!(
                "Feature matrix has {} rows but there are {} targets.",
                features.nrows(),
                targets.len()
            )
            .into());
        }
        if features.ncols() != feature_names.len() {
            return Err(format!(
                "Feature matrix has {} columns but {} feature names were given.",
                features.ncols(),
                feature_names.len()
            )
            .into());
        }
        Ok(Self { features, targets, feature_names, target_name })
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Reads the named columns from a CSV file with a header row.
    pub fn from_csv_path<P: AsRef<Path>, S: AsRef<str>>(
        path: P,
        feature_columns: &[S],
        target_column: &str,
    ) -> Result<Self, Box<dyn Error>> {
        let file = File::open(path.as_ref())
            .map_err(|e| format!("Failed to open data file {:?}: {}", path.as_ref(), e))?;
        let dataset = Self::from_csv_reader(file, feature_columns, target_column)?;
        info!(
            "Loaded {} samples x {} features from {:?}",
            dataset.n_samples(),
            dataset.n_features(),
            path.as_ref()
        );
        Ok(dataset)
    }

    /// Reads the named columns from CSV text with a header row.
    ///
    /// Columns are located by header name, so their order in the file and any
    /// additional columns do not matter. Every selected cell must parse as `f64`.
    pub fn from_csv_reader<R: Read, S: AsRef<str>>(
        source: R,
        feature_columns: &[S],
        target_column: &str,
    ) -> Result<Self, Box<dyn Error>> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(source);
        let headers = reader
            .headers()
            .map_err(|e| format!("Failed to read CSV header: {}", e))?
            .clone();

        let column_index = |name: &str| -> Result<usize, Box<dyn Error>> {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| format!("Required column '{}' is missing from the CSV header.", name).into())
        };
        let feature_indices = feature_columns
            .iter()
            .map(|c| column_index(c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let target_index = column_index(target_column)?;
        debug!("Feature column indices {:?}, target column index {}", feature_indices, target_index);

        let n_features = feature_indices.len();
        let mut feature_values: Vec<f64> = Vec::new();
        let mut target_values: Vec<f64> = Vec::new();

        for (row_number, record) in reader.records().enumerate() {
            // Header is line 1.
            let line = row_number + 2;
            let record = record.map_err(|e| format!("Malformed CSV record at line {}: {}", line, e))?;
            let parse = |index: usize, name: &str| -> Result<f64, Box<dyn Error>> {
                let cell = record.get(index).unwrap_or("").trim();
                cell.parse::<f64>().map_err(|e| {
                    format!("Non-numeric value '{}' in column '{}' at line {}: {}", cell, name, line, e).into()
                })
            };
            for (&index, name) in feature_indices.iter().zip(feature_columns) {
                feature_values.push(parse(index, name.as_ref())?);
            }
            target_values.push(parse(target_index, target_column)?);
        }

        let n_samples = target_values.len();
        let features = Array2::from_shape_vec((n_samples, n_features), feature_values)?;
        Self::new(
            features,
            Array1::from(target_values),
            feature_columns.iter().map(|c| c.as_ref().to_string()).collect(),
            target_column.to_string(),
        )
    }

    /// Splits rows positionally: the first `floor(train_fraction * n)` rows train,
    /// the rest test. No shuffling.
    pub fn split_positional(&self, train_fraction: f64) -> Result<TrainTestSplit, Box<dyn Error>> {
        if !(train_fraction > 0.0 && train_fraction < 1.0) {
            return Err(format!("Train fraction must lie strictly between 0 and 1, got {}.", train_fraction).into());
        }
        let n = self.n_samples();
        let split_index = (n as f64 * train_fraction).floor() as usize;
        if split_index == 0 || split_index == n {
            return Err(format!(
                "Split of {} samples at fraction {} leaves an empty partition.",
                n, train_fraction
            )
            .into());
        }
        let part = |rows: ndarray::Slice| Dataset {
            features: self.features.slice(s![rows, ..]).to_owned(),
            targets: self.targets.slice(s![rows]).to_owned(),
            feature_names: self.feature_names.clone(),
            target_name: self.target_name.clone(),
        };
        Ok(TrainTestSplit {
            train: part(ndarray::Slice::from(..split_index)),
            test: part(ndarray::Slice::from(split_index..)),
        })
    }
}

#[derive(Clone, Debug)]
pub struct TrainTestSplit {
    pub train: Dataset,
    pub test: Dataset,
}
