// src/pipeline.rs

use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::eigen::{CovarianceEigen, KaiserComponent};
use crate::linalg_backends::NdarrayLinAlgBackend;
use crate::metrics::RegressionScores;
use crate::pca::PCA;
use crate::regression::{FittedLinearRegression, LinearRegression};
use crate::stats::{covariance, standardize};
use log::{info, warn};
use ndarray::{Array1, Array2, Axis};
use serde::Serialize;
use std::error::Error;
use std::time::Instant;

/// Explained-variance diagnostics of the full-rank PCA on standardized features.
#[derive(Clone, Debug, Serialize)]
pub struct PcaDiagnostics {
    /// Eigenvalues of the standardized covariance, largest first.
    pub explained_variance: Array1<f64>,
    pub explained_variance_ratio: Array1<f64>,
    pub cumulative_explained_variance_ratio: Array1<f64>,
    /// Shape: (n_features, n_components)
    pub loadings: Array2<f64>,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct SplitSummary {
    pub train_size: usize,
    pub test_size: usize,
}

/// Scores of one model on both partitions.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ModelEvaluation {
    pub train: RegressionScores,
    pub test: RegressionScores,
}

/// Single-component model prediction for one training row.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct SpotCheck {
    pub row: usize,
    pub score: f64,
    pub predicted: f64,
    pub actual: f64,
}

/// Everything one analysis run produces, in presentation order.
#[derive(Clone, Debug, Serialize)]
pub struct AnalysisReport {
    pub feature_names: Vec<String>,
    pub target_name: String,
    pub n_samples: usize,
    /// Sample covariance (ddof = 1) of the raw features.
    pub covariance: Array2<f64>,
    pub eigen: CovarianceEigen,
    /// Eigenvalue share of the total, in percent, in eigenpair order.
    pub percent_variance: Array1<f64>,
    /// Standardized features projected onto the covariance eigenvectors.
    pub projection: Array2<f64>,
    pub kaiser: Vec<KaiserComponent>,
    /// Projection columns of the Kaiser-retained components, in the same order as `kaiser`.
    pub kaiser_projection: Array2<f64>,
    pub pca: PcaDiagnostics,
    pub split: SplitSummary,
    /// Eigenvector column used for the single-component scores.
    pub selected_component: usize,
    pub component_model: FittedLinearRegression,
    pub component_evaluation: ModelEvaluation,
    pub full_model: FittedLinearRegression,
    pub full_evaluation: ModelEvaluation,
    pub spot_check: Option<SpotCheck>,
}

/// Loads the configured CSV and runs the analysis on it.
pub fn analyze_file(config: &AnalysisConfig) -> Result<AnalysisReport, Box<dyn Error>> {
    config.validate()?;
    let dataset = Dataset::from_csv_path(&config.data_path, &config.feature_columns, &config.target_column)?;
    run_analysis(&dataset, config)
}

/// Runs the whole analysis on an in-memory dataset. Performs no I/O.
///
/// `config.data_path`, `config.feature_columns` and `config.target_column`
/// are not consulted; the dataset already carries its columns.
pub fn run_analysis(dataset: &Dataset, config: &AnalysisConfig) -> Result<AnalysisReport, Box<dyn Error>> {
    let backend = NdarrayLinAlgBackend;
    let n_samples = dataset.n_samples();
    let n_features = dataset.n_features();
    if n_samples < 2 {
        return Err(format!("Analysis needs at least 2 samples, got {}.", n_samples).into());
    }
    if config.selected_component >= n_features {
        return Err(format!(
            "Selected component {} is out of range for {} features.",
            config.selected_component, n_features
        )
        .into());
    }
    info!(
        "Starting analysis. Samples={}, Features={:?}, Target={}, Train fraction={}",
        n_samples, dataset.feature_names, dataset.target_name, config.train_fraction
    );
    let overall_start_time = Instant::now();

    let (standardized, _) = standardize(dataset.features.view())?;
    let covariance_matrix = covariance(dataset.features.view())?;

    let eigen_start_time = Instant::now();
    let eigen = CovarianceEigen::decompose(&covariance_matrix, config.eigen_order, &backend)?;
    info!("Eigendecomposed covariance matrix in {:?}", eigen_start_time.elapsed());
    eigen.warn_if_not_leading(config.selected_component);

    let projection = eigen.project(standardized.view())?;
    let kaiser = eigen.kaiser_criterion();
    let kaiser_indices: Vec<usize> = kaiser.iter().map(|c| c.index).collect();
    let kaiser_projection = projection.select(Axis(1), &kaiser_indices);

    let mut pca = PCA::new();
    pca.fit_with_backend(dataset.features.clone(), None, &backend)?;
    let pca_diagnostics = PcaDiagnostics {
        explained_variance: pca
            .explained_variance()
            .cloned()
            .ok_or("PCA produced no explained variance.")?,
        explained_variance_ratio: pca
            .explained_variance_ratio()
            .ok_or("PCA produced no explained variance ratio.")?,
        cumulative_explained_variance_ratio: pca
            .cumulative_explained_variance_ratio()
            .ok_or("PCA produced no cumulative explained variance ratio.")?,
        loadings: pca.loadings().ok_or("PCA produced no loadings.")?,
    };

    let split = dataset.split_positional(config.train_fraction)?;
    info!(
        "Split {} samples into {} training and {} testing rows",
        n_samples,
        split.train.n_samples(),
        split.test.n_samples()
    );

    let train_scores = eigen.component_scores(split.train.features.view(), config.selected_component)?;
    let test_scores = eigen.component_scores(split.test.features.view(), config.selected_component)?;
    let component_model = LinearRegression::new().fit_with_backend(
        train_scores.view().insert_axis(Axis(1)),
        split.train.targets.view(),
        &backend,
    )?;
    let component_evaluation = ModelEvaluation {
        train: RegressionScores::compute(
            component_model.predict_single(train_scores.view())?.view(),
            split.train.targets.view(),
        )?,
        test: RegressionScores::compute(
            component_model.predict_single(test_scores.view())?.view(),
            split.test.targets.view(),
        )?,
    };

    let full_model =
        LinearRegression::new().fit_with_backend(split.train.features.view(), split.train.targets.view(), &backend)?;
    let full_evaluation = ModelEvaluation {
        train: RegressionScores::compute(
            full_model.predict(split.train.features.view())?.view(),
            split.train.targets.view(),
        )?,
        test: RegressionScores::compute(
            full_model.predict(split.test.features.view())?.view(),
            split.test.targets.view(),
        )?,
    };
    info!(
        "Component model R2 train={:.6} test={:.6}; full model R2 train={:.6} test={:.6}",
        component_evaluation.train.r2, component_evaluation.test.r2, full_evaluation.train.r2, full_evaluation.test.r2
    );

    let spot_check = match config.spot_check_row {
        Some(row) if row < train_scores.len() => {
            let score = train_scores[row];
            Some(SpotCheck {
                row,
                score,
                predicted: score * component_model.params()[0] + component_model.intercept(),
                actual: split.train.targets[row],
            })
        }
        Some(row) => {
            warn!(
                "Spot check row {} is outside the {} training rows; skipping it.",
                row,
                train_scores.len()
            );
            None
        }
        None => None,
    };

    info!("Analysis finished in {:?}", overall_start_time.elapsed());
    Ok(AnalysisReport {
        feature_names: dataset.feature_names.clone(),
        target_name: dataset.target_name.clone(),
        n_samples,
        percent_variance: eigen.percent_variance(),
        covariance: covariance_matrix,
        eigen,
        projection,
        kaiser,
        kaiser_projection,
        pca: pca_diagnostics,
        split: SplitSummary {
            train_size: split.train.n_samples(),
            test_size: split.test.n_samples(),
        },
        selected_component: config.selected_component,
        component_model,
        component_evaluation,
        full_model,
        full_evaluation,
        spot_check,
    })
}
