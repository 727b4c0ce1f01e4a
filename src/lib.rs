// Principal component analysis and least-squares regression on process data

#![doc = include_str!("../README.md")]

pub mod config;
pub mod dataset;
pub mod eigen;
pub mod linalg_backends;
pub mod metrics;
pub mod pca;
pub mod pipeline;
pub mod regression;
pub mod report;
pub mod stats;

pub use config::{AnalysisConfig, EigenOrder};
pub use dataset::{Dataset, TrainTestSplit};
pub use eigen::{CovarianceEigen, KaiserComponent};
pub use metrics::RegressionScores;
pub use pca::PCA;
pub use pipeline::{analyze_file, run_analysis, AnalysisReport};
pub use regression::{FittedLinearRegression, LinearRegression};

#[cfg(test)]
mod pca_tests;
