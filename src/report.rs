// src/report.rs

use crate::pipeline::{AnalysisReport, ModelEvaluation};
use log::info;
use ndarray::ArrayView1;
use plotters::prelude::*;
use std::error::Error;
use std::fmt;
use std::path::Path;

impl AnalysisReport {
    /// Serializes the full report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, Box<dyn Error>> {
        serde_json::to_string_pretty(self).map_err(|e| format!("Failed to serialize report: {}", e).into())
    }

    /// Draws component count against cumulative explained variance ratio as an SVG line chart.
    pub fn render_cumulative_variance_chart<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn Error>> {
        render_cumulative_variance_chart(self.pca.cumulative_explained_variance_ratio.view(), path.as_ref())
    }
}

/// Y axis is fixed to [0, 1.1]; x ticks are the integer component counts.
pub fn render_cumulative_variance_chart(cumulative: ArrayView1<f64>, path: &Path) -> Result<(), Box<dyn Error>> {
    let n_components = cumulative.len();
    if n_components == 0 {
        return Err("No components to plot.".into());
    }
    let root = SVGBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Cumulative explained variance", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.5f64..(n_components as f64 + 0.5), 0.0f64..1.1f64)?;
    chart
        .configure_mesh()
        .x_desc("Number of Components")
        .y_desc("Explained Variance Ratio")
        .x_labels(n_components)
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_labels(12)
        .y_label_formatter(&|y| format!("{:.1}", y))
        .draw()?;

    let points: Vec<(f64, f64)> = cumulative
        .iter()
        .enumerate()
        .map(|(i, &ratio)| ((i + 1) as f64, ratio.clamp(0.0, 1.1)))
        .collect();
    chart.draw_series(LineSeries::new(points.clone(), &BLUE))?;
    chart.draw_series(points.iter().map(|&point| Circle::new(point, 4, BLUE.filled())))?;
    root.present()?;
    info!("Wrote cumulative variance chart to {:?}", path);
    Ok(())
}

fn write_evaluation(f: &mut fmt::Formatter<'_>, evaluation: &ModelEvaluation) -> fmt::Result {
    writeln!(
        f,
        "Mean Squared Error (Training): {}, R2 (Training): {}",
        evaluation.train.mse, evaluation.train.r2
    )?;
    writeln!(
        f,
        "Mean Squared Error (Testing) : {}, R2 (Testing) : {}",
        evaluation.test.mse, evaluation.test.r2
    )
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Features: {:?}, Target: {}, Samples: {}", self.feature_names, self.target_name, self.n_samples)?;
        writeln!(f, "\nCovariance Matrix: \n{:.6}\n", self.covariance)?;
        writeln!(
            f,
            "Eigenvalues ({:?} order): {:.6} \nEigenvectors: \n{:.6}\n",
            self.eigen.order, self.eigen.eigenvalues, self.eigen.eigenvectors
        )?;
        writeln!(f, "Projection Matrix: \n{:.6}", self.projection)?;

        writeln!(f, "\nComponent Matrix and Explained Variance:")?;
        for (index, percent) in self.percent_variance.iter().enumerate() {
            writeln!(
                f,
                "%var of PC {} is {:.3}: {:.6}",
                index + 1,
                percent,
                self.eigen.eigenvectors.column(index)
            )?;
        }
        for (position, component) in self.kaiser.iter().enumerate() {
            writeln!(
                f,
                "Projection onto PC {}: {:.6}",
                component.index + 1,
                self.kaiser_projection.column(position)
            )?;
        }

        writeln!(f, "\nExplained Variance: {:.6}", self.pca.explained_variance_ratio)?;
        writeln!(f, "Cumulative Sum of Eigenvalues: {:.6}", self.pca.cumulative_explained_variance_ratio)?;
        let kaiser_values: Vec<f64> = self.kaiser.iter().map(|c| c.eigenvalue).collect();
        writeln!(f, "Kaiser Criteria: {:?}", kaiser_values)?;
        writeln!(f, "\nCorrelation Matrix: \n{:.6}", self.pca.loadings)?;

        writeln!(
            f,
            "\nSplit: {} training rows, {} testing rows",
            self.split.train_size, self.split.test_size
        )?;
        if let Some(check) = &self.spot_check {
            writeln!(
                f,
                "Predict with training row {}: {}, Real value: {}",
                check.row, check.predicted, check.actual
            )?;
        }

        writeln!(f, "\nPredictions for PC {}:", self.selected_component + 1)?;
        write_evaluation(f, &self.component_evaluation)?;
        writeln!(f, "\nPredictions using Original Data:")?;
        write_evaluation(f, &self.full_evaluation)
    }
}
