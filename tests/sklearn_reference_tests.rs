
use approx::assert_abs_diff_eq;
use chempca::{run_analysis, AnalysisConfig, Dataset, EigenOrder};
use ndarray::{Array1, Array2};
use python_bootstrap::python_reference_available;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::io::Write;
use std::process::{Command, Stdio};

const REFERENCE_SCRIPT: &str = r#"
import json, sys
import numpy as np
from sklearn.decomposition import PCA
from sklearn.linear_model import LinearRegression
from sklearn.preprocessing import StandardScaler

data = np.loadtxt(sys.stdin, delimiter=",")
X, y = data[:, :-1], data[:, -1]
pca = PCA(n_components=X.shape[1]).fit(StandardScaler().fit_transform(X))
split = int(0.8 * len(X))
reg = LinearRegression().fit(X[:split], y[:split])
json.dump({
    "explained_variance": pca.explained_variance_.tolist(),
    "explained_variance_ratio": pca.explained_variance_ratio_.tolist(),
    "coef": reg.coef_.tolist(),
    "intercept": float(reg.intercept_),
    "r2_train": float(reg.score(X[:split], y[:split])),
    "r2_test": float(reg.score(X[split:], y[split:])),
}, sys.stdout)
"#;

fn generate_process_data(n_samples: usize, seed: u64) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let features = Array2::from_shape_fn((n_samples, 4), |(_, j)| {
        let (center, spread) = [(350.0, 15.0), (2.0, 0.4), (40.0, 6.0), (1.2, 0.3)][j];
        center + spread * normal.sample(&mut rng)
    });
    let targets: Array1<f64> = features
        .rows()
        .into_iter()
        .map(|r| 0.05 * r[0] - 1.5 * r[1] + 0.2 * r[2] + 3.0 * r[3] + normal.sample(&mut rng))
        .collect();
    let names = ["T", "P", "TC", "SV"].iter().map(|s| s.to_string()).collect();
    Dataset::new(features, targets, names, "Idx".to_string()).unwrap()
}

fn run_reference(dataset: &Dataset) -> serde_json::Value {
    let mut csv = String::new();
    for (row, target) in dataset.features.rows().into_iter().zip(dataset.targets.iter()) {
        let cells: Vec<String> = row.iter().map(|v| format!("{:.17e}", v)).collect();
        csv.push_str(&format!("{},{:.17e}\n", cells.join(","), target));
    }

    let mut child = Command::new("python3")
        .args(["-c", REFERENCE_SCRIPT])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn python3");
    child.stdin.take().unwrap().write_all(csv.as_bytes()).unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(
        output.status.success(),
        "reference script failed:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn json_array(value: &serde_json::Value) -> Array1<f64> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect()
}

#[test]
fn test_matches_sklearn_reference() {
    if !python_reference_available() {
        return;
    }
    let dataset = generate_process_data(250, 2024);
    let config = AnalysisConfig::default()
        .with_eigen_order(EigenOrder::Descending)
        .with_spot_check_row(None);
    let report = run_analysis(&dataset, &config).unwrap();
    let reference = run_reference(&dataset);

    assert_abs_diff_eq!(
        report.pca.explained_variance,
        json_array(&reference["explained_variance"]),
        epsilon = 1e-8
    );
    assert_abs_diff_eq!(
        report.pca.explained_variance_ratio,
        json_array(&reference["explained_variance_ratio"]),
        epsilon = 1e-10
    );
    assert_abs_diff_eq!(report.full_model.params().clone(), json_array(&reference["coef"]), epsilon = 1e-6);
    assert_abs_diff_eq!(
        report.full_model.intercept(),
        reference["intercept"].as_f64().unwrap(),
        epsilon = 1e-5
    );
    assert_abs_diff_eq!(
        report.full_evaluation.train.r2,
        reference["r2_train"].as_f64().unwrap(),
        epsilon = 1e-9
    );
    assert_abs_diff_eq!(
        report.full_evaluation.test.r2,
        reference["r2_test"].as_f64().unwrap(),
        epsilon = 1e-9
    );
}
