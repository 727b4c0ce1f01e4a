use crate::pca::{cumulative_sum, PCA};
use crate::stats::covariance;
use approx::assert_abs_diff_eq;
use ndarray::{array, Array1, Array2, Axis};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

const TOLERANCE: f64 = 1e-9;

// Independent features with very different spreads and offsets.
fn generate_structured_data(n_samples: usize, seed: u64) -> Array2<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    Array2::from_shape_fn((n_samples, 4), |(_, j)| {
        let scale = [10.0, 3.0, 1.0, 0.3][j];
        scale * normal.sample(&mut rng) + j as f64
    })
}

fn assert_columns_equal_up_to_sign(m1: &Array2<f64>, m2: &Array2<f64>, tol: f64, context: &str) {
    assert_eq!(m1.shape(), m2.shape(), "Shape mismatch for {}", context);
    for j in 0..m1.ncols() {
        let same = (&m1.column(j) - &m2.column(j)).mapv(f64::abs).sum();
        let flipped = (&m1.column(j) + &m2.column(j)).mapv(f64::abs).sum();
        assert!(
            same < tol || flipped < tol,
            "Column {} mismatch for {}: {:?} vs {:?}",
            j,
            context,
            m1.column(j),
            m2.column(j)
        );
    }
}

#[test]
fn test_perfectly_correlated_features_have_single_component() {
    let data = array![[1., 2., 3.], [4., 5., 6.], [7., 8., 9.], [10., 11., 12.]];
    let mut pca = PCA::new();
    pca.fit(data, None).unwrap();

    let ev = pca.explained_variance().unwrap();
    // Standardized columns have variance n / (n - 1) = 4/3 each, all in one direction.
    assert_abs_diff_eq!(ev[0], 4.0, epsilon = 1e-9);
    assert_abs_diff_eq!(ev[1], 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(ev[2], 0.0, epsilon = 1e-9);
    let ratio = pca.explained_variance_ratio().unwrap();
    assert_abs_diff_eq!(ratio[0], 1.0, epsilon = 1e-9);
}

#[test]
fn test_ratios_sum_to_one_and_cumulative_is_monotone() {
    let data = generate_structured_data(200, 7);
    let mut pca = PCA::new();
    pca.fit(data, None).unwrap();

    let ratio = pca.explained_variance_ratio().unwrap();
    assert_abs_diff_eq!(ratio.sum(), 1.0, epsilon = TOLERANCE);
    let cumulative = pca.cumulative_explained_variance_ratio().unwrap();
    assert_eq!(cumulative.len(), 4);
    for w in cumulative.windows(2) {
        assert!(w[1] >= w[0], "cumulative ratio decreased: {:?}", cumulative);
    }
    assert_abs_diff_eq!(cumulative[3], 1.0, epsilon = TOLERANCE);

    let ev = pca.explained_variance().unwrap();
    for w in ev.windows(2) {
        assert!(w[0] >= w[1], "explained variance not descending: {:?}", ev);
    }
}

#[test]
fn test_explained_variance_is_variance_of_scores() {
    let data = generate_structured_data(150, 11);
    let mut pca = PCA::new();
    let scores = pca.fit_transform(data, None).unwrap();
    let score_cov = covariance(scores.view()).unwrap();
    let ev = pca.explained_variance().unwrap();
    assert_abs_diff_eq!(score_cov.diag().to_owned(), ev.clone(), epsilon = 1e-8);
    // scores are uncorrelated
    for i in 0..4 {
        for j in 0..4 {
            if i != j {
                assert_abs_diff_eq!(score_cov[[i, j]], 0.0, epsilon = 1e-8);
            }
        }
    }
}

#[test]
fn test_rotation_is_orthonormal() {
    let data = generate_structured_data(100, 3);
    let mut pca = PCA::new();
    pca.fit(data, None).unwrap();
    let rotation = pca.rotation().unwrap();
    let gram = rotation.t().dot(rotation);
    assert_abs_diff_eq!(gram, Array2::<f64>::eye(4), epsilon = 1e-10);
}

#[test]
fn test_loadings_scale_components_by_root_variance() {
    let data = generate_structured_data(120, 5);
    let n = data.nrows() as f64;
    let mut pca = PCA::new();
    pca.fit(data, None).unwrap();
    let loadings = pca.loadings().unwrap();
    let rotation = pca.rotation().unwrap();
    let ev = pca.explained_variance().unwrap();
    for i in 0..4 {
        let expected = rotation.column(i).mapv(|v| v * ev[i].sqrt());
        assert_abs_diff_eq!(loadings.column(i).to_owned(), expected, epsilon = 1e-12);
    }
    // With a full basis, squared loadings of a feature add up to its
    // standardized variance n / (n - 1).
    let row_sums = loadings.mapv(|v| v * v).sum_axis(Axis(1));
    assert_abs_diff_eq!(row_sums, Array1::from_elem(4, n / (n - 1.0)), epsilon = 1e-9);
}

#[test]
fn test_truncated_fit_keeps_leading_components() {
    let data = generate_structured_data(80, 19);
    let mut full = PCA::new();
    full.fit(data.clone(), None).unwrap();
    let mut truncated = PCA::new();
    truncated.fit(data.clone(), Some(2)).unwrap();

    assert_eq!(truncated.rotation().unwrap().ncols(), 2);
    let full_leading = full.rotation().unwrap().slice(ndarray::s![.., ..2]).to_owned();
    assert_columns_equal_up_to_sign(truncated.rotation().unwrap(), &full_leading, 1e-9, "leading components");
    assert_eq!(truncated.transform(data).unwrap().ncols(), 2);
}

#[test]
fn test_transform_applies_training_statistics() {
    let train = generate_structured_data(60, 23);
    let mut pca = PCA::new();
    pca.fit(train.clone(), None).unwrap();
    let mean_row = pca.mean().unwrap().clone().insert_axis(Axis(0));
    let projected = pca.transform(mean_row).unwrap();
    assert_abs_diff_eq!(projected, Array2::<f64>::zeros((1, 4)), epsilon = 1e-10);

    let empty = Array2::<f64>::zeros((0, 4));
    assert_eq!(pca.transform(empty).unwrap().dim(), (0, 4));
}

#[test]
fn test_constant_column_gets_unit_scale() {
    let data = array![[1.0, 5.0], [2.0, 5.0], [3.0, 5.0], [4.0, 5.0]];
    let mut pca = PCA::new();
    pca.fit(data, None).unwrap();
    assert_eq!(pca.scale().unwrap()[1], 1.0);
    let ev = pca.explained_variance().unwrap();
    assert!(ev.iter().all(|v| v.is_finite()));
    assert_abs_diff_eq!(pca.explained_variance_ratio().unwrap()[0], 1.0, epsilon = 1e-12);
}

#[test]
fn test_cumulative_sum() {
    let c = cumulative_sum(array![0.5, 0.25, 0.125, 0.125].view());
    assert_abs_diff_eq!(c, array![0.5, 0.75, 0.875, 1.0], epsilon = 1e-15);
}

#[test]
fn test_pca_fit_insufficient_samples() {
    let mut pca = PCA::new();
    assert!(pca.fit(array![[1.0, 2.0]], None).is_err());
    assert!(pca.fit(Array2::zeros((0, 3)), None).is_err());
}

#[test]
fn test_pca_fit_invalid_component_count() {
    let data = generate_structured_data(10, 1);
    let mut pca = PCA::new();
    assert!(pca.fit(data.clone(), Some(0)).is_err());
    assert!(pca.fit(data, Some(5)).is_err());
}

#[test]
fn test_pca_transform_not_fitted() {
    let pca = PCA::new();
    assert!(pca.transform(array![[1.0, 2.0]]).is_err());
    assert!(pca.explained_variance_ratio().is_none());
    assert!(pca.loadings().is_none());
}

#[test]
fn test_pca_transform_dimension_mismatch() {
    let mut pca = PCA::new();
    pca.fit(generate_structured_data(20, 2), None).unwrap();
    assert!(pca.transform(array![[1.0, 2.0, 3.0]]).is_err());
}

#[test]
fn test_fitted_pca_serializes_for_reports() {
    let mut pca = PCA::new();
    pca.fit(generate_structured_data(30, 4), Some(2)).unwrap();
    let json: serde_json::Value = serde_json::to_value(&pca).unwrap();
    for field in ["rotation", "mean", "scale", "explained_variance"] {
        assert!(json[field].is_object(), "missing {} in {}", field, json);
    }
    assert!(serde_json::to_value(PCA::new()).unwrap()["rotation"].is_null());
}
