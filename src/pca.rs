// Principal component analysis (PCA) on standardized features

use crate::linalg_backends::{BackendEigh, NdarrayLinAlgBackend};
use crate::stats::standardize;
use log::debug;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::Serialize;
use std::error::Error;

/// Principal component analysis (PCA) structure.
///
/// Each feature is centered and scaled to unit population variance before the
/// covariance matrix (normalized by n - 1) is eigendecomposed, so the results
/// are those of a PCA on standardized data. Components are ordered from largest
/// to smallest explained variance and have unit length; their signs are
/// solver-dependent.
#[derive(Serialize, Debug, Clone)]
pub struct PCA {
    /// The rotation matrix (principal components).
    /// Shape: (n_features, k_components)
    rotation: Option<Array2<f64>>,
    /// Mean vector of the original training data.
    /// Shape: (n_features)
    mean: Option<Array1<f64>>,
    /// Sanitized population standard deviations of the training data.
    /// Constant columns get `1.0`.
    /// Shape: (n_features)
    scale: Option<Array1<f64>>,
    /// Explained variance for each principal component (eigenvalues of the
    /// covariance matrix of the scaled data).
    /// Shape: (k_components)
    explained_variance: Option<Array1<f64>>,
}

impl Default for PCA {
    fn default() -> Self {
        Self::new()
    }
}

impl PCA {
    /// Creates a new, empty PCA struct.
    ///
    /// # Examples
    ///
    /// ```
    /// use chempca::PCA;
    /// let pca = PCA::new();
    /// assert!(pca.rotation().is_none());
    /// ```
    pub fn new() -> Self {
        Self {
            rotation: None,
            mean: None,
            scale: None,
            explained_variance: None,
        }
    }

    pub fn mean(&self) -> Option<&Array1<f64>> {
        self.mean.as_ref()
    }

    pub fn scale(&self) -> Option<&Array1<f64>> {
        self.scale.as_ref()
    }

    /// Returns a reference to the rotation matrix (principal components), if computed.
    ///
    /// The rotation matrix has dimensions (n_features, k_components).
    pub fn rotation(&self) -> Option<&Array2<f64>> {
        self.rotation.as_ref()
    }

    /// Returns a reference to the explained variance for each principal component,
    /// ordered from largest to smallest.
    pub fn explained_variance(&self) -> Option<&Array1<f64>> {
        self.explained_variance.as_ref()
    }

    /// Fraction of the total variance carried by each component. Sums to 1.
    pub fn explained_variance_ratio(&self) -> Option<Array1<f64>> {
        let variances = self.explained_variance.as_ref()?;
        let total = variances.sum();
        if total.abs() <= f64::EPSILON {
            return Some(Array1::zeros(variances.len()));
        }
        Some(variances.mapv(|v| v / total))
    }

    /// Running sum of `explained_variance_ratio` in component order.
    pub fn cumulative_explained_variance_ratio(&self) -> Option<Array1<f64>> {
        self.explained_variance_ratio().map(|ratios| cumulative_sum(ratios.view()))
    }

    /// Loadings: each component scaled by the square root of its explained variance.
    ///
    /// Shape (n_features, k_components); entry (j, i) is the loading of feature j on component i.
    pub fn loadings(&self) -> Option<Array2<f64>> {
        let rotation = self.rotation.as_ref()?;
        let variances = self.explained_variance.as_ref()?;
        Some(rotation * &variances.mapv(|v| v.max(0.0).sqrt()))
    }

    /// Fits the PCA model with the default linear-algebra backend.
    ///
    /// * `data_matrix` - Input data as a 2D array, shape (n_samples, n_features).
    /// * `n_components` - Number of components to keep; `None` keeps all of them.
    pub fn fit(&mut self, data_matrix: Array2<f64>, n_components: Option<usize>) -> Result<(), Box<dyn Error>> {
        self.fit_with_backend(data_matrix, n_components, &NdarrayLinAlgBackend)
    }

    /// Fits the PCA model using an eigendecomposition of the feature covariance matrix.
    ///
    /// # Errors
    /// Returns an error if the input matrix has zero dimensions, fewer than 2 samples,
    /// `n_components` is zero or larger than the number of features, or if the
    /// eigendecomposition fails.
    pub fn fit_with_backend<B: BackendEigh>(
        &mut self,
        data_matrix: Array2<f64>,
        n_components: Option<usize>,
        backend: &B,
    ) -> Result<(), Box<dyn Error>> {
        let n_samples = data_matrix.nrows();
        let n_features = data_matrix.ncols();

        if n_samples == 0 || n_features == 0 {
            return Err("Input data_matrix has zero samples or zero features.".into());
        }
        if n_samples < 2 {
            return Err("Input matrix must have at least 2 samples.".into());
        }
        let k = n_components.unwrap_or(n_features);
        if k == 0 || k > n_features {
            return Err(format!(
                "Requested {} components, but must be between 1 and the number of features ({}).",
                k, n_features
            )
            .into());
        }

        let (scaled_data_matrix, scaling) = standardize(data_matrix.view())?;
        self.mean = Some(scaling.mean);
        self.scale = Some(scaling.scale);

        let mut cov_matrix = scaled_data_matrix.t().dot(&scaled_data_matrix);
        cov_matrix /= (n_samples - 1) as f64;

        let decomposition = backend
            .eigh_upper(&cov_matrix)
            .map_err(|e| format!("Eigen decomposition of covariance matrix failed: {}", e))?;

        let mut eig_pairs: Vec<(f64, Array1<f64>)> = decomposition
            .eigenvalues
            .into_iter()
            .zip(decomposition.eigenvectors.columns().into_iter().map(|col| col.to_owned()))
            .collect();
        eig_pairs.sort_by(|(a, _), (b, _)| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

        let mut top_eigvecs: Vec<Array1<f64>> = Vec::with_capacity(k);
        let mut sorted_eigenvalues: Vec<f64> = Vec::with_capacity(k);
        for (eig_val, mut eig_vec) in eig_pairs.into_iter().take(k) {
            sorted_eigenvalues.push(eig_val.max(0.0));
            let norm = eig_vec.dot(&eig_vec).sqrt();
            if norm > 1e-9 {
                eig_vec.mapv_inplace(|x| x / norm);
            } else {
                eig_vec.fill(0.0);
            }
            top_eigvecs.push(eig_vec);
        }
        let views: Vec<ArrayView1<f64>> = top_eigvecs.iter().map(|v| v.view()).collect();
        let rotation_matrix = ndarray::stack(Axis(1), &views)?;
        debug!("PCA explained variance: {:?}", sorted_eigenvalues);

        self.rotation = Some(rotation_matrix);
        self.explained_variance = Some(Array1::from(sorted_eigenvalues));
        Ok(())
    }

    /// Fits the model and returns the principal component scores of the input.
    pub fn fit_transform(&mut self, data_matrix: Array2<f64>, n_components: Option<usize>) -> Result<Array2<f64>, Box<dyn Error>> {
        self.fit(data_matrix.clone(), n_components)?;
        self.transform(data_matrix)
    }

    /// Applies the PCA transformation to the given data.
    ///
    /// The data is centered and scaled with the statistics learned during
    /// fitting, then projected onto the principal components.
    ///
    /// # Errors
    /// Returns an error if the model is not fitted, or if the input's feature
    /// dimension does not match the model's.
    pub fn transform(&self, mut x: Array2<f64>) -> Result<Array2<f64>, Box<dyn Error>> {
        let rotation_matrix = self
            .rotation
            .as_ref()
            .ok_or("PCA model: Rotation matrix not set. Fit a model first.")?;
        let mean_vector = self
            .mean
            .as_ref()
            .ok_or("PCA model: Mean vector not set. Fit a model first.")?;
        let scale_vector = self
            .scale
            .as_ref()
            .ok_or("PCA model: Scale vector not set. Fit a model first.")?;

        if x.ncols() != mean_vector.len() {
            return Err(format!(
                "Input data feature dimension ({}) does not match model's feature dimension ({}).",
                x.ncols(),
                mean_vector.len()
            )
            .into());
        }
        if x.nrows() == 0 {
            return Ok(Array2::zeros((0, rotation_matrix.ncols())));
        }

        for mut row in x.axis_iter_mut(Axis(0)) {
            ndarray::Zip::from(&mut row)
                .and(mean_vector)
                .and(scale_vector)
                .for_each(|val_ref, &m_val, &s_val| {
                    *val_ref = (*val_ref - m_val) / s_val;
                });
        }
        Ok(x.dot(rotation_matrix))
    }
}

/// Running sum in index order.
pub fn cumulative_sum(values: ArrayView1<f64>) -> Array1<f64> {
    let mut running = 0.0;
    values.mapv(|v| {
        running += v;
        running
    })
}
