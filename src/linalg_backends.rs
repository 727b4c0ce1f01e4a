// src/linalg_backends.rs

use ndarray::{Array1, Array2};
use ndarray_linalg::{Eigh as NdLinalgEigh, LeastSquaresSvd as NdLinalgLeastSquaresSvd, UPLO};
use std::error::Error;

/// Output of a symmetric eigendecomposition.
#[derive(Debug)]
pub struct EighOutput {
    /// Eigenvalues in the order the solver produced them (ascending for LAPACK `syevd`).
    pub eigenvalues: Array1<f64>,
    /// Eigenvectors as columns of the matrix.
    /// eigenvectors.column(i) corresponds to eigenvalues[i].
    pub eigenvectors: Array2<f64>,
}

/// Output of a least-squares solve `min ||A x - b||_2`.
#[derive(Debug)]
pub struct LeastSquaresOutput {
    pub solution: Array1<f64>,
    /// Effective rank of `A` as determined by the solver.
    pub rank: usize,
}

/// Trait for symmetric eigendecomposition (similar to LAPACK's DSYEVD).
/// Implementers expect `matrix` to be symmetric; only the upper triangle is read.
pub trait BackendEigh {
    fn eigh_upper(&self, matrix: &Array2<f64>) -> Result<EighOutput, Box<dyn Error + Send + Sync>>;
}

/// Trait for SVD-based linear least squares (similar to LAPACK's DGELSD).
pub trait BackendLeastSquares {
    fn least_squares(
        &self,
        design: &Array2<f64>,
        rhs: &Array1<f64>,
    ) -> Result<LeastSquaresOutput, Box<dyn Error + Send + Sync>>;
}

// Concrete backend on top of ndarray-linalg (LAPACK selected by cargo feature).
#[derive(Debug, Default, Copy, Clone)]
pub struct NdarrayLinAlgBackend;

fn to_dyn_error<E: Error + Send + Sync + 'static>(e: E) -> Box<dyn Error + Send + Sync> {
    Box::new(e)
}

impl BackendEigh for NdarrayLinAlgBackend {
    fn eigh_upper(&self, matrix: &Array2<f64>) -> Result<EighOutput, Box<dyn Error + Send + Sync>> {
        if matrix.nrows() != matrix.ncols() {
            return Err(format!(
                "Matrix must be square for eigendecomposition, got {}x{}.",
                matrix.nrows(),
                matrix.ncols()
            )
            .into());
        }
        if matrix.is_empty() {
            return Ok(EighOutput {
                eigenvalues: Array1::zeros(0),
                eigenvectors: Array2::zeros((0, 0)),
            });
        }
        let (eigenvalues, eigenvectors) = matrix.eigh(UPLO::Upper).map_err(to_dyn_error)?;
        Ok(EighOutput { eigenvalues, eigenvectors })
    }
}

impl BackendLeastSquares for NdarrayLinAlgBackend {
    fn least_squares(
        &self,
        design: &Array2<f64>,
        rhs: &Array1<f64>,
    ) -> Result<LeastSquaresOutput, Box<dyn Error + Send + Sync>> {
        if design.nrows() != rhs.len() {
            return Err(format!(
                "Design matrix has {} rows but right-hand side has {} entries.",
                design.nrows(),
                rhs.len()
            )
            .into());
        }
        let result = design.least_squares(rhs).map_err(to_dyn_error)?;
        Ok(LeastSquaresOutput {
            solution: result.solution,
            rank: result.rank.max(0) as usize,
        })
    }
}
