//! Linear least squares helpers.
//!
//! For a fixed frequency `w` the Fourier series is linear in its coefficients,
//! so the grid strategy repeatedly solves
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! where `x_i` is the harmonic design row at sample `i`.
//!
//! Implementation choices:
//! - SVD solve, which handles tall design matrices and near-collinear harmonics
//!   (nalgebra's `QR::solve` is intended for square systems).
//! - The same normal-matrix machinery yields the parameter covariance.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Inverse of the normal matrix `JᵀJ` for a Jacobian `J` (rows = samples).
///
/// Returns `None` when `JᵀJ` is singular or the inverse is not finite.
pub fn inverse_normal_matrix(jacobian: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let jtj = jacobian.transpose() * jacobian;
    let inv = jtj.try_inverse()?;
    if inv.iter().all(|v| v.is_finite()) {
        Some(inv)
    } else {
        None
    }
}
