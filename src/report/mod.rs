//! Reporting utilities: residuals and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{Residual, Samples};
use crate::error::AppError;
use crate::models::FourierSeries;

/// Compute the fitted value and residual `y - f(x)` at each sample.
pub fn compute_residuals(samples: &Samples, model: &FourierSeries, theta: &[f64]) -> Result<Vec<Residual>, AppError> {
    let mut out = Vec::with_capacity(samples.len());
    for (&x, &y) in samples.x.iter().zip(&samples.y) {
        let y_fit = model.eval(x, theta);
        if !y_fit.is_finite() {
            return Err(AppError::fit("Non-finite model prediction during residual computation."));
        }
        out.push(Residual {
            x,
            y,
            y_fit,
            residual: y - y_fit,
        });
    }
    Ok(out)
}
