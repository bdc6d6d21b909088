//! Goodness-of-fit metrics and parameter standard errors.
//!
//! - SSE / RMSE / R²
//! - BIC = n · ln(SSE/n) + k · ln(n)
//! - standard errors from `s² · (JᵀJ)⁻¹` with `s² = SSE / (n - k)`
//!
//! Parameters whose Jacobian column is identically zero (e.g. `w` for an
//! order-0 series) are not identifiable; their standard error is NaN and they
//! are left out of the covariance solve so the others stay defined.

use nalgebra::DMatrix;

use crate::domain::FitQuality;
use crate::fit::objective::LeastSquares;
use crate::math::inverse_normal_matrix;

const ZERO_COLUMN_EPS: f64 = 1e-12;

pub fn fit_quality(problem: &LeastSquares<'_>, theta: &[f64]) -> FitQuality {
    let n = problem.n();
    let k = problem.model().param_len();
    let sse = problem.sse(theta);

    let y = problem.y();
    let mean = y.iter().sum::<f64>() / n.max(1) as f64;
    let ss_tot: f64 = y.iter().map(|v| (v - mean) * (v - mean)).sum();
    // R² is undefined for constant data.
    let r_squared = if ss_tot > 0.0 { 1.0 - sse / ss_tot } else { f64::NAN };

    let nf = n.max(1) as f64;
    let bic = nf * (sse / nf).max(f64::MIN_POSITIVE).ln() + k as f64 * nf.ln();

    FitQuality {
        objective: 0.5 * sse,
        sse,
        rmse: (sse / nf).sqrt(),
        r_squared,
        bic,
        n,
    }
}

pub fn standard_errors(problem: &LeastSquares<'_>, theta: &[f64]) -> Vec<f64> {
    let n = problem.n();
    let k = problem.model().param_len();
    let mut out = vec![f64::NAN; k];
    if n <= k {
        return out;
    }

    let jac = problem.jacobian(theta);
    let active: Vec<usize> = (0..k)
        .filter(|&j| jac.column(j).norm() > ZERO_COLUMN_EPS)
        .collect();
    if active.is_empty() {
        return out;
    }

    let mut reduced = DMatrix::<f64>::zeros(n, active.len());
    for (dst, &src) in active.iter().enumerate() {
        reduced.set_column(dst, &jac.column(src));
    }
    let Some(inv) = inverse_normal_matrix(&reduced) else {
        return out;
    };

    let s2 = problem.sse(theta) / (n - k) as f64;
    for (i, &j) in active.iter().enumerate() {
        let var = s2 * inv[(i, i)];
        out[j] = if var >= 0.0 { var.sqrt() } else { f64::NAN };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FourierSeries;

    #[test]
    fn perfect_fit_metrics() {
        let model = FourierSeries::cosine(1);
        let x: Vec<f64> = (0..20).map(|i| i as f64 * 0.3).collect();
        let theta = [1.0, 2.0, 0.9];
        let y = model.eval_many(&x, &theta);
        let problem = LeastSquares::new(&model, &x, &y);

        let q = fit_quality(&problem, &theta);
        assert!(q.sse < 1e-20);
        assert!((q.r_squared - 1.0).abs() < 1e-12);
        assert_eq!(q.n, 20);
        assert!(q.bic.is_finite());
    }

    #[test]
    fn constant_data_has_undefined_r_squared() {
        let model = FourierSeries::cosine(0);
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0; 4];
        let problem = LeastSquares::new(&model, &x, &y);
        let q = fit_quality(&problem, &[1.0, 1.0]);
        assert!(q.r_squared.is_nan());
        assert_eq!(q.objective, 0.0);
    }

    #[test]
    fn unidentifiable_frequency_gets_nan_error_only() {
        let model = FourierSeries::cosine(0);
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 2.0, 1.0, 2.0];
        let problem = LeastSquares::new(&model, &x, &y);

        let se = standard_errors(&problem, &[1.5, 1.0]);
        // s² = 1 / 2, (JᵀJ)⁻¹ = 1/4 -> se = sqrt(1/8)
        assert!((se[0] - (1.0f64 / 8.0).sqrt()).abs() < 1e-12);
        assert!(se[1].is_nan());
    }
}
