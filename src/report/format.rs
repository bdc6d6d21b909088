//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use crate::domain::{DatasetStats, FitQuality, StageReport};
use crate::fit::FitResult;
use crate::models::FourierSeries;

/// The symbolic model, printed before fitting.
pub fn format_model(model: &FourierSeries) -> String {
    format!(
        "=== ffit - Fourier series fit ===\nModel ({}, order {}):\n  {model}\n",
        model.kind().display_name(),
        model.order()
    )
}

/// Format the full fit summary: data stats, parameter table, quality, stages.
pub fn format_fit_summary(stats: &DatasetStats, fit: &FitResult) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Points: n={} | x=[{:.4}, {:.4}] | y=[{:.4}, {:.4}]\n",
        stats.n_points, stats.x_min, stats.x_max, stats.y_min, stats.y_max
    ));

    out.push_str("\nParameter Value        Standard Deviation\n");
    for ((name, value), se) in fit.params.iter().zip(&fit.std_errs) {
        out.push_str(format!("{name:<9} {value:<12.6e} {}\n", fmt_std_err(*se)).trim_end());
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&format_quality(&fit.quality));

    out.push_str("\nStages:\n");
    out.push_str(&format_stages(&fit.stages));

    out
}

fn format_quality(q: &FitQuality) -> String {
    let mut out = String::new();
    out.push_str("Fitting status:\n");
    out.push_str(&format!("Objective   {:.6e}\n", q.objective));
    out.push_str(&format!("Chi-squared {:.6e}\n", q.sse));
    out.push_str(&format!("RMSE        {:.6e}\n", q.rmse));
    out.push_str(&format!("R^2         {}\n", fmt_opt(q.r_squared)));
    out.push_str(&format!("BIC         {:.4}\n", q.bic));
    out
}

fn format_stages(stages: &[StageReport]) -> String {
    let mut out = String::new();
    for (i, s) in stages.iter().enumerate() {
        let kept = if s.cost_after <= s.cost_before { " " } else { "x" };
        out.push_str(&format!(
            "{kept} {}. {:<12} cost {:.6e} -> {:.6e} ({} iters) {}\n",
            i + 1,
            s.strategy.display_name(),
            s.cost_before,
            s.cost_after,
            s.iterations,
            s.message
        ));
    }
    out
}

fn fmt_std_err(v: f64) -> String {
    if v.is_finite() { format!("{v:.6e}") } else { "nan".to_string() }
}

fn fmt_opt(v: f64) -> String {
    if v.is_finite() { format!("{v:.6}") } else { "undefined".to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Strategy;

    fn sample_fit() -> FitResult {
        let model = FourierSeries::cosine(1);
        FitResult {
            model,
            params: model.param_set(&[1.0, -0.5, 2.0]),
            std_errs: vec![0.01, 0.02, f64::NAN],
            quality: FitQuality {
                objective: 0.5,
                sse: 1.0,
                rmse: 0.25,
                r_squared: 0.9,
                bic: -3.5,
                n: 16,
            },
            stages: vec![StageReport {
                strategy: Strategy::Bfgs,
                cost_before: 4.0,
                cost_after: 0.5,
                iterations: 12,
                message: "Solver converged".to_string(),
            }],
        }
    }

    #[test]
    fn model_header_shows_expression() {
        let text = format_model(&FourierSeries::cosine(1));
        assert!(text.contains("order 1"));
        assert!(text.contains("y = a0 + a1*cos(w*x)"));
    }

    #[test]
    fn summary_lists_every_parameter_in_order() {
        let stats = DatasetStats {
            n_points: 16,
            x_min: 0.0,
            x_max: 1.0,
            y_min: -1.0,
            y_max: 1.0,
        };
        let text = format_fit_summary(&stats, &sample_fit());

        let a0 = text.find("\na0 ").unwrap();
        let a1 = text.find("\na1 ").unwrap();
        let w = text.find("\nw ").unwrap();
        assert!(a0 < a1 && a1 < w);
        assert!(text.contains("2.000000e0"));
        assert!(text.contains("nan"));
        assert!(text.contains("R^2         0.900000"));
        assert!(text.contains("1. BFGS"));
        assert!(text.contains("(12 iters) Solver converged"));
    }

    #[test]
    fn undefined_r_squared_is_spelled_out() {
        let mut fit = sample_fit();
        fit.quality.r_squared = f64::NAN;
        let stats = DatasetStats {
            n_points: 16,
            x_min: 0.0,
            x_max: 1.0,
            y_min: 1.0,
            y_max: 1.0,
        };
        assert!(format_fit_summary(&stats, &fit).contains("R^2         undefined"));
    }
}
