//! Frequency grid search.
//!
//! For a fixed `w` the series is linear in its coefficients, so each grid
//! candidate is solved exactly by least squares and only `w` is searched.
//!
//! The search is deterministic given the same inputs and flags.
//!
//! Range:
//! - lowest `w`: fundamental period twice the sample span (`π / span`)
//! - highest `w`: top harmonic at the Nyquist rate of the median spacing
//!   (`π / (n · dx)`)

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::error::AppError;
use crate::fit::local::StageOutcome;
use crate::fit::objective::LeastSquares;
use crate::math::{lin_space, solve_least_squares};
use crate::models::FourierSeries;

#[derive(Debug, Clone)]
struct Candidate {
    idx: usize,
    theta: Vec<f64>,
    sse: f64,
}

/// Candidate frequencies for `model` over the sample abscissae `x`.
///
/// Falls back to `[w_current]` when `w` has no effect (order 0) or the data
/// has no spread.
pub fn frequency_grid(model: &FourierSeries, x: &[f64], steps: usize, w_current: f64) -> Vec<f64> {
    if model.order() == 0 || steps < 2 {
        return vec![w_current];
    }

    let mut sorted: Vec<f64> = x.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mut gaps: Vec<f64> = sorted.windows(2).map(|w| w[1] - w[0]).filter(|d| *d > 0.0).collect();
    let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
        return vec![w_current];
    };
    let span = last - first;
    if gaps.is_empty() || span <= 0.0 {
        return vec![w_current];
    }
    gaps.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let dx = gaps[gaps.len() / 2];

    let w_min = std::f64::consts::PI / span;
    let w_max = std::f64::consts::PI / (model.order() as f64 * dx);
    if !(w_max > w_min) {
        return vec![w_current];
    }
    lin_space(w_min, w_max, steps)
}

/// Search the frequency grid and return the best `(coefficients, w)`.
///
/// Keeps `theta0` if no candidate beats it.
pub fn run_grid(problem: &LeastSquares<'_>, theta0: &[f64], steps: usize) -> Result<StageOutcome, AppError> {
    let model = problem.model();
    let w0 = theta0[model.w_index()];
    let grid = frequency_grid(model, problem.x(), steps, w0);

    // Evaluate each frequency independently (parallel).
    let candidates: Vec<Candidate> = grid
        .par_iter()
        .enumerate()
        .filter_map(|(idx, &w)| {
            evaluate_candidate(problem, w).map(|(theta, sse)| Candidate { idx, theta, sse })
        })
        .collect();

    if candidates.is_empty() {
        return Err(AppError::fit(format!(
            "No solvable frequency among {} grid candidates.",
            grid.len()
        )));
    }

    // Deterministic selection: pick the minimum SSE; break ties by original grid index.
    let mut best = &candidates[0];
    for c in &candidates[1..] {
        if c.sse < best.sse || (c.sse == best.sse && c.idx < best.idx) {
            best = c;
        }
    }

    let start_cost = problem.cost_at(theta0);
    let best_cost = 0.5 * best.sse;
    let message = format!("{} candidates, best w={:.6}", grid.len(), best.theta[model.w_index()]);
    if best_cost <= start_cost {
        Ok(StageOutcome {
            theta: best.theta.clone(),
            cost: best_cost,
            iterations: grid.len() as u64,
            message,
        })
    } else {
        Ok(StageOutcome {
            theta: theta0.to_vec(),
            cost: start_cost,
            iterations: grid.len() as u64,
            message: format!("{message} (start kept)"),
        })
    }
}

fn evaluate_candidate(problem: &LeastSquares<'_>, w: f64) -> Option<(Vec<f64>, f64)> {
    let model = problem.model();
    let n = problem.n();
    let p = model.coef_len();

    let mut design = DMatrix::<f64>::zeros(n, p);
    let mut row = vec![0.0; p];
    for (i, &x) in problem.x().iter().enumerate() {
        model.fill_design_row(w, x, &mut row);
        for (j, &v) in row.iter().enumerate() {
            design[(i, j)] = v;
        }
    }
    let y = DVector::from_column_slice(problem.y());

    let beta = solve_least_squares(&design, &y)?;
    let mut theta: Vec<f64> = beta.iter().copied().collect();
    theta.push(w);

    let sse = problem.sse(&theta);
    if sse.is_finite() { Some((theta, sse)) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::lin_space;

    #[test]
    fn grid_spans_fundamental_to_nyquist() {
        let model = FourierSeries::cosine(2);
        let x = lin_space(0.0, 10.0, 101);
        let grid = frequency_grid(&model, &x, 50, 1.0);
        assert_eq!(grid.len(), 50);
        assert!((grid[0] - std::f64::consts::PI / 10.0).abs() < 1e-12);
        assert!((grid[49] - std::f64::consts::PI / (2.0 * 0.1)).abs() < 1e-9);
    }

    #[test]
    fn order_zero_keeps_current_frequency() {
        let model = FourierSeries::cosine(0);
        let grid = frequency_grid(&model, &[0.0, 1.0, 2.0], 100, 0.7);
        assert_eq!(grid, vec![0.7]);
    }

    #[test]
    fn grid_recovers_known_frequency() {
        let model = FourierSeries::cosine(2);
        let x = lin_space(0.0, 10.0, 200);
        let truth = [0.5, 1.0, -0.7, 2.0];
        let y = model.eval_many(&x, &truth);
        let problem = LeastSquares::new(&model, &x, &y);

        let out = run_grid(&problem, &[1.0, 1.0, 1.0, 1.0], 2000).unwrap();
        let w = out.theta[model.w_index()];
        assert!((w - 2.0).abs() < 0.05, "w={w}");
        assert!(out.cost < problem.cost_at(&[1.0, 1.0, 1.0, 1.0]));
    }

    #[test]
    fn order_zero_solves_mean() {
        let model = FourierSeries::cosine(0);
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 2.0, 3.0, 4.0];
        let problem = LeastSquares::new(&model, &x, &y);

        let out = run_grid(&problem, &[0.0, 1.0], 10).unwrap();
        assert!((out.theta[0] - 2.5).abs() < 1e-10);
        assert_eq!(out.theta[1], 1.0);
    }
}
