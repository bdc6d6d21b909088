//! Fit driver: runs a chain of optimizer strategies on one model.
//!
//! Given:
//! - a Fourier series (kind + order)
//! - samples `(x_i, y_i)`
//! - an ordered, non-empty list of strategies
//!
//! we start from the initial guess (every coefficient and `w` at 1.0 unless
//! configured otherwise) and run each strategy in turn, each one starting
//! from the best point found so far. The final point is reported with its
//! quality metrics and standard errors.
//!
//! Errors from a stage abort the whole fit; there is no retry or fallback.

use crate::domain::{FitConfig, FitQuality, ParamSet, Samples, StageReport, Strategy};
use crate::error::AppError;
use crate::fit::basin::{run_basin_hopping, BasinOptions};
use crate::fit::freq_grid::run_grid;
use crate::fit::local::{run_bfgs, run_nelder_mead, StageOutcome};
use crate::fit::objective::LeastSquares;
use crate::fit::quality::{fit_quality, standard_errors};
use crate::models::FourierSeries;

/// Options that affect how each strategy runs.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Gradient-norm tolerance for BFGS stages (also the Nelder–Mead simplex
    /// spread tolerance).
    pub tol: f64,
    pub max_iters: u64,
    pub init_coef: f64,
    pub w0: f64,
    pub basin_hops: usize,
    pub basin_step: f64,
    pub basin_temperature: f64,
    pub seed: u64,
    pub grid_steps: usize,
}

impl FitOptions {
    pub fn from_config(config: &FitConfig) -> Self {
        Self {
            tol: config.tol,
            max_iters: config.max_iters,
            init_coef: config.init_coef,
            w0: config.w0,
            basin_hops: config.basin_hops,
            basin_step: config.basin_step,
            basin_temperature: config.basin_temperature,
            seed: config.seed,
            grid_steps: config.grid_steps,
        }
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        Self::from_config(&FitConfig::new(""))
    }
}

/// Fit output for a single model.
#[derive(Debug, Clone)]
pub struct FitResult {
    pub model: FourierSeries,
    pub params: ParamSet,
    /// Standard error per parameter (same order as `params`; NaN if undefined).
    pub std_errs: Vec<f64>,
    pub quality: FitQuality,
    pub stages: Vec<StageReport>,
}

impl FitResult {
    pub fn theta(&self) -> &[f64] {
        self.params.values()
    }
}

/// Fit `model` to `samples` by running `strategies` as a chain.
pub fn fit_series(
    model: FourierSeries,
    samples: &Samples,
    strategies: &[Strategy],
    opts: &FitOptions,
) -> Result<FitResult, AppError> {
    validate_inputs(&model, samples, strategies, opts)?;

    let problem = LeastSquares::new(&model, &samples.x, &samples.y);
    let mut theta = model.initial_params(opts.init_coef, opts.w0);
    let mut cost = problem.cost_at(&theta);
    if !cost.is_finite() {
        return Err(AppError::fit("Initial least-squares cost is not finite."));
    }

    let mut stages = Vec::with_capacity(strategies.len());
    for (idx, &strategy) in strategies.iter().enumerate() {
        let span = tracing::info_span!("stage", idx, strategy = strategy.display_name());
        let _enter = span.enter();

        let outcome = run_stage(strategy, &problem, &theta, opts)?;
        if !outcome.cost.is_finite() || outcome.theta.iter().any(|v| !v.is_finite()) {
            return Err(AppError::fit(format!(
                "{} produced non-finite parameters or cost.",
                strategy.display_name()
            )));
        }
        tracing::info!(
            cost_before = cost,
            cost_after = outcome.cost,
            iterations = outcome.iterations,
            "{}",
            outcome.message
        );

        stages.push(StageReport {
            strategy,
            cost_before: cost,
            cost_after: outcome.cost,
            iterations: outcome.iterations,
            message: outcome.message,
        });
        if outcome.cost <= cost {
            theta = outcome.theta;
            cost = outcome.cost;
        }
    }

    let quality = fit_quality(&problem, &theta);
    let std_errs = standard_errors(&problem, &theta);
    Ok(FitResult {
        model,
        params: model.param_set(&theta),
        std_errs,
        quality,
        stages,
    })
}

fn run_stage(
    strategy: Strategy,
    problem: &LeastSquares<'_>,
    theta: &[f64],
    opts: &FitOptions,
) -> Result<StageOutcome, AppError> {
    match strategy {
        Strategy::Bfgs => run_bfgs(problem, theta, opts.tol, opts.max_iters),
        Strategy::NelderMead => run_nelder_mead(problem, theta, opts.tol, opts.max_iters),
        Strategy::Grid => run_grid(problem, theta, opts.grid_steps),
        Strategy::BasinHopping => run_basin_hopping(
            problem,
            theta,
            &BasinOptions {
                hops: opts.basin_hops,
                step: opts.basin_step,
                temperature: opts.basin_temperature,
                seed: opts.seed,
                tol: opts.tol,
                max_iters: opts.max_iters,
            },
        ),
    }
}

fn validate_inputs(
    model: &FourierSeries,
    samples: &Samples,
    strategies: &[Strategy],
    opts: &FitOptions,
) -> Result<(), AppError> {
    if strategies.is_empty() {
        return Err(AppError::io("At least one optimization strategy is required."));
    }
    if !(opts.tol.is_finite() && opts.tol > 0.0) {
        return Err(AppError::io(format!("Tolerance must be > 0, got {}.", opts.tol)));
    }
    if samples.x.len() != samples.y.len() {
        return Err(AppError::data(format!(
            "x/y length mismatch: {} vs {}.",
            samples.x.len(),
            samples.y.len()
        )));
    }
    if samples.is_empty() {
        return Err(AppError::data("No data points to fit."));
    }
    if samples.x.iter().chain(&samples.y).any(|v| !v.is_finite()) {
        return Err(AppError::data("Data contains non-finite values."));
    }
    let k = model.param_len();
    let n = samples.len();
    if n < k {
        return Err(AppError::data(format!(
            "Underdetermined: n={n} samples < {k} parameters for order {}.",
            model.order()
        )));
    }
    Ok(())
}
