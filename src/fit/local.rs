//! Local optimizer stages backed by argmin.
//!
//! - BFGS with More–Thuente line search; the gradient-norm tolerance is the
//!   run's `tol`.
//! - Nelder–Mead simplex, started from `θ0` plus one vertex per parameter.
//!
//! Both helpers return a [`StageOutcome`] holding the best point argmin saw,
//! so a stage never ends worse than it started.
//!
//! When the BFGS line search breaks down (the quasi-Newton direction stops
//! being a descent direction through precision loss), the stage ends at the
//! lowest-cost point evaluated so far instead of failing. Cost and gradient
//! errors still propagate.

use std::cell::{Cell, RefCell};

use argmin::core::{ArgminError, CostFunction, Error, Executor, Gradient, State};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::neldermead::NelderMead;
use argmin::solver::quasinewton::BFGS;
use ndarray::{Array1, Array2};

use crate::error::AppError;
use crate::fit::objective::{LeastSquares, Theta};

pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Theta, f64>;
pub type Bfgs = BFGS<MoreThuenteLS, f64>;

/// Relative simplex offset for non-zero parameters.
const SIMPLEX_REL_STEP: f64 = 0.05;
/// Absolute simplex offset for parameters that start at zero.
const SIMPLEX_ZERO_STEP: f64 = 0.00025;

/// Result of a single optimizer stage.
#[derive(Debug, Clone)]
pub struct StageOutcome {
    pub theta: Vec<f64>,
    pub cost: f64,
    pub iterations: u64,
    pub message: String,
}

/// Run BFGS from `theta0`.
pub fn run_bfgs(
    problem: &LeastSquares<'_>,
    theta0: &[f64],
    tol: f64,
    max_iters: u64,
) -> Result<StageOutcome, AppError> {
    // A zero gradient gives the line search no descent direction to work with.
    let grad0 = problem.gradient_at(theta0);
    if l2_norm(&grad0) < tol {
        return Ok(StageOutcome {
            theta: theta0.to_vec(),
            cost: problem.cost_at(theta0),
            iterations: 0,
            message: "gradient below tolerance at start".to_string(),
        });
    }

    let solver = Bfgs::new(MoreThuenteLS::new())
        .with_tolerance_grad(tol)
        .map_err(|e| AppError::fit(format!("Invalid BFGS tolerance {tol}: {e}")))?;

    let best = BestPoint::default();
    let tracked = Tracked { problem, best: &best };
    let dim = theta0.len();
    let run = Executor::new(tracked, solver)
        .configure(|state| {
            state
                .param(Array1::from(theta0.to_vec()))
                .inv_hessian(Array2::eye(dim))
                .max_iters(max_iters)
        })
        .run();

    let result = match run {
        Ok(result) => result,
        Err(e) if is_line_search_breakdown(&e) => {
            let (theta, cost) = best
                .take()
                .unwrap_or_else(|| (theta0.to_vec(), problem.cost_at(theta0)));
            let iterations = best.gradient_evals.get();
            tracing::debug!(error = %e, cost, iterations, "BFGS line search broke down; keeping best point");
            return Ok(StageOutcome {
                theta,
                cost,
                iterations,
                message: "stopped: line search breakdown".to_string(),
            });
        }
        Err(e) => return Err(AppError::fit(format!("BFGS failed: {e}"))),
    };

    let state = result.state();
    let theta = state
        .get_best_param()
        .ok_or_else(|| AppError::fit("BFGS finished without a parameter vector."))?
        .to_vec();
    Ok(StageOutcome {
        cost: state.get_best_cost(),
        theta,
        iterations: state.get_iter(),
        message: termination_message(state.get_termination_reason()),
    })
}

/// Lowest-cost point seen by the solver, plus a gradient evaluation count.
#[derive(Debug, Default)]
struct BestPoint {
    point: RefCell<Option<(Vec<f64>, f64)>>,
    gradient_evals: Cell<u64>,
}

impl BestPoint {
    fn record(&self, theta: &Theta, cost: f64) {
        let mut point = self.point.borrow_mut();
        if point.as_ref().is_none_or(|(_, best)| cost < *best) {
            *point = Some((theta.to_vec(), cost));
        }
    }

    fn take(&self) -> Option<(Vec<f64>, f64)> {
        self.point.take()
    }
}

/// Forwards to [`LeastSquares`] and records every evaluated cost.
struct Tracked<'p, 'a> {
    problem: &'p LeastSquares<'a>,
    best: &'p BestPoint,
}

impl CostFunction for Tracked<'_, '_> {
    type Param = Theta;
    type Output = f64;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let cost = self.problem.cost(theta)?;
        self.best.record(theta, cost);
        Ok(cost)
    }
}

impl Gradient for Tracked<'_, '_> {
    type Param = Theta;
    type Gradient = Theta;

    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        self.best.gradient_evals.set(self.best.gradient_evals.get() + 1);
        self.problem.gradient(theta)
    }
}

/// Line-search condition failures (e.g. "search direction must be a descent
/// direction"). Errors raised by the objective itself are not breakdowns.
fn is_line_search_breakdown(e: &Error) -> bool {
    matches!(e.downcast_ref::<ArgminError>(), Some(ArgminError::ConditionViolated { .. }))
}

/// Run Nelder–Mead from `theta0`.
pub fn run_nelder_mead(
    problem: &LeastSquares<'_>,
    theta0: &[f64],
    tol: f64,
    max_iters: u64,
) -> Result<StageOutcome, AppError> {
    let solver = NelderMead::new(initial_simplex(theta0))
        .with_sd_tolerance(tol)
        .map_err(|e| AppError::fit(format!("Invalid Nelder-Mead tolerance {tol}: {e}")))?;

    let result = Executor::new(*problem, solver)
        .configure(|state| state.max_iters(max_iters))
        .run()
        .map_err(|e| AppError::fit(format!("Nelder-Mead failed: {e}")))?;

    let state = result.state();
    let theta = state
        .get_best_param()
        .ok_or_else(|| AppError::fit("Nelder-Mead finished without a parameter vector."))?
        .to_vec();
    Ok(StageOutcome {
        cost: state.get_best_cost(),
        theta,
        iterations: state.get_iter(),
        message: termination_message(state.get_termination_reason()),
    })
}

fn initial_simplex(theta0: &[f64]) -> Vec<Theta> {
    let mut simplex = Vec::with_capacity(theta0.len() + 1);
    simplex.push(Array1::from(theta0.to_vec()));
    for i in 0..theta0.len() {
        let mut vertex = theta0.to_vec();
        vertex[i] = if vertex[i] != 0.0 {
            vertex[i] * (1.0 + SIMPLEX_REL_STEP)
        } else {
            SIMPLEX_ZERO_STEP
        };
        simplex.push(Array1::from(vertex));
    }
    simplex
}

fn termination_message(reason: Option<&argmin::core::TerminationReason>) -> String {
    match reason {
        Some(r) => format!("{r:?}"),
        None => "not terminated".to_string(),
    }
}

pub(crate) fn l2_norm(v: &[f64]) -> f64 {
    v.iter().map(|g| g * g).sum::<f64>().sqrt()
}
