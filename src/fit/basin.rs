//! Basin hopping: a global stochastic search around BFGS.
//!
//! Each hop:
//! 1. perturbs every parameter of the current point by `U(-step, step)`
//! 2. runs a local BFGS minimization from the perturbed point
//! 3. accepts the local minimum with the Metropolis rule at `temperature`
//!
//! The best local minimum ever seen is returned. The RNG is seeded, so a run
//! is reproducible given the same inputs and seed.

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::AppError;
use crate::fit::local::{run_bfgs, StageOutcome};
use crate::fit::objective::LeastSquares;

/// Basin hopping settings.
#[derive(Debug, Clone, Copy)]
pub struct BasinOptions {
    pub hops: usize,
    pub step: f64,
    pub temperature: f64,
    pub seed: u64,
    pub tol: f64,
    pub max_iters: u64,
}

pub fn run_basin_hopping(
    problem: &LeastSquares<'_>,
    theta0: &[f64],
    opts: &BasinOptions,
) -> Result<StageOutcome, AppError> {
    if !(opts.step.is_finite() && opts.step > 0.0) {
        return Err(AppError::io(format!("Basin hopping step size must be > 0, got {}.", opts.step)));
    }

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let jitter = Uniform::new_inclusive(-opts.step, opts.step);

    let mut current = run_bfgs(problem, theta0, opts.tol, opts.max_iters)?;
    let mut best = current.clone();
    let mut iterations = current.iterations;
    let mut accepted = 0usize;
    let mut failed = 0usize;

    for hop in 0..opts.hops {
        let trial: Vec<f64> = current.theta.iter().map(|v| v + jitter.sample(&mut rng)).collect();

        // A failed local search rejects the hop; the global search carries on.
        let local = match run_bfgs(problem, &trial, opts.tol, opts.max_iters) {
            Ok(local) if local.cost.is_finite() => local,
            Ok(_) => {
                failed += 1;
                continue;
            }
            Err(e) => {
                tracing::debug!(hop, error = %e, "local minimization failed");
                failed += 1;
                continue;
            }
        };
        iterations += local.iterations;

        if metropolis_accept(local.cost, current.cost, opts.temperature, &mut rng) {
            accepted += 1;
            current = local;
            if current.cost < best.cost {
                tracing::debug!(hop, cost = current.cost, "new best basin");
                best = current.clone();
            }
        }
    }

    Ok(StageOutcome {
        theta: best.theta,
        cost: best.cost,
        iterations,
        message: format!(
            "{accepted}/{} hops accepted, {failed} local failures",
            opts.hops
        ),
    })
}

fn metropolis_accept<R: Rng>(new_cost: f64, old_cost: f64, temperature: f64, rng: &mut R) -> bool {
    if new_cost < old_cost {
        return true;
    }
    if temperature <= 0.0 {
        return false;
    }
    let p = (-(new_cost - old_cost) / temperature).exp();
    rng.r#gen::<f64>() < p
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FourierSeries;

    fn options(seed: u64) -> BasinOptions {
        BasinOptions {
            hops: 15,
            step: 0.5,
            temperature: 1.0,
            seed,
            tol: 1e-5,
            max_iters: 200,
        }
    }

    fn data() -> (Vec<f64>, Vec<f64>) {
        let x: Vec<f64> = (0..40).map(|i| i as f64 * 0.25).collect();
        let y: Vec<f64> = x.iter().map(|&v| 1.0 + 0.8 * (1.5 * v).cos()).collect();
        (x, y)
    }

    #[test]
    fn same_seed_same_result() {
        let model = FourierSeries::cosine(1);
        let (x, y) = data();
        let problem = LeastSquares::new(&model, &x, &y);

        let a = run_basin_hopping(&problem, &[1.0, 1.0, 1.0], &options(7)).unwrap();
        let b = run_basin_hopping(&problem, &[1.0, 1.0, 1.0], &options(7)).unwrap();
        assert_eq!(a.theta, b.theta);
        assert_eq!(a.cost, b.cost);
    }

    #[test]
    fn never_worse_than_start() {
        let model = FourierSeries::cosine(1);
        let (x, y) = data();
        let problem = LeastSquares::new(&model, &x, &y);

        let start = [1.0, 1.0, 1.0];
        let out = run_basin_hopping(&problem, &start, &options(3)).unwrap();
        assert!(out.cost <= problem.cost_at(&start));
    }

    #[test]
    fn metropolis_always_accepts_improvements() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(metropolis_accept(1.0, 2.0, 0.0, &mut rng));
        assert!(!metropolis_accept(2.0, 1.0, 0.0, &mut rng));
    }

    #[test]
    fn rejects_non_positive_step() {
        let model = FourierSeries::cosine(0);
        let x = [0.0, 1.0];
        let y = [1.0, 1.0];
        let problem = LeastSquares::new(&model, &x, &y);
        let mut opts = options(1);
        opts.step = 0.0;
        assert!(run_basin_hopping(&problem, &[1.0, 1.0], &opts).is_err());
    }
}
