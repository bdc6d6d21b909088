//! Synthetic Fourier samples with Gaussian noise.
//!
//! Writes the same whitespace-separated pair format the fitter reads, so a
//! generated file can be fed straight back into `ffit fit`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::Samples;
use crate::error::AppError;
use crate::math::lin_space;
use crate::models::FourierSeries;

/// Sampling settings for a synthetic dataset.
#[derive(Debug, Clone, Copy)]
pub struct SynthSpec {
    pub n: usize,
    pub x_min: f64,
    pub x_max: f64,
    /// Standard deviation of the additive noise on `y`.
    pub noise: f64,
    pub seed: u64,
}

/// Evaluate `model` at `theta` on an even grid and add seeded noise.
pub fn generate_samples(model: &FourierSeries, theta: &[f64], spec: &SynthSpec) -> Result<Samples, AppError> {
    if spec.n == 0 {
        return Err(AppError::io("Sample count must be > 0."));
    }
    if !(spec.x_min.is_finite() && spec.x_max.is_finite() && spec.x_max >= spec.x_min) {
        return Err(AppError::io(format!(
            "Invalid x range [{}, {}] for sample generation.",
            spec.x_min, spec.x_max
        )));
    }
    if theta.len() != model.param_len() {
        return Err(AppError::io(format!(
            "Expected {} parameters for {}, got {}.",
            model.param_len(),
            model.kind().display_name(),
            theta.len()
        )));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let normal = Normal::new(0.0, spec.noise)
        .map_err(|e| AppError::io(format!("Noise distribution error: {e}")))?;

    let x = lin_space(spec.x_min, spec.x_max, spec.n);
    let y = x
        .iter()
        .map(|&xi| model.eval(xi, theta) + normal.sample(&mut rng))
        .collect();

    tracing::debug!(n = spec.n, seed = spec.seed, "generated synthetic samples");
    Ok(Samples { x, y })
}

/// Write samples as one `x y` pair per line.
pub fn write_dat_file(path: &Path, samples: &Samples) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create {}: {e}", path.display())))?;
    let mut w = BufWriter::new(file);
    for (x, y) in samples.x.iter().zip(&samples.y) {
        writeln!(w, "{x} {y}").map_err(|e| AppError::io(format!("Failed to write {}: {e}", path.display())))?;
    }
    w.flush()
        .map_err(|e| AppError::io(format!("Failed to write {}: {e}", path.display())))?;

    tracing::info!(path = %path.display(), n = samples.len(), "wrote synthetic data");
    Ok(())
}
