//! Shared fit pipeline used by the `fit` command.
//!
//! load -> build model -> fit chain -> residuals
//!
//! The command handler can then focus on presentation (printing, plotting).

use crate::domain::{FitConfig, Residual, Samples};
use crate::error::AppError;
use crate::fit::{fit_series, FitOptions, FitResult};
use crate::io::read_dat_file;
use crate::models::FourierSeries;

/// All computed outputs of a single `ffit fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub samples: Samples,
    pub fit: FitResult,
    pub residuals: Vec<Residual>,
}

/// The model a config asks for.
pub fn model_from_config(config: &FitConfig) -> FourierSeries {
    FourierSeries::new(config.series, config.order)
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let samples = read_dat_file(&config.data_file, config.conversion_factor)?;
    tracing::info!(path = %config.data_file.display(), n = samples.len(), "loaded samples");
    run_fit_with_samples(config, samples)
}

/// Execute the pipeline on samples already in memory.
pub fn run_fit_with_samples(config: &FitConfig, samples: Samples) -> Result<RunOutput, AppError> {
    let model = model_from_config(config);
    let opts = FitOptions::from_config(config);
    let fit = fit_series(model, &samples, &config.strategies, &opts)?;
    let residuals = crate::report::compute_residuals(&samples, &fit.model, fit.theta())?;

    Ok(RunOutput {
        samples,
        fit,
        residuals,
    })
}

/// Write the parameter JSON and residual CSV the config asks for.
pub fn write_exports(config: &FitConfig, run: &RunOutput) -> Result<(), AppError> {
    if let Some(path) = &config.output_file {
        crate::io::params::write_params_json(path, &run.fit.params)?;
        tracing::info!(path = %path.display(), "wrote parameters");
    }
    if let Some(path) = &config.export_residuals {
        crate::io::export::write_residuals_csv(path, &run.residuals)?;
        tracing::info!(path = %path.display(), "wrote residuals");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::domain::Strategy;
    use crate::io::read_params_json;
    use crate::math::lin_space;

    #[test]
    fn constant_file_fits_order_zero() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "0 1\n1 1\n2 1\n3 1\n").unwrap();

        let mut config = FitConfig::new(file.path());
        config.order = 0;
        config.basin_hops = 5;

        let run = run_fit(&config).unwrap();
        assert_eq!(run.samples.x, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(run.samples.y, vec![1.0; 4]);
        assert!((run.fit.params.get("a0").unwrap() - 1.0).abs() < 1e-4);
        assert!(run.residuals.iter().all(|r| r.residual.abs() < 1e-4));
    }

    #[test]
    fn order_two_fit_writes_expected_keys() {
        let model = FourierSeries::cosine(2);
        let x = lin_space(0.0, 10.0, 50);
        let y = model.eval_many(&x, &[1.0, 0.5, 0.25, 1.0]);
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("params.json");
        let csv = dir.path().join("residuals.csv");

        let mut config = FitConfig::new("unused.dat");
        config.order = 2;
        config.strategies = vec![Strategy::Bfgs];
        config.output_file = Some(out.clone());
        config.export_residuals = Some(csv.clone());

        let run = run_fit_with_samples(&config, Samples { x, y }).unwrap();
        write_exports(&config, &run).unwrap();

        let back = read_params_json(&out).unwrap();
        let keys: Vec<&str> = back.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a0", "a1", "a2", "w"]);
        assert!(back.values().all(|v| v.is_finite()));

        let text = std::fs::read_to_string(&csv).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("x,y,y_fit,residual"));
        assert_eq!(lines.count(), 50);
    }

    #[test]
    fn exports_are_skipped_when_unset() {
        let model = FourierSeries::cosine(0);
        let x = vec![0.0, 1.0, 2.0];
        let y = model.eval_many(&x, &[2.0, 1.0]);
        let mut config = FitConfig::new("unused.dat");
        config.order = 0;
        config.strategies = vec![Strategy::Bfgs];

        let run = run_fit_with_samples(&config, Samples { x, y }).unwrap();
        assert!(config.output_file.is_none() && config.export_residuals.is_none());
        write_exports(&config, &run).unwrap();
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let config = FitConfig::new("/nonexistent/ffit/data.dat");
        let err = run_fit(&config).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_IO);
    }
}
