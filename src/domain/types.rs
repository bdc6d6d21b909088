//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use clap::ValueEnum;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Which Fourier series shape to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeriesKind {
    /// `a0 + Σ a_i·cos(i·w·x)`
    Cosine,
    /// `a0 + Σ (a_i·cos(i·w·x) + b_i·sin(i·w·x))`
    Full,
}

impl SeriesKind {
    pub fn display_name(self) -> &'static str {
        match self {
            SeriesKind::Cosine => "cosine series",
            SeriesKind::Full => "sine+cosine series",
        }
    }
}

/// A single optimization stage in the fit chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Quasi-Newton BFGS with More–Thuente line search.
    Bfgs,
    /// Random perturbation + local BFGS + Metropolis acceptance.
    BasinHopping,
    /// Derivative-free simplex search.
    NelderMead,
    /// Frequency grid with exact linear least squares for the coefficients.
    Grid,
}

impl Strategy {
    pub fn display_name(self) -> &'static str {
        match self {
            Strategy::Bfgs => "BFGS",
            Strategy::BasinHopping => "BasinHopping",
            Strategy::NelderMead => "NelderMead",
            Strategy::Grid => "Grid",
        }
    }

    /// The default chain: local refine, global search, local polish.
    pub const DEFAULT_CHAIN: [Strategy; 3] = [Strategy::Bfgs, Strategy::BasinHopping, Strategy::Bfgs];
}

/// How the fitted curve is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlotMode {
    /// Interactive terminal viewer; blocks until the user quits.
    Tui,
    /// Fixed-size character plot printed to stdout.
    Ascii,
}

/// Two equal-length sequences loaded from a data file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Samples {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Samples {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn stats(&self) -> DatasetStats {
        let (x_min, x_max) = min_max(&self.x);
        let (y_min, y_max) = min_max(&self.y);
        DatasetStats {
            n_points: self.len(),
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }
}

/// Summary stats about the samples actually used for fitting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetStats {
    pub n_points: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Ordered parameter mapping (name -> value).
///
/// The order is the model's parameter order: `a0..an`, then `b1..bn` for the
/// full series, then `w`. Serialization keeps that order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSet {
    names: Vec<String>,
    values: Vec<f64>,
}

impl ParamSet {
    /// # Panics
    /// Panics if `names` and `values` differ in length.
    pub fn new(names: Vec<String>, values: Vec<f64>) -> Self {
        assert_eq!(names.len(), values.len(), "parameter names/values length mismatch");
        Self { names, values }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.values[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names.iter().map(String::as_str).zip(self.values.iter().copied())
    }
}

impl Serialize for ParamSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// A per-sample fitted value (used for exports and plots).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Residual {
    pub x: f64,
    pub y: f64,
    pub y_fit: f64,
    pub residual: f64,
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitQuality {
    /// Least-squares objective `½·Σ r²` (what the optimizer minimizes).
    pub objective: f64,
    /// `Σ r²` (chi-squared with unit sigma).
    pub sse: f64,
    pub rmse: f64,
    pub r_squared: f64,
    pub bic: f64,
    pub n: usize,
}

/// Outcome of one stage in the strategy chain.
#[derive(Debug, Clone)]
pub struct StageReport {
    pub strategy: Strategy,
    pub cost_before: f64,
    pub cost_after: f64,
    pub iterations: u64,
    pub message: String,
}

/// Full configuration of a fit run.
///
/// Derived from CLI flags (plus env vars and defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub data_file: PathBuf,
    /// Scale applied to every `y` value on load.
    pub conversion_factor: f64,
    pub order: usize,
    pub series: SeriesKind,
    /// Non-empty; executed as a chain.
    pub strategies: Vec<Strategy>,
    /// Gradient-norm tolerance for BFGS stages.
    pub tol: f64,
    pub max_iters: u64,

    /// Initial value for every coefficient.
    pub init_coef: f64,
    /// Initial frequency.
    pub w0: f64,

    pub basin_hops: usize,
    pub basin_step: f64,
    pub basin_temperature: f64,
    pub seed: u64,

    pub grid_steps: usize,

    pub plot: bool,
    pub plot_mode: PlotMode,
    pub plot_width: usize,
    pub plot_height: usize,

    pub output_file: Option<PathBuf>,
    pub export_residuals: Option<PathBuf>,
}

impl FitConfig {
    pub const DEFAULT_ORDER: usize = 6;
    pub const DEFAULT_TOL: f64 = 1e-5;

    /// A config with the standard defaults for the given data file.
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            conversion_factor: 1.0,
            order: Self::DEFAULT_ORDER,
            series: SeriesKind::Cosine,
            strategies: Strategy::DEFAULT_CHAIN.to_vec(),
            tol: Self::DEFAULT_TOL,
            max_iters: 1000,
            init_coef: 1.0,
            w0: 1.0,
            basin_hops: 100,
            basin_step: 0.5,
            basin_temperature: 1.0,
            seed: 42,
            grid_steps: 400,
            plot: false,
            plot_mode: PlotMode::Tui,
            plot_width: 100,
            plot_height: 25,
            output_file: None,
            export_residuals: None,
        }
    }
}
