//! Command-line parsing for the Fourier series fitter.
//!
//! Argument parsing and command dispatch stay separate from the modeling/math
//! code. Several options can also be set through `FFIT_*` environment
//! variables (a `.env` file is loaded first).

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::domain::{FitConfig, PlotMode, SeriesKind, Strategy};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ffit", version, about = "Fourier series least-squares fitter")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a Fourier series to a data file, print the result, and optionally plot/export.
    Fit(FitArgs),
    /// Plot a data file against a previously saved parameter file.
    Plot(PlotArgs),
    /// Write a synthetic dataset drawn from a known Fourier series.
    Synth(SynthArgs),
}

/// Options for fitting.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Whitespace-separated `x y` pairs.
    #[arg(value_name = "DATA", env = "FFIT_DATA")]
    pub data: PathBuf,

    /// Highest harmonic in the series.
    #[arg(short = 'n', long, env = "FFIT_ORDER", default_value_t = FitConfig::DEFAULT_ORDER)]
    pub order: usize,

    /// Series shape: cosine-only or sine+cosine.
    #[arg(long, value_enum, default_value_t = SeriesKind::Cosine)]
    pub series: SeriesKind,

    /// Optimizer stage; repeat to build a chain (default: bfgs basin-hopping bfgs).
    #[arg(short = 's', long = "strategy", value_enum)]
    pub strategies: Vec<Strategy>,

    /// Gradient-norm tolerance for BFGS stages.
    #[arg(long, env = "FFIT_TOL", default_value_t = FitConfig::DEFAULT_TOL)]
    pub tol: f64,

    /// Scale applied to every `y` value on load.
    #[arg(long, default_value_t = 1.0)]
    pub conversion_factor: f64,

    /// Write the fitted parameters as JSON.
    #[arg(short = 'o', long, env = "FFIT_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Export per-sample fitted values and residuals to CSV.
    #[arg(long)]
    pub export_residuals: Option<PathBuf>,

    /// Plot data and fitted curve after fitting (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Interactive terminal viewer or fixed-size ASCII plot.
    #[arg(long, value_enum, default_value_t = PlotMode::Tui)]
    pub plot_mode: PlotMode,

    /// ASCII plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// ASCII plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Basin hopping: number of hops.
    #[arg(long, default_value_t = 100)]
    pub hops: usize,

    /// Basin hopping: maximum perturbation per parameter.
    #[arg(long, default_value_t = 0.5)]
    pub step_size: f64,

    /// Basin hopping: Metropolis temperature.
    #[arg(long, default_value_t = 1.0)]
    pub temperature: f64,

    /// Seed for stochastic stages.
    #[arg(long, env = "FFIT_SEED", default_value_t = 42)]
    pub seed: u64,

    /// Iteration cap per local optimizer run.
    #[arg(long, default_value_t = 1000)]
    pub max_iters: u64,

    /// Initial frequency `w`.
    #[arg(long, default_value_t = 1.0)]
    pub w0: f64,

    /// Initial value for every coefficient.
    #[arg(long = "init", default_value_t = 1.0)]
    pub init_coef: f64,

    /// Frequency candidates for the grid stage.
    #[arg(long, default_value_t = 400)]
    pub grid_steps: usize,
}

/// Options for plotting a saved fit.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Data file the parameters were fitted to.
    #[arg(value_name = "DATA")]
    pub data: PathBuf,

    /// Parameter JSON written by `ffit fit --output`.
    #[arg(long, value_name = "JSON")]
    pub params: PathBuf,

    /// Scale applied to every `y` value on load.
    #[arg(long, default_value_t = 1.0)]
    pub conversion_factor: f64,

    #[arg(long, value_enum, default_value_t = PlotMode::Tui)]
    pub plot_mode: PlotMode,

    /// ASCII plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// ASCII plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for generating a synthetic dataset.
#[derive(Debug, Parser)]
pub struct SynthArgs {
    /// Output data file.
    #[arg(value_name = "OUT")]
    pub out: PathBuf,

    /// Cosine coefficients `a0, a1, ...` (comma-separated or repeated).
    #[arg(long = "a", value_delimiter = ',', allow_negative_numbers = true, required = true)]
    pub a: Vec<f64>,

    /// Sine coefficients `b1, b2, ...`; when given, the series is sine+cosine.
    #[arg(long = "b", value_delimiter = ',', allow_negative_numbers = true)]
    pub b: Vec<f64>,

    /// Frequency.
    #[arg(long, default_value_t = 1.0)]
    pub w: f64,

    /// Number of samples.
    #[arg(short = 'n', long = "n", default_value_t = 100)]
    pub count: usize,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub x_min: f64,

    #[arg(long, default_value_t = 10.0, allow_negative_numbers = true)]
    pub x_max: f64,

    /// Standard deviation of additive Gaussian noise.
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
