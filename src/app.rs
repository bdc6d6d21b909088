//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments (after loading `.env`)
//! - runs the fit pipeline
//! - prints the model and fit summary
//! - writes optional exports and shows the plot

use clap::Parser;

use crate::cli::{Command, FitArgs, PlotArgs, SynthArgs};
use crate::domain::{FitConfig, PlotMode, Residual, Strategy};
use crate::error::AppError;
use crate::models::FourierSeries;

pub mod pipeline;

/// Entry point for the `ffit` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine; a malformed one is worth a warning once logging is up.
    let dotenv = dotenvy::dotenv();

    // `ffit data.dat` behaves like `ffit fit data.dat`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    crate::logging::init_logging(cli.verbose);

    if let Err(e) = dotenv {
        if !e.not_found() {
            tracing::warn!(error = %e, "failed to load .env");
        }
    }

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Plot(args) => handle_plot(args),
        Command::Synth(args) => handle_synth(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let model = pipeline::model_from_config(&config);
    println!("{}", crate::report::format_model(&model));

    let run = pipeline::run_fit(&config)?;
    println!(
        "{}",
        crate::report::format_fit_summary(&run.samples.stats(), &run.fit)
    );

    pipeline::write_exports(&config, &run)?;

    if config.plot {
        let details = vec![
            model.to_string(),
            format!(
                "rmse={:.4e} | r2={:.6} | n={}",
                run.fit.quality.rmse, run.fit.quality.r_squared, run.fit.quality.n
            ),
        ];
        show_plot(
            &config.data_file.display().to_string(),
            details,
            &run.residuals,
            config.plot_mode,
            config.plot_width,
            config.plot_height,
        )?;
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let samples = crate::io::read_dat_file(&args.data, args.conversion_factor)?;
    let values = crate::io::read_params_json(&args.params)?;
    let model = FourierSeries::from_param_names(values.keys().map(String::as_str))?;
    let theta = model.theta_from_map(&values)?;
    let residuals = crate::report::compute_residuals(&samples, &model, &theta)?;

    show_plot(
        &args.data.display().to_string(),
        vec![model.to_string(), format!("params: {}", args.params.display())],
        &residuals,
        args.plot_mode,
        args.width,
        args.height,
    )
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    let (model, theta) = synth_model(&args)?;
    let spec = crate::data::SynthSpec {
        n: args.count,
        x_min: args.x_min,
        x_max: args.x_max,
        noise: args.noise,
        seed: args.seed,
    };
    let samples = crate::data::generate_samples(&model, &theta, &spec)?;
    crate::data::write_dat_file(&args.out, &samples)?;
    println!("Wrote {} samples of {model} to {}", samples.len(), args.out.display());
    Ok(())
}

/// Build the model and parameter vector for `ffit synth`.
fn synth_model(args: &SynthArgs) -> Result<(FourierSeries, Vec<f64>), AppError> {
    let Some(order) = args.a.len().checked_sub(1) else {
        return Err(AppError::io("At least one cosine coefficient (a0) is required."));
    };
    if args.b.is_empty() {
        let mut theta = args.a.clone();
        theta.push(args.w);
        return Ok((FourierSeries::cosine(order), theta));
    }
    if args.b.len() != order {
        return Err(AppError::io(format!(
            "Expected {order} sine coefficients to match a1..a{order}, got {}.",
            args.b.len()
        )));
    }
    let mut theta = args.a.clone();
    theta.extend_from_slice(&args.b);
    theta.push(args.w);
    Ok((FourierSeries::full(order), theta))
}

fn show_plot(
    title: &str,
    details: Vec<String>,
    residuals: &[Residual],
    mode: PlotMode,
    width: usize,
    height: usize,
) -> Result<(), AppError> {
    match mode {
        PlotMode::Ascii => {
            println!("{}", crate::plot::render_ascii_plot(residuals, width, height));
            Ok(())
        }
        PlotMode::Tui => {
            let view = crate::tui::PlotView::from_residuals(title, details, residuals);
            crate::tui::run_viewer(&view)
        }
    }
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    let strategies = if args.strategies.is_empty() {
        Strategy::DEFAULT_CHAIN.to_vec()
    } else {
        args.strategies.clone()
    };

    FitConfig {
        data_file: args.data.clone(),
        conversion_factor: args.conversion_factor,
        order: args.order,
        series: args.series,
        strategies,
        tol: args.tol,
        max_iters: args.max_iters,
        init_coef: args.init_coef,
        w0: args.w0,
        basin_hops: args.hops,
        basin_step: args.step_size,
        basin_temperature: args.temperature,
        seed: args.seed,
        grid_steps: args.grid_steps,
        plot: args.plot && !args.no_plot,
        plot_mode: args.plot_mode,
        plot_width: args.width,
        plot_height: args.height,
        output_file: args.output.clone(),
        export_residuals: args.export_residuals.clone(),
    }
}

/// Rewrite argv so a bare data file defaults to `ffit fit`.
///
/// Rules:
/// - `ffit`                          -> unchanged (clap prints usage)
/// - `ffit data.dat ...`             -> `ffit fit data.dat ...`
/// - `ffit -v data.dat ...`          -> `ffit fit -v data.dat ...`
/// - `ffit --help/--version/-h`      -> unchanged (show top-level help/version)
/// - `ffit fit|plot|synth|help ...`  -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "plot" | "synth");
    if is_subcommand {
        return argv;
    }

    // A global flag may precede the subcommand.
    let first_positional = argv[1..].iter().find(|a| !a.starts_with('-'));
    if let Some(p) = first_positional {
        if matches!(p.as_str(), "fit" | "plot" | "synth" | "help") {
            return argv;
        }
    }

    argv.insert(1, "fit".to_string());
    argv
}
