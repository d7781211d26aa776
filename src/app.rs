//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs the stderr log subscriber
//! - runs a single fit or a sweep
//! - prints reports, plots or JSON to stdout

use clap::Parser;

use crate::cli::{Command, FitArgs, SolverArgs, SweepArgs};
use crate::domain::{FitConfig, SweepConfig};
use crate::error::AppError;
use crate::fit::{FitOptions, LineSearchOptions, SweepSpec};

pub mod pipeline;

/// Entry point for the `bathfit` binary.
pub fn run() -> Result<(), AppError> {
    // Missing .env is fine; flags and real env vars still apply.
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Fit(args) => handle_fit(&args),
        Command::Sweep(args) => handle_sweep(&args),
    }
}

fn handle_fit(args: &FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(args);
    let run = pipeline::run_fit(&config)?;

    if config.json {
        println!("{}", to_json(&run.summary)?);
        return Ok(());
    }

    println!("{}", crate::report::format_fit_summary(&run.summary));
    if config.plot {
        let plot = crate::plot::render_fit_plot(
            &run.frequencies,
            &run.target,
            &run.summary.params,
            config.plot_points,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }
    Ok(())
}

fn handle_sweep(args: &SweepArgs) -> Result<(), AppError> {
    let config = sweep_config_from_args(args);
    let summary = pipeline::run_sweep(&config)?;

    if config.json {
        println!("{}", to_json(&summary)?);
    } else {
        println!("{}", crate::report::format_sweep_table(&summary));
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AppError::new(4, format!("Failed to serialize summary: {e}")))
}

fn fit_options_from_args(args: &SolverArgs) -> FitOptions {
    FitOptions {
        rel_tol: args.rel_tol,
        abs_tol: args.abs_tol,
        max_iter: args.max_iter,
        line: LineSearchOptions {
            tol: args.line_tol,
            ..LineSearchOptions::default()
        },
    }
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        nbath: args.nbath,
        nmats: args.grid.nmats,
        beta: args.grid.beta,
        target: args.grid.target,
        half_bandwidth: args.grid.half_bandwidth,
        init_bandwidth: args.init_bandwidth,
        init: args.init.clone(),
        options: fit_options_from_args(&args.solver),
        json: args.json,
        plot: args.plot,
        plot_points: args.plot_points,
        plot_width: args.width,
        plot_height: args.height,
    }
}

pub fn sweep_config_from_args(args: &SweepArgs) -> SweepConfig {
    SweepConfig {
        spec: SweepSpec {
            nbath_min: args.nbath_min,
            nbath_max: args.nbath_max,
            nmats: args.grid.nmats,
            beta: args.grid.beta,
            bandwidth: args.init_bandwidth,
            warm_start: args.warm_start,
        },
        target: args.grid.target,
        half_bandwidth: args.grid.half_bandwidth,
        options: fit_options_from_args(&args.solver),
        json: args.json,
    }
}
