//! Command-line parsing for the Matsubara bath fitter.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fitting code. Tolerances and caps can also be set through `BATHFIT_*`
//! environment variables (a `.env` file is loaded before parsing).

use clap::{Args, Parser, Subcommand};

use crate::fit::{DEFAULT_ABS_TOL, DEFAULT_LINE_TOL, DEFAULT_MAX_ITER, DEFAULT_REL_TOL};
use crate::models::TargetKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "bathfit", version, about = "Discrete bath fitting on the Matsubara axis")]
pub struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error). Logs go to stderr.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit one bath and print diagnostics, fitted sites and optionally a plot.
    Fit(FitArgs),
    /// Fit a range of bath sizes and print one row per size.
    Sweep(SweepArgs),
}

/// Target function and frequency grid.
#[derive(Debug, Args, Clone)]
pub struct TargetArgs {
    /// Reference hybridization to fit.
    #[arg(long, value_enum, default_value_t = TargetKind::Semicircular)]
    pub target: TargetKind,

    /// Half bandwidth D of the reference density of states.
    #[arg(long, default_value_t = 1.0)]
    pub half_bandwidth: f64,

    /// Number of positive fermionic Matsubara frequencies.
    #[arg(long, default_value_t = 3000)]
    pub nmats: usize,

    /// Inverse temperature.
    #[arg(long, default_value_t = 70.0)]
    pub beta: f64,
}

/// Optimizer tolerances and caps.
#[derive(Debug, Args, Clone)]
pub struct SolverArgs {
    /// Relative decrease per pass below which the fit is converged.
    #[arg(long, env = "BATHFIT_REL_TOL", default_value_t = DEFAULT_REL_TOL)]
    pub rel_tol: f64,

    /// Stop as soon as the cost is at or below this value.
    #[arg(long, default_value_t = DEFAULT_ABS_TOL)]
    pub abs_tol: f64,

    /// Maximum number of direction-set passes.
    #[arg(long, env = "BATHFIT_MAX_ITER", default_value_t = DEFAULT_MAX_ITER)]
    pub max_iter: usize,

    /// Fractional precision of each line minimization.
    #[arg(long, env = "BATHFIT_LINE_TOL", default_value_t = DEFAULT_LINE_TOL)]
    pub line_tol: f64,
}

/// Options for `bathfit fit`.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Number of bath sites.
    #[arg(long, default_value_t = 8)]
    pub nbath: usize,

    #[command(flatten)]
    pub grid: TargetArgs,

    #[command(flatten)]
    pub solver: SolverArgs,

    /// Energy window [-w, w] of the generated starting bath.
    #[arg(long, default_value_t = 2.0)]
    pub init_bandwidth: f64,

    /// Explicit starting vector: nbath energies followed by nbath couplings.
    #[arg(long, num_args = 1.., allow_negative_numbers = true, value_name = "FLOAT")]
    pub init: Option<Vec<f64>>,

    /// Print a JSON summary instead of the text report.
    #[arg(long)]
    pub json: bool,

    /// Render an ASCII plot of Im Delta (target vs fit).
    #[arg(long)]
    pub plot: bool,

    /// Number of leading frequencies shown in the plot.
    #[arg(long, default_value_t = 60)]
    pub plot_points: usize,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for `bathfit sweep`.
#[derive(Debug, Args, Clone)]
pub struct SweepArgs {
    /// Smallest bath size.
    #[arg(long, default_value_t = 1)]
    pub nbath_min: usize,

    /// Largest bath size.
    #[arg(long, default_value_t = 8)]
    pub nbath_max: usize,

    #[command(flatten)]
    pub grid: TargetArgs,

    #[command(flatten)]
    pub solver: SolverArgs,

    /// Energy window [-w, w] for starting baths and inserted sites.
    #[arg(long, default_value_t = 2.0)]
    pub init_bandwidth: f64,

    /// Grow each bath from the previous optimum instead of fitting sizes independently.
    #[arg(long)]
    pub warm_start: bool,

    /// Print a JSON summary instead of the table.
    #[arg(long)]
    pub json: bool,
}
