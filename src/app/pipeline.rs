//! Shared fit pipeline used by the `fit` and `sweep` commands.
//!
//! target generation -> starting bath -> fit -> summary
//!
//! The command handlers then only deal with presentation (text, plot or JSON).

use num_complex::Complex64;

use crate::domain::{FitConfig, FitSummary, SweepConfig, SweepSummary};
use crate::error::AppError;
use crate::fit::{fit_bath, initial_bath, sweep_nbath};
use crate::math::matsubara_frequencies;
use crate::models::{TargetKind, semicircular_target};

/// All computed outputs of a single `bathfit fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub summary: FitSummary,
    pub frequencies: Vec<Complex64>,
    pub target: Vec<Complex64>,
}

/// Sample the configured reference function on the Matsubara grid.
pub fn build_target(kind: TargetKind, nmats: usize, beta: f64, half_bandwidth: f64) -> Result<Vec<Complex64>, AppError> {
    let target = match kind {
        TargetKind::Semicircular => semicircular_target(nmats, beta, half_bandwidth)?,
    };
    Ok(target)
}

/// Execute one fit and return the summary plus the data needed for plotting.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let target = build_target(config.target, config.nmats, config.beta, config.half_bandwidth)?;

    let mut params = match &config.init {
        Some(init) => init.clone(),
        None => initial_bath(config.nbath, config.init_bandwidth)?,
    };

    let outcome = fit_bath(
        &mut params,
        config.nbath,
        config.nmats,
        &target,
        config.beta,
        &config.options,
    )?;
    let frequencies = matsubara_frequencies(config.nmats, config.beta)?;

    Ok(RunOutput {
        summary: FitSummary::new(config, params, outcome),
        frequencies,
        target,
    })
}

/// Execute a sweep over bath sizes.
pub fn run_sweep(config: &SweepConfig) -> Result<SweepSummary, AppError> {
    let target = build_target(config.target, config.spec.nmats, config.spec.beta, config.half_bandwidth)?;
    let entries = sweep_nbath(&config.spec, &target, &config.options)?;
    Ok(SweepSummary::new(config, entries))
}
