//! Shared domain types.
//!
//! Configuration structs are built once from CLI arguments and then passed by
//! reference. Summary structs are what `--json` serializes, so their field names
//! are part of the output format.

use serde::Serialize;

use crate::fit::{FitOptions, FitOutcome, SweepEntry, SweepSpec};
use crate::models::{BathView, TargetKind};

/// Everything needed for one `bathfit fit` run.
#[derive(Debug, Clone, PartialEq)]
pub struct FitConfig {
    pub nbath: usize,
    pub nmats: usize,
    pub beta: f64,
    pub target: TargetKind,
    /// Half bandwidth `D` of the reference density of states.
    pub half_bandwidth: f64,
    /// Energy window of the generated starting bath.
    pub init_bandwidth: f64,
    /// Explicit starting vector in blocked layout; overrides `init_bandwidth`.
    pub init: Option<Vec<f64>>,
    pub options: FitOptions,

    pub json: bool,
    pub plot: bool,
    pub plot_points: usize,
    pub plot_width: usize,
    pub plot_height: usize,
}

/// Everything needed for one `bathfit sweep` run.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub spec: SweepSpec,
    pub target: TargetKind,
    pub half_bandwidth: f64,
    pub options: FitOptions,
    pub json: bool,
}

/// One bath site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BathSite {
    pub energy: f64,
    pub coupling: f64,
}

/// Split a blocked parameter vector into sites.
pub fn bath_sites(params: &[f64]) -> Vec<BathSite> {
    BathView::new(params)
        .sites()
        .map(|(energy, coupling)| BathSite { energy, coupling })
        .collect()
}

/// Result of a single fit, as printed by `--json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitSummary {
    pub nbath: usize,
    pub nmats: usize,
    pub beta: f64,
    pub target: TargetKind,
    pub half_bandwidth: f64,
    /// Fitted parameters in blocked layout.
    pub params: Vec<f64>,
    pub sites: Vec<BathSite>,
    pub outcome: FitOutcome,
}

impl FitSummary {
    pub fn new(config: &FitConfig, params: Vec<f64>, outcome: FitOutcome) -> Self {
        Self {
            nbath: config.nbath,
            nmats: config.nmats,
            beta: config.beta,
            target: config.target,
            half_bandwidth: config.half_bandwidth,
            sites: bath_sites(&params),
            params,
            outcome,
        }
    }
}

/// Result of a sweep, as printed by `--json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepSummary {
    pub nmats: usize,
    pub beta: f64,
    pub target: TargetKind,
    pub half_bandwidth: f64,
    pub warm_start: bool,
    pub entries: Vec<SweepEntry>,
}

impl SweepSummary {
    pub fn new(config: &SweepConfig, entries: Vec<SweepEntry>) -> Self {
        Self {
            nmats: config.spec.nmats,
            beta: config.spec.beta,
            target: config.target,
            half_bandwidth: config.half_bandwidth,
            warm_start: config.spec.warm_start,
            entries,
        }
    }
}
