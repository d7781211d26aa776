//! Fits over a range of bath sizes.
//!
//! - independent mode: every `nbath` starts from [`initial_bath`] and the fits
//!   run in parallel; results come back in `nbath` order
//! - warm-start mode: sizes are visited in increasing order and each fit starts
//!   from the previous optimum plus one site from [`grow_bath`], so the final
//!   cost can only go down as the bath grows

use num_complex::Complex64;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::{FitError, try_with_capacity};
use crate::fit::cost::Chi2Cost;
use crate::fit::fitter::{FitOptions, FitOutcome, fit_bath_on_grid};
use crate::fit::initial::{grow_bath, initial_bath};
use crate::math::matsubara_frequencies;

/// One fitted bath size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepEntry {
    pub nbath: usize,
    pub params: Vec<f64>,
    pub outcome: FitOutcome,
}

/// Sweep settings shared by both modes.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepSpec {
    pub nbath_min: usize,
    pub nbath_max: usize,
    pub nmats: usize,
    pub beta: f64,
    /// Half-width of the energy window used for starting points and site insertion.
    pub bandwidth: f64,
    pub warm_start: bool,
}

/// Fit every `nbath` in `spec.nbath_min..=spec.nbath_max` against `target`.
pub fn sweep_nbath(spec: &SweepSpec, target: &[Complex64], options: &FitOptions) -> Result<Vec<SweepEntry>, FitError> {
    if spec.nbath_min == 0 || spec.nbath_max < spec.nbath_min {
        return Err(FitError::invalid(format!(
            "nbath range must satisfy 1 <= min <= max (got {}..={})",
            spec.nbath_min, spec.nbath_max
        )));
    }
    if target.len() != spec.nmats {
        return Err(FitError::invalid(format!(
            "target must have nmats = {} values (got {})",
            spec.nmats,
            target.len()
        )));
    }
    let z = matsubara_frequencies(spec.nmats, spec.beta)?;
    // Reject bad options before any fit starts.
    options.controller()?;

    let count = (spec.nbath_max - spec.nbath_min)
        .checked_add(1)
        .ok_or(FitError::ResourceExhaustion { what: "sweep entries", requested: usize::MAX })?;

    if spec.warm_start {
        sweep_warm(spec, count, &z, target, options)
    } else {
        sweep_independent(spec, count, &z, target, options)
    }
}

fn sweep_independent(
    spec: &SweepSpec,
    count: usize,
    z: &[Complex64],
    target: &[Complex64],
    options: &FitOptions,
) -> Result<Vec<SweepEntry>, FitError> {
    let mut results: Vec<Result<SweepEntry, FitError>> = try_with_capacity("sweep entries", count)?;
    (0..count)
        .into_par_iter()
        .map(|offset| -> Result<SweepEntry, FitError> {
            let nbath = spec.nbath_min + offset;
            let mut params = initial_bath(nbath, spec.bandwidth)?;
            let outcome = fit_bath_on_grid(&mut params, z, target, options)?;
            debug!(nbath, cost = outcome.cost, "sweep entry done");
            Ok(SweepEntry { nbath, params, outcome })
        })
        .collect_into_vec(&mut results);
    results.into_iter().collect()
}

fn sweep_warm(
    spec: &SweepSpec,
    count: usize,
    z: &[Complex64],
    target: &[Complex64],
    options: &FitOptions,
) -> Result<Vec<SweepEntry>, FitError> {
    let cost = Chi2Cost::new(z, target)?;
    let mut out: Vec<SweepEntry> = try_with_capacity("sweep entries", count)?;

    for nbath in spec.nbath_min..=spec.nbath_max {
        let mut params = match out.last() {
            Some(prev) => grow_bath(&prev.params, &cost, spec.bandwidth)?,
            None => initial_bath(nbath, spec.bandwidth)?,
        };
        let outcome = fit_bath_on_grid(&mut params, z, target, options)?;
        debug!(nbath, cost = outcome.cost, "warm sweep entry done");
        out.push(SweepEntry { nbath, params, outcome });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::semicircular_target;

    fn spec(warm_start: bool) -> SweepSpec {
        SweepSpec {
            nbath_min: 1,
            nbath_max: 3,
            nmats: 200,
            beta: 20.0,
            bandwidth: 1.0,
            warm_start,
        }
    }

    #[test]
    fn independent_sweep_returns_sizes_in_order() {
        let s = spec(false);
        let target = semicircular_target(s.nmats, s.beta, 1.0).unwrap();
        let entries = sweep_nbath(&s, &target, &FitOptions::default()).unwrap();
        let sizes: Vec<usize> = entries.iter().map(|e| e.nbath).collect();
        assert_eq!(sizes, vec![1, 2, 3]);
        for e in &entries {
            assert_eq!(e.params.len(), 2 * e.nbath);
            assert!(e.outcome.cost.is_finite() && e.outcome.cost >= 0.0);
        }
    }

    #[test]
    fn warm_sweep_cost_never_increases() {
        let s = spec(true);
        let target = semicircular_target(s.nmats, s.beta, 1.0).unwrap();
        let entries = sweep_nbath(&s, &target, &FitOptions::default()).unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.windows(2).all(|w| w[1].outcome.cost <= w[0].outcome.cost));
    }

    #[test]
    fn rejects_bad_ranges() {
        let target = semicircular_target(200, 20.0, 1.0).unwrap();
        let mut s = spec(false);
        s.nbath_min = 0;
        assert!(sweep_nbath(&s, &target, &FitOptions::default()).is_err());
        let mut s = spec(false);
        s.nbath_min = 4;
        assert!(sweep_nbath(&s, &target, &FitOptions::default()).is_err());
    }

    #[test]
    fn oversized_range_reports_resource_exhaustion() {
        let target = semicircular_target(200, 20.0, 1.0).unwrap();
        for warm_start in [false, true] {
            let s = SweepSpec { nbath_max: usize::MAX, ..spec(warm_start) };
            let err = sweep_nbath(&s, &target, &FitOptions::default()).unwrap_err();
            assert!(
                matches!(err, FitError::ResourceExhaustion { what: "sweep entries", .. }),
                "warm_start={warm_start}: {err}"
            );
        }
    }
}
