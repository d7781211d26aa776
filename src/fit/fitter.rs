//! Bath fitting entry point.
//!
//! Given:
//! - an initial bath parameter vector (blocked layout, length `2·nbath`)
//! - `nmats` target values at `z_n = i(2n+1)π/β`
//!
//! we build the Matsubara grid, bind the least-squares objective and run the
//! direction-set optimizer, writing the fitted bath back into the caller's
//! vector.

use num_complex::Complex64;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::FitError;
use crate::fit::convergence::{
    ConvergenceController, DEFAULT_ABS_TOL, DEFAULT_MAX_ITER, DEFAULT_REL_TOL, StopReason,
};
use crate::fit::cost::Chi2Cost;
use crate::fit::line_search::LineSearchOptions;
use crate::fit::powell::minimize_powell;
use crate::math::matsubara_frequencies;

/// Optimizer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    /// Stop when a pass lowers the cost by less than this fraction.
    pub rel_tol: f64,
    /// Stop as soon as the cost is at or below this value.
    pub abs_tol: f64,
    /// Maximum number of direction-set passes.
    pub max_iter: usize,
    pub line: LineSearchOptions,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            rel_tol: DEFAULT_REL_TOL,
            abs_tol: DEFAULT_ABS_TOL,
            max_iter: DEFAULT_MAX_ITER,
            line: LineSearchOptions::default(),
        }
    }
}

impl FitOptions {
    /// Validate the settings and build the convergence controller.
    pub fn controller(&self) -> Result<ConvergenceController, FitError> {
        let line = &self.line;
        if !(line.tol.is_finite() && line.tol > 0.0) {
            return Err(FitError::invalid(format!(
                "line search tolerance must be finite and > 0 (got {})",
                line.tol
            )));
        }
        if line.max_iter == 0 || line.max_bracket_steps == 0 {
            return Err(FitError::invalid("line search iteration caps must be >= 1"));
        }
        if !(line.initial_step.is_finite() && line.initial_step != 0.0) {
            return Err(FitError::invalid(format!(
                "line search initial step must be finite and non-zero (got {})",
                line.initial_step
            )));
        }
        ConvergenceController::new(self.rel_tol, self.abs_tol, self.max_iter)
    }
}

/// Summary of one fit. The fitted parameters live in the caller's vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitOutcome {
    /// Completed direction-set passes; equals `max_iter` when the cap was hit.
    pub iterations: usize,
    /// Cost at the returned parameters.
    pub cost: f64,
    pub stop_reason: StopReason,
    /// Cost at the end of each pass.
    pub history: Vec<f64>,
    pub evaluations: usize,
    pub skipped_directions: usize,
    /// `sqrt(cost / nmats)`.
    pub residual_rms: f64,
    /// Norm of the analytic cost gradient at the returned parameters.
    pub gradient_norm: f64,
}

impl FitOutcome {
    pub fn converged(&self) -> bool {
        self.stop_reason.is_converged()
    }
}

/// Fit `nbath` bath sites to `target` sampled on the first `nmats` fermionic
/// Matsubara frequencies at inverse temperature `beta`.
///
/// `params` holds the initial guess on entry and the fitted bath on return,
/// laid out as `[e_0..e_{nbath-1}, V_0..V_{nbath-1}]`. All arguments are
/// validated before any optimization work; on error `params` is untouched.
pub fn fit_bath(
    params: &mut [f64],
    nbath: usize,
    nmats: usize,
    target: &[Complex64],
    beta: f64,
    options: &FitOptions,
) -> Result<FitOutcome, FitError> {
    if nbath == 0 {
        return Err(FitError::invalid("nbath must be >= 1"));
    }
    if nmats == 0 {
        return Err(FitError::invalid("nmats must be >= 1"));
    }
    if !(beta.is_finite() && beta > 0.0) {
        return Err(FitError::invalid(format!("beta must be finite and > 0 (got {beta})")));
    }
    let expected = nbath
        .checked_mul(2)
        .ok_or_else(|| FitError::invalid(format!("nbath too large ({nbath})")))?;
    if params.len() != expected {
        return Err(FitError::invalid(format!(
            "initial parameters must have length 2*nbath = {expected} (got {})",
            params.len()
        )));
    }
    if target.len() != nmats {
        return Err(FitError::invalid(format!(
            "target must have nmats = {nmats} values (got {})",
            target.len()
        )));
    }

    let z = matsubara_frequencies(nmats, beta)?;
    fit_bath_on_grid(params, &z, target, options)
}

/// Same as [`fit_bath`] for an explicit frequency grid.
pub fn fit_bath_on_grid(
    params: &mut [f64],
    z: &[Complex64],
    target: &[Complex64],
    options: &FitOptions,
) -> Result<FitOutcome, FitError> {
    if params.is_empty() || params.len() % 2 != 0 {
        return Err(FitError::invalid(format!(
            "bath parameter vector must have non-zero even length (got {})",
            params.len()
        )));
    }
    if let Some(i) = params.iter().position(|v| !v.is_finite()) {
        return Err(FitError::invalid(format!("initial parameter {i} is not finite ({})", params[i])));
    }
    if let Some(i) = target.iter().position(|t| !(t.re.is_finite() && t.im.is_finite())) {
        return Err(FitError::invalid(format!("target value {i} is not finite ({})", target[i])));
    }
    if let Some(i) = z.iter().position(|zn| !(zn.im.is_finite() && zn.im != 0.0 && zn.re.is_finite())) {
        return Err(FitError::invalid(format!(
            "frequency {i} must have finite, non-zero imaginary part ({})",
            z[i]
        )));
    }

    let controller = options.controller()?;
    let cost = Chi2Cost::new(z, target)?;
    let nbath = params.len() / 2;

    let run = minimize_powell(|p: &[f64]| cost.evaluate(p), params, &controller, &options.line)?;

    let outcome = FitOutcome {
        iterations: run.iterations,
        cost: run.cost,
        stop_reason: run.stop_reason,
        history: run.history,
        evaluations: run.evaluations,
        skipped_directions: run.skipped_directions,
        residual_rms: cost.residual_rms(params),
        gradient_norm: cost.gradient_norm(params)?,
    };

    match outcome.stop_reason {
        StopReason::MaxIterations => warn!(
            nbath,
            nmats = cost.nmats(),
            iterations = outcome.iterations,
            cost = outcome.cost,
            "bath fit hit the iteration cap; result may be suboptimal"
        ),
        reason => info!(
            nbath,
            nmats = cost.nmats(),
            iterations = outcome.iterations,
            cost = outcome.cost,
            evaluations = outcome.evaluations,
            reason = reason.display_name(),
            "bath fit finished"
        ),
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{bath_target, semicircular_target};

    #[test]
    fn recovers_known_two_site_bath() {
        let truth = [-1.0, 1.0, 0.5, 0.5];
        let (nmats, beta) = (200, 10.0);
        let target = bath_target(&truth, 2, nmats, beta).unwrap();

        let mut params = vec![-0.8, 1.2, 0.4, 0.6];
        let out = fit_bath(&mut params, 2, nmats, &target, beta, &FitOptions::default()).unwrap();

        assert!(out.cost < 1e-6, "cost {}", out.cost);
        assert!(out.iterations <= DEFAULT_MAX_ITER);
        assert!(out.converged());
    }

    #[test]
    fn reported_cost_matches_returned_parameters() {
        let (nmats, beta) = (300, 30.0);
        let target = semicircular_target(nmats, beta, 1.0).unwrap();
        let mut params = vec![-1.0, 0.0, 1.0, 0.3, 0.3, 0.3];
        let out = fit_bath(&mut params, 3, nmats, &target, beta, &FitOptions::default()).unwrap();

        let z = matsubara_frequencies(nmats, beta).unwrap();
        let cost = Chi2Cost::new(&z, &target).unwrap();
        assert_eq!(out.cost, cost.evaluate(&params));
        assert_eq!(out.residual_rms, (out.cost / nmats as f64).sqrt());
        assert!(out.history.windows(2).all(|w| w[1] <= w[0]));
        assert!(out.gradient_norm.is_finite());
    }

    #[test]
    fn invalid_arguments_leave_parameters_untouched() {
        let target = semicircular_target(10, 10.0, 1.0).unwrap();
        let original = vec![-1.0, 1.0, 0.2, 0.2];
        let opts = FitOptions::default();

        let cases: Vec<(usize, usize, f64)> = vec![
            (0, 10, 10.0),  // nbath
            (2, 0, 10.0),   // nmats
            (2, 10, 0.0),   // beta
            (2, 10, -5.0),  // beta
            (3, 10, 10.0),  // length mismatch
            (2, 11, 10.0),  // target mismatch
        ];
        for (nbath, nmats, beta) in cases {
            let mut params = original.clone();
            let err = fit_bath(&mut params, nbath, nmats, &target, beta, &opts).unwrap_err();
            assert!(matches!(err, FitError::InvalidArgument { .. }), "{nbath} {nmats} {beta}: {err}");
            assert_eq!(params, original);
        }
    }

    #[test]
    fn rejects_non_finite_inputs_and_bad_options() {
        let target = semicircular_target(10, 10.0, 1.0).unwrap();
        let mut params = vec![f64::NAN, 0.2];
        assert!(fit_bath(&mut params, 1, 10, &target, 10.0, &FitOptions::default()).is_err());

        let mut params = vec![0.0, 0.2];
        let bad = FitOptions { max_iter: 0, ..FitOptions::default() };
        assert!(fit_bath(&mut params, 1, 10, &target, 10.0, &bad).is_err());

        let bad_line = FitOptions {
            line: LineSearchOptions { tol: -1.0, ..LineSearchOptions::default() },
            ..FitOptions::default()
        };
        assert!(fit_bath(&mut params, 1, 10, &target, 10.0, &bad_line).is_err());
        assert_eq!(params, vec![0.0, 0.2]);
    }

    #[test]
    fn exact_initial_guess_returns_without_iterating() {
        let truth = [0.3, 0.7];
        let target = bath_target(&truth, 1, 20, 5.0).unwrap();
        let mut params = truth.to_vec();
        let out = fit_bath(&mut params, 1, 20, &target, 5.0, &FitOptions::default()).unwrap();
        assert_eq!(out.iterations, 0);
        assert_eq!(out.cost, 0.0);
        assert_eq!(out.stop_reason, StopReason::ExactFit);
        assert_eq!(params, truth.to_vec());
    }
}
