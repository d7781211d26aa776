//! Stop/continue decision for the direction-set loop.

use serde::{Deserialize, Serialize};

use crate::error::FitError;

pub const DEFAULT_REL_TOL: f64 = 1e-7;
pub const DEFAULT_ABS_TOL: f64 = 0.0;
pub const DEFAULT_MAX_ITER: usize = 500;

/// Keeps the relative test meaningful when both costs are ~0.
const TINY: f64 = 1e-25;

/// Why the optimizer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Cost reached the absolute floor (`≤ abs_tol`).
    ExactFit,
    /// Fractional decrease over a pass fell below `rel_tol`.
    Converged,
    /// Iteration cap reached first. The result may be suboptimal.
    MaxIterations,
}

impl StopReason {
    pub fn display_name(self) -> &'static str {
        match self {
            StopReason::ExactFit => "exact fit",
            StopReason::Converged => "converged",
            StopReason::MaxIterations => "iteration cap reached",
        }
    }

    pub fn is_converged(self) -> bool {
        !matches!(self, StopReason::MaxIterations)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Stop(StopReason),
}

/// Pure convergence test over `(cost before pass, cost after pass, passes done)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceController {
    rel_tol: f64,
    abs_tol: f64,
    max_iter: usize,
}

impl Default for ConvergenceController {
    fn default() -> Self {
        Self {
            rel_tol: DEFAULT_REL_TOL,
            abs_tol: DEFAULT_ABS_TOL,
            max_iter: DEFAULT_MAX_ITER,
        }
    }
}

impl ConvergenceController {
    pub fn new(rel_tol: f64, abs_tol: f64, max_iter: usize) -> Result<Self, FitError> {
        if !(rel_tol.is_finite() && rel_tol > 0.0) {
            return Err(FitError::invalid(format!(
                "relative tolerance must be finite and > 0 (got {rel_tol})"
            )));
        }
        if !(abs_tol.is_finite() && abs_tol >= 0.0) {
            return Err(FitError::invalid(format!(
                "absolute tolerance must be finite and >= 0 (got {abs_tol})"
            )));
        }
        if max_iter == 0 {
            return Err(FitError::invalid("max_iter must be >= 1"));
        }
        Ok(Self {
            rel_tol,
            abs_tol,
            max_iter,
        })
    }

    /// Whether a cost is already at the absolute floor.
    pub fn is_exact(&self, cost: f64) -> bool {
        cost <= self.abs_tol
    }

    /// Decide after pass number `iteration` (1-based).
    ///
    /// Checks, in order: absolute floor, fractional decrease
    /// `2·(f_before − f_after) ≤ rel_tol·(|f_before| + |f_after|)`, iteration cap.
    pub fn decide(&self, f_before: f64, f_after: f64, iteration: usize) -> Decision {
        if self.is_exact(f_after) {
            return Decision::Stop(StopReason::ExactFit);
        }
        if 2.0 * (f_before - f_after) <= self.rel_tol * (f_before.abs() + f_after.abs()) + TINY {
            return Decision::Stop(StopReason::Converged);
        }
        if iteration >= self.max_iter {
            return Decision::Stop(StopReason::MaxIterations);
        }
        Decision::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continues_while_cost_drops_fast() {
        let c = ConvergenceController::default();
        assert_eq!(c.decide(1.0, 0.5, 1), Decision::Continue);
    }

    #[test]
    fn stops_on_small_fractional_change() {
        let c = ConvergenceController::new(1e-7, 0.0, 200).unwrap();
        assert_eq!(c.decide(1.0, 1.0 - 1e-9, 3), Decision::Stop(StopReason::Converged));
        // No progress at all is also convergence, not a hang.
        assert_eq!(c.decide(0.3, 0.3, 3), Decision::Stop(StopReason::Converged));
    }

    #[test]
    fn stops_at_iteration_cap() {
        let c = ConvergenceController::new(1e-7, 0.0, 5).unwrap();
        assert_eq!(c.decide(1.0, 0.5, 4), Decision::Continue);
        assert_eq!(c.decide(1.0, 0.5, 5), Decision::Stop(StopReason::MaxIterations));
    }

    #[test]
    fn absolute_floor_wins() {
        let c = ConvergenceController::new(1e-7, 1e-12, 5).unwrap();
        assert_eq!(c.decide(1.0, 1e-13, 5), Decision::Stop(StopReason::ExactFit));
        assert!(c.is_exact(0.0));
    }

    #[test]
    fn rejects_bad_settings() {
        assert!(ConvergenceController::new(0.0, 0.0, 10).is_err());
        assert!(ConvergenceController::new(f64::NAN, 0.0, 10).is_err());
        assert!(ConvergenceController::new(1e-7, -1.0, 10).is_err());
        assert!(ConvergenceController::new(1e-7, 0.0, 0).is_err());
    }

    #[test]
    fn max_iterations_is_the_only_unconverged_reason() {
        assert!(StopReason::ExactFit.is_converged());
        assert!(StopReason::Converged.is_converged());
        assert!(!StopReason::MaxIterations.is_converged());
    }
}
