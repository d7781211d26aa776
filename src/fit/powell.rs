//! Powell's direction-set minimization.
//!
//! Each pass performs a line minimization along every direction of the set.
//! The net displacement of the pass is then tested as a new direction and, when
//! Powell's criterion accepts it, replaces the direction that contributed the
//! largest single decrease. That keeps the set from collapsing onto a subspace
//! while still building up conjugate directions on quadratic valleys.
//!
//! The point only ever moves to strictly lower cost, so the cost recorded at the
//! end of each pass is non-increasing.

use nalgebra::DMatrix;
use tracing::{debug, trace};

use crate::error::{FitError, try_buffer};
use crate::fit::convergence::{ConvergenceController, Decision, StopReason};
use crate::fit::line_search::{LineSearchOptions, line_minimize};

/// Result of [`minimize_powell`]. The minimizing point is written back into `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct PowellOutcome {
    /// Completed passes (0 if the starting point was already at the floor).
    pub iterations: usize,
    /// Objective at the returned point.
    pub cost: f64,
    pub stop_reason: StopReason,
    /// Objective at the end of each pass.
    pub history: Vec<f64>,
    /// Total objective evaluations, including the initial one.
    pub evaluations: usize,
    /// Line minimizations skipped as degenerate, over all passes.
    pub skipped_directions: usize,
}

struct Counted<F> {
    f: F,
    evaluations: usize,
}

impl<F> Counted<F>
where
    F: FnMut(&[f64]) -> f64,
{
    fn call(&mut self, x: &[f64]) -> f64 {
        self.evaluations += 1;
        (self.f)(x)
    }
}

/// Minimize `f` starting from `x`, updating `x` in place.
pub fn minimize_powell<F>(
    f: F,
    x: &mut [f64],
    controller: &ConvergenceController,
    line: &LineSearchOptions,
) -> Result<PowellOutcome, FitError>
where
    F: FnMut(&[f64]) -> f64,
{
    let n = x.len();
    if n == 0 {
        return Err(FitError::invalid("cannot minimize over an empty parameter vector"));
    }

    let mut objective = Counted { f, evaluations: 0 };
    let mut fx = objective.call(x);
    if !fx.is_finite() {
        return Err(FitError::invalid(format!("objective is not finite at the initial point ({fx})")));
    }

    let mut history = Vec::new();
    if controller.is_exact(fx) {
        debug!(cost = fx, "initial point already at the cost floor");
        return Ok(PowellOutcome {
            iterations: 0,
            cost: fx,
            stop_reason: StopReason::ExactFit,
            history,
            evaluations: objective.evaluations,
            skipped_directions: 0,
        });
    }

    let n2 = n
        .checked_mul(n)
        .ok_or(FitError::ResourceExhaustion { what: "direction set", requested: usize::MAX })?;
    let mut directions = DMatrix::from_vec(n, n, try_buffer("direction set", n2, 0.0)?);
    directions.fill_with_identity();

    let mut x_start = try_buffer("pass start point", n, 0.0)?;
    let mut extrapolated = try_buffer("extrapolated point", n, 0.0)?;
    let mut dir = try_buffer("search direction", n, 0.0)?;
    let mut scratch = try_buffer("line search scratch", n, 0.0)?;
    let mut skipped_directions = 0;

    let mut iteration = 0;
    loop {
        iteration += 1;
        x_start.copy_from_slice(x);
        let f_start = fx;

        let mut biggest_drop = 0.0;
        let mut biggest_idx = 0;
        for i in 0..n {
            for (d, v) in dir.iter_mut().zip(directions.column(i).iter()) {
                *d = *v;
            }
            match line_minimize(&mut |p: &[f64]| objective.call(p), x, &dir, fx, &mut scratch, line) {
                Some(step) => {
                    let drop = fx - step.cost;
                    if drop > biggest_drop {
                        biggest_drop = drop;
                        biggest_idx = i;
                    }
                    fx = step.cost;
                }
                None => {
                    skipped_directions += 1;
                    trace!(iteration, direction = i, "no descent along direction; skipped");
                }
            }
        }

        history.push(fx);
        debug!(iteration, cost = fx, decrease = f_start - fx, "direction-set pass complete");

        if let Decision::Stop(stop_reason) = controller.decide(f_start, fx, iteration) {
            return Ok(PowellOutcome {
                iterations: iteration,
                cost: fx,
                stop_reason,
                history,
                evaluations: objective.evaluations,
                skipped_directions,
            });
        }

        // Candidate direction: the net displacement of this pass.
        for j in 0..n {
            dir[j] = x[j] - x_start[j];
            extrapolated[j] = x[j] + dir[j];
        }
        let f_ext = objective.call(&extrapolated);
        if !(f_ext < f_start) {
            continue;
        }

        let t = 2.0 * (f_start - 2.0 * fx + f_ext) * (f_start - fx - biggest_drop).powi(2)
            - biggest_drop * (f_start - f_ext).powi(2);
        if t >= 0.0 {
            continue;
        }

        if let Some(step) = line_minimize(&mut |p: &[f64]| objective.call(p), x, &dir, fx, &mut scratch, line) {
            fx = step.cost;
            directions.swap_columns(biggest_idx, n - 1);
            for (m, d) in directions.column_mut(n - 1).iter_mut().zip(&dir) {
                *m = step.alpha * d;
            }
            trace!(iteration, replaced = biggest_idx, cost = fx, "direction set updated");
        }
    }
}
