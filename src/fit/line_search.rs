//! One-dimensional minimization along a search direction.
//!
//! Two stages:
//!
//! 1. **Bracketing**: starting from `α = 0` (the current point) and a trial step,
//!    walk downhill with golden-ratio expansion and parabolic extrapolation until
//!    a triple `a < b < c` (or `a > b > c`) with `f(b) ≤ f(a), f(c)` is found.
//! 2. **Brent**: inverse parabolic interpolation with golden-section fallback
//!    inside the bracket.
//!
//! A direction along which the objective does not change at all is reported as
//! degenerate (`None`); the optimizer skips it for the current pass.

use tracing::trace;

/// Golden ratio used for bracket expansion.
const GOLD: f64 = 1.618_034;
/// `(3 − √5)/2`, the golden-section fraction.
const CGOLD: f64 = 0.381_966_0;
/// Maximum magnification of a parabolic extrapolation step.
const GLIMIT: f64 = 100.0;
/// Guards the parabolic step denominator.
const TINY: f64 = 1e-20;
/// Absolute floor of the Brent tolerance, for minima at `α ≈ 0`.
const ZEPS: f64 = 1e-10;

pub const DEFAULT_LINE_TOL: f64 = 1e-6;
pub const DEFAULT_LINE_MAX_ITER: usize = 100;
pub const DEFAULT_BRACKET_MAX_STEPS: usize = 60;

/// Tuning knobs for the line minimization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSearchOptions {
    /// Fractional precision of the step length.
    pub tol: f64,
    /// Brent iteration cap.
    pub max_iter: usize,
    /// Bracket expansion cap.
    pub max_bracket_steps: usize,
    /// First trial step (in units of the direction vector).
    pub initial_step: f64,
}

impl Default for LineSearchOptions {
    fn default() -> Self {
        Self {
            tol: DEFAULT_LINE_TOL,
            max_iter: DEFAULT_LINE_MAX_ITER,
            max_bracket_steps: DEFAULT_BRACKET_MAX_STEPS,
            initial_step: 1.0,
        }
    }
}

/// Accepted step along a direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStep {
    pub alpha: f64,
    pub cost: f64,
}

/// Three points enclosing a minimum: `fb ≤ fa` and `fb ≤ fc`, `b` between `a` and `c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub fa: f64,
    pub fb: f64,
    pub fc: f64,
}

/// Result of the bracketing stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BracketOutcome {
    Found(Bracket),
    /// Still descending when the expansion cap was hit; carries the best point seen.
    Unbounded { alpha: f64, value: f64 },
    /// Objective identical at every probe.
    Flat,
}

/// Bracket a minimum of `f` starting from `a` (with known value `fa`) and `b`.
pub fn bracket_minimum<F>(f: &mut F, a: f64, fa: f64, b: f64, max_steps: usize) -> BracketOutcome
where
    F: FnMut(f64) -> f64,
{
    let (mut a, mut b) = (a, b);
    let mut fa = fa;
    let mut fb = f(b);
    if fb > fa {
        std::mem::swap(&mut a, &mut b);
        std::mem::swap(&mut fa, &mut fb);
    }

    let mut c = b + GOLD * (b - a);
    let mut fc = f(c);
    if fa == fb && fb == fc {
        return BracketOutcome::Flat;
    }

    let mut steps = 0;
    while fb > fc {
        steps += 1;
        if steps > max_steps {
            return BracketOutcome::Unbounded { alpha: c, value: fc };
        }

        let r = (b - a) * (fb - fc);
        let q = (b - c) * (fb - fa);
        let u_denom = 2.0 * sign((q - r).abs().max(TINY), q - r);
        let mut u = b - ((b - c) * q - (b - a) * r) / u_denom;
        let ulim = b + GLIMIT * (c - b);
        let mut fu;

        if (b - u) * (u - c) > 0.0 {
            // Parabolic u lies between b and c.
            fu = f(u);
            if fu < fc {
                return BracketOutcome::Found(Bracket { a: b, b: u, c, fa: fb, fb: fu, fc });
            } else if fu > fb {
                return BracketOutcome::Found(Bracket { a, b, c: u, fa, fb, fc: fu });
            }
            u = c + GOLD * (c - b);
            fu = f(u);
        } else if (c - u) * (u - ulim) > 0.0 {
            // Between c and its allowed limit.
            fu = f(u);
            if fu < fc {
                b = c;
                c = u;
                u = c + GOLD * (c - b);
                fb = fc;
                fc = fu;
                fu = f(u);
            }
        } else if (u - ulim) * (ulim - c) >= 0.0 {
            u = ulim;
            fu = f(u);
        } else {
            u = c + GOLD * (c - b);
            fu = f(u);
        }

        a = b;
        b = c;
        c = u;
        fa = fb;
        fb = fc;
        fc = fu;
    }

    BracketOutcome::Found(Bracket { a, b, c, fa, fb, fc })
}

/// Brent's method inside a bracket. Returns `(x_min, f_min)` with
/// `f_min ≤ bracket.fb`.
pub fn brent<F>(f: &mut F, bracket: &Bracket, tol: f64, max_iter: usize) -> (f64, f64)
where
    F: FnMut(f64) -> f64,
{
    let mut a = bracket.a.min(bracket.c);
    let mut b = bracket.a.max(bracket.c);
    let (mut x, mut w, mut v) = (bracket.b, bracket.b, bracket.b);
    let (mut fx, mut fw, mut fv) = (bracket.fb, bracket.fb, bracket.fb);
    let mut d: f64 = 0.0;
    let mut e: f64 = 0.0;

    for _ in 0..max_iter {
        let xm = 0.5 * (a + b);
        let tol1 = tol * x.abs() + ZEPS;
        let tol2 = 2.0 * tol1;
        if (x - xm).abs() <= tol2 - 0.5 * (b - a) {
            return (x, fx);
        }

        let mut golden = true;
        if e.abs() > tol1 {
            // Trial parabola through x, v, w.
            let r = (x - w) * (fx - fv);
            let mut q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            let etemp = e;
            e = d;
            if !(p.abs() >= (0.5 * q * etemp).abs() || p <= q * (a - x) || p >= q * (b - x)) {
                golden = false;
                d = p / q;
                let u = x + d;
                if u - a < tol2 || b - u < tol2 {
                    d = sign(tol1, xm - x);
                }
            }
        }
        if golden {
            e = if x >= xm { a - x } else { b - x };
            d = CGOLD * e;
        }

        let u = if d.abs() >= tol1 { x + d } else { x + sign(tol1, d) };
        let fu = f(u);

        if fu <= fx {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            v = w;
            w = x;
            x = u;
            fv = fw;
            fw = fx;
            fx = fu;
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                w = u;
                fv = fw;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        }
    }

    trace!(x, fx, "brent hit its iteration cap");
    (x, fx)
}

/// Minimize `f` along `direction` from `x` (whose cost is `fx`).
///
/// On success `x` is moved to the minimizing point and the step is returned;
/// the returned cost is exactly `f(x)` at the new `x`. Returns `None` when the
/// direction is degenerate or no strictly lower point was found; `x` is then
/// left untouched.
///
/// # Panics
/// Panics if `direction` or `scratch` differ in length from `x`.
pub fn line_minimize<F>(
    f: &mut F,
    x: &mut [f64],
    direction: &[f64],
    fx: f64,
    scratch: &mut [f64],
    options: &LineSearchOptions,
) -> Option<LineStep>
where
    F: FnMut(&[f64]) -> f64,
{
    assert_eq!(direction.len(), x.len(), "direction length must match the point");
    assert_eq!(scratch.len(), x.len(), "scratch length must match the point");

    if direction.iter().all(|d| *d == 0.0) {
        return None;
    }

    let step = {
        let origin: &[f64] = x;
        let mut along = |alpha: f64| {
            for ((s, xi), di) in scratch.iter_mut().zip(origin).zip(direction) {
                *s = xi + alpha * di;
            }
            let value = f(&*scratch);
            if value.is_nan() { f64::INFINITY } else { value }
        };

        match bracket_minimum(&mut along, 0.0, fx, options.initial_step, options.max_bracket_steps) {
            BracketOutcome::Found(bracket) => {
                let (alpha, cost) = brent(&mut along, &bracket, options.tol, options.max_iter);
                LineStep { alpha, cost }
            }
            BracketOutcome::Unbounded { alpha, value } => {
                trace!(alpha, value, "bracket expansion capped; taking best probe");
                LineStep { alpha, cost: value }
            }
            BracketOutcome::Flat => return None,
        }
    };

    if !(step.cost < fx) || step.alpha == 0.0 {
        return None;
    }

    for (xi, di) in x.iter_mut().zip(direction) {
        *xi += step.alpha * di;
    }
    Some(step)
}

/// `|a|` carrying the sign of `b` (`b = 0` counts as positive).
fn sign(a: f64, b: f64) -> f64 {
    if b >= 0.0 { a.abs() } else { -a.abs() }
}
