//! Starting points for bath fits.
//!
//! - [`initial_bath`]: a symmetric, evenly spread guess over `[-bw, bw]`
//! - [`extend_bath`] / [`grow_bath`]: add one site to an already fitted bath
//!   without making the fit worse, for warm-started sweeps over `nbath`

use num_complex::Complex64;

use crate::error::{FitError, try_buffer};
use crate::fit::cost::Chi2Cost;
use crate::math::KahanSum;
use crate::models::hybridization;

/// Number of trial energies scanned by [`grow_bath`].
const GROW_CANDIDATES: usize = 41;

/// Symmetric initial bath over `[-bandwidth, bandwidth]`.
///
/// Couplings are all `max(0.1, 1/√nbath)`. Energies:
///
/// - `nbath = 1`: `[0]`
/// - `nbath = 2`: `[-bw, bw]`
/// - odd `nbath ≥ 3`: evenly spaced by `bw/(nbath/2)` with a site at `0`
/// - even `nbath ≥ 4`: outer sites spaced by `bw/(nbath/2 - 1)`, the two central
///   sites pinned at `±0.1` so no level sits exactly at zero
pub fn initial_bath(nbath: usize, bandwidth: f64) -> Result<Vec<f64>, FitError> {
    if nbath == 0 {
        return Err(FitError::invalid("nbath must be >= 1"));
    }
    if !(bandwidth.is_finite() && bandwidth > 0.0) {
        return Err(FitError::invalid(format!(
            "initial bandwidth must be finite and > 0 (got {bandwidth})"
        )));
    }

    let len = nbath
        .checked_mul(2)
        .ok_or_else(|| FitError::invalid(format!("nbath too large ({nbath})")))?;
    let mut p = try_buffer("initial bath", len, 0.0)?;
    let (ek, vk) = p.split_at_mut(nbath);

    vk.fill((1.0 / (nbath as f64).sqrt()).max(0.1));

    if nbath == 1 {
        ek[0] = 0.0;
        return Ok(p);
    }

    ek[0] = -bandwidth;
    ek[nbath - 1] = bandwidth;
    let nhalf = nbath / 2;

    if nbath % 2 == 1 {
        let de = bandwidth / nhalf as f64;
        ek[nhalf] = 0.0;
        for i in 1..nhalf {
            ek[i] = -bandwidth + i as f64 * de;
            ek[nbath - i - 1] = bandwidth - i as f64 * de;
        }
    } else if nbath >= 4 {
        let de = bandwidth / (nhalf - 1).max(1) as f64;
        ek[nhalf - 1] = -0.1;
        ek[nhalf] = 0.1;
        for i in 1..nhalf - 1 {
            ek[i] = -bandwidth + i as f64 * de;
            ek[nbath - i - 1] = bandwidth - i as f64 * de;
        }
    }

    Ok(p)
}

/// Append a site at `energy` with coupling `coupling`.
pub fn extend_bath(params: &[f64], energy: f64, coupling: f64) -> Result<Vec<f64>, FitError> {
    if params.len() % 2 != 0 {
        return Err(FitError::invalid(format!(
            "bath parameter vector must have even length (got {})",
            params.len()
        )));
    }
    let nbath = params.len() / 2;
    let mut out = try_buffer("extended bath", params.len() + 2, 0.0)?;
    out[..nbath].copy_from_slice(&params[..nbath]);
    out[nbath] = energy;
    out[nbath + 1..2 * nbath + 1].copy_from_slice(&params[nbath..]);
    out[2 * nbath + 1] = coupling;
    Ok(out)
}

/// Add one site to a fitted bath so that the cost does not increase.
///
/// For a new site `(e, V)` the cost changes by `2V²·s(e) + V⁴·w(e)` with
/// `s(e) = Σ Re[conj(r_n)/(z_n − e)]`, `w(e) = Σ 1/|z_n − e|²` and `r_n` the
/// current residuals. Among evenly spaced energies in `[-bandwidth, bandwidth]`
/// the one with the largest achievable decrease `s²/w` (requires `s < 0`) is
/// used with the optimal `V² = −s/w`. If no trial energy helps, the site is
/// added at `0` with zero coupling, leaving the model unchanged.
pub fn grow_bath(params: &[f64], cost: &Chi2Cost<'_>, bandwidth: f64) -> Result<Vec<f64>, FitError> {
    if !(bandwidth.is_finite() && bandwidth > 0.0) {
        return Err(FitError::invalid(format!(
            "growth bandwidth must be finite and > 0 (got {bandwidth})"
        )));
    }
    if params.len() % 2 != 0 {
        return Err(FitError::invalid(format!(
            "bath parameter vector must have even length (got {})",
            params.len()
        )));
    }

    let z = cost.frequencies();
    let mut residuals = try_buffer("residuals", z.len(), Complex64::new(0.0, 0.0))?;
    for ((r, zn), tn) in residuals.iter_mut().zip(z).zip(cost.target()) {
        *r = hybridization(params, *zn) - tn;
    }

    let current = cost.evaluate(params);
    let mut best: Option<(f64, f64, f64)> = None; // (decrease, energy, coupling)
    for i in 0..GROW_CANDIDATES {
        let u = i as f64 / (GROW_CANDIDATES - 1) as f64;
        let e = -bandwidth + 2.0 * bandwidth * u;

        let mut s = KahanSum::new();
        let mut w = KahanSum::new();
        for (r, zn) in residuals.iter().zip(z) {
            let g = (*zn - e).inv();
            s.add((r.conj() * g).re);
            w.add(g.norm_sqr());
        }
        let (s, w) = (s.total(), w.total());
        if s >= 0.0 || w <= 0.0 {
            continue;
        }
        let decrease = s * s / w;
        if best.is_none_or(|(d, _, _)| decrease > d) {
            best = Some((decrease, e, (-s / w).sqrt()));
        }
    }

    match best {
        Some((decrease, e, v)) if decrease > 1e-12 * current => extend_bath(params, e, v),
        _ => extend_bath(params, 0.0, 0.0),
    }
}
