//! Reference hybridization functions on the Matsubara axis.
//!
//! These produce the values the bath is fitted against. The fitting engine
//! treats them as opaque input data.

use clap::ValueEnum;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{FitError, try_buffer};
use crate::math::matsubara_frequencies;
use crate::models::hybridization_on_grid;

/// Which reference function to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// Semicircular density of states (Bethe lattice).
    Semicircular,
}

impl TargetKind {
    pub fn display_name(self) -> &'static str {
        match self {
            TargetKind::Semicircular => "semicircular",
        }
    }
}

/// `2/D²·(z − √(z² − D²))` for a single point.
///
/// `num_complex`'s principal square root maps `z² − D² = −(ω² + D²) + 0i` to
/// `+i·√(ω² + D²)`, so for `z = iω` with `ω > 0` the result has negative
/// imaginary part and decays like `1/z`. With `D = 1` the arithmetic is exactly
/// `2·(z − √(z² − 1))`.
pub fn semicircular_hybridization(z: Complex64, half_bandwidth: f64) -> Complex64 {
    let d2 = half_bandwidth * half_bandwidth;
    (2.0 / d2) * (z - (z * z - d2).sqrt())
}

/// Semicircular target sampled on the first `nmats` Matsubara frequencies.
pub fn semicircular_target(nmats: usize, beta: f64, half_bandwidth: f64) -> Result<Vec<Complex64>, FitError> {
    if !(half_bandwidth.is_finite() && half_bandwidth > 0.0) {
        return Err(FitError::invalid(format!(
            "half bandwidth must be finite and > 0 (got {half_bandwidth})"
        )));
    }
    let z = matsubara_frequencies(nmats, beta)?;
    Ok(z.into_iter()
        .map(|zn| semicircular_hybridization(zn, half_bandwidth))
        .collect())
}

/// Target generated by a known bath, for self-consistency checks.
pub fn bath_target(params: &[f64], nbath: usize, nmats: usize, beta: f64) -> Result<Vec<Complex64>, FitError> {
    if nbath == 0 {
        return Err(FitError::invalid("nbath must be >= 1"));
    }
    let expected = nbath
        .checked_mul(2)
        .ok_or_else(|| FitError::invalid(format!("nbath too large ({nbath})")))?;
    if params.len() != expected {
        return Err(FitError::invalid(format!(
            "bath parameters must have length 2*nbath = {expected} (got {})",
            params.len()
        )));
    }
    let z = matsubara_frequencies(nmats, beta)?;
    let mut out = try_buffer("bath target", nmats, Complex64::new(0.0, 0.0))?;
    hybridization_on_grid(params, &z, &mut out);
    Ok(out)
}
