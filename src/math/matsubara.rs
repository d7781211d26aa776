//! Fermionic Matsubara frequency grid.
//!
//! The sampled points are purely imaginary:
//!
//! ```text
//! z_n = i·ω_n,   ω_n = (2n + 1)·π / β,   n = 0..nmats-1
//! ```
//!
//! The grid is index-aligned with the target hybridization values, so order
//! matters and is always ascending in `n`.

use num_complex::Complex64;

use crate::error::{FitError, try_buffer};

pub use std::f64::consts::PI;

/// Positive fermionic Matsubara frequency `ω_n` (real number).
pub fn matsubara_omega(n: usize, beta: f64) -> f64 {
    (2 * n + 1) as f64 * PI / beta
}

/// Build the imaginary-axis sample points `i·ω_n` for `n = 0..nmats`.
pub fn matsubara_frequencies(nmats: usize, beta: f64) -> Result<Vec<Complex64>, FitError> {
    if nmats == 0 {
        return Err(FitError::invalid("nmats must be >= 1"));
    }
    if !(beta.is_finite() && beta > 0.0) {
        return Err(FitError::invalid(format!(
            "beta must be finite and > 0 (got {beta})"
        )));
    }

    let mut z = try_buffer("matsubara grid", nmats, Complex64::new(0.0, 0.0))?;
    for (n, zn) in z.iter_mut().enumerate() {
        *zn = Complex64::new(0.0, matsubara_omega(n, beta));
    }
    Ok(z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn grid_is_odd_multiples_of_pi_over_beta() {
        let beta = 10.0;
        let z = matsubara_frequencies(4, beta).unwrap();
        assert_eq!(z.len(), 4);
        for (n, zn) in z.iter().enumerate() {
            assert_eq!(zn.re, 0.0);
            assert_relative_eq!(zn.im, (2 * n + 1) as f64 * PI / beta, max_relative = 1e-15);
        }
    }

    #[test]
    fn grid_is_strictly_increasing() {
        let z = matsubara_frequencies(50, 70.0).unwrap();
        assert!(z.windows(2).all(|w| w[1].im > w[0].im));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(matsubara_frequencies(0, 1.0).is_err());
        assert!(matsubara_frequencies(3, 0.0).is_err());
        assert!(matsubara_frequencies(3, -2.0).is_err());
        assert!(matsubara_frequencies(3, f64::NAN).is_err());
    }
}
