//! Least-squares objective on the Matsubara grid.
//!
//! ```text
//! C(p) = Σ_n |Δ_p(z_n) − Δ_target(z_n)|²
//! ```
//!
//! The sum runs over thousands of points whose residuals shrink like `1/ω_n`,
//! so it is accumulated with compensated summation.

use num_complex::Complex64;

use crate::error::{FitError, try_buffer};
use crate::math::KahanSum;
use crate::models::{hybridization, hybridization_derivatives};

/// Objective bound to one frequency grid and one target.
#[derive(Debug, Clone, Copy)]
pub struct Chi2Cost<'a> {
    z: &'a [Complex64],
    target: &'a [Complex64],
}

impl<'a> Chi2Cost<'a> {
    /// Bind a grid and an index-aligned target.
    pub fn new(z: &'a [Complex64], target: &'a [Complex64]) -> Result<Self, FitError> {
        if z.is_empty() {
            return Err(FitError::invalid("frequency grid is empty"));
        }
        if z.len() != target.len() {
            return Err(FitError::invalid(format!(
                "target length {} does not match frequency count {}",
                target.len(),
                z.len()
            )));
        }
        Ok(Self { z, target })
    }

    pub fn nmats(&self) -> usize {
        self.z.len()
    }

    pub fn frequencies(&self) -> &'a [Complex64] {
        self.z
    }

    pub fn target(&self) -> &'a [Complex64] {
        self.target
    }

    /// Sum of squared residual magnitudes. Never negative.
    ///
    /// # Panics
    /// Panics if `params` has odd length.
    pub fn evaluate(&self, params: &[f64]) -> f64 {
        self.z
            .iter()
            .zip(self.target)
            .map(|(zn, tn)| (hybridization(params, *zn) - tn).norm_sqr())
            .collect::<KahanSum>()
            .total()
    }

    /// Root-mean-square residual magnitude, `sqrt(C / nmats)`.
    ///
    /// # Panics
    /// Panics if `params` has odd length.
    pub fn residual_rms(&self, params: &[f64]) -> f64 {
        (self.evaluate(params) / self.nmats() as f64).sqrt()
    }

    /// Analytic gradient of [`evaluate`](Self::evaluate):
    /// `∂C/∂p_j = 2·Σ_n Re[conj(r_n)·∂Δ(z_n)/∂p_j]` with `r_n = Δ_p(z_n) − Δ_target(z_n)`.
    ///
    /// # Panics
    /// Panics if `out.len() != params.len()` or `params` has odd length.
    pub fn gradient(&self, params: &[f64], out: &mut [f64]) -> Result<(), FitError> {
        assert_eq!(out.len(), params.len(), "gradient buffer must match parameter length");
        let mut dmodel = try_buffer("model derivatives", params.len(), Complex64::new(0.0, 0.0))?;
        let mut acc = try_buffer("gradient accumulators", params.len(), KahanSum::new())?;

        for (zn, tn) in self.z.iter().zip(self.target) {
            let r = hybridization(params, *zn) - tn;
            hybridization_derivatives(params, *zn, &mut dmodel);
            for (a, d) in acc.iter_mut().zip(&dmodel) {
                a.add(2.0 * (r.conj() * d).re);
            }
        }

        for (o, a) in out.iter_mut().zip(&acc) {
            *o = a.total();
        }
        Ok(())
    }

    /// Euclidean norm of the analytic gradient.
    pub fn gradient_norm(&self, params: &[f64]) -> Result<f64, FitError> {
        let mut g = try_buffer("gradient", params.len(), 0.0)?;
        self.gradient(params, &mut g)?;
        Ok(g.iter().map(|v| v * v).sum::<f64>().sqrt())
    }
}
