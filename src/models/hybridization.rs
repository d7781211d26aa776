//! Discrete-bath hybridization model.
//!
//! A bath of `nbath` sites with on-site energies `e_k` and couplings `V_k`
//! produces the hybridization function
//!
//! ```text
//! Δ(z) = Σ_k V_k² / (z − e_k)
//! ```
//!
//! Parameter vectors use a *blocked* layout of length `2·nbath`:
//!
//! ```text
//! [e_0, e_1, …, e_{nbath-1}, V_0, V_1, …, V_{nbath-1}]
//! ```
//!
//! On the Matsubara axis `z` is purely imaginary while every `e_k` is real, so
//! `z − e_k` never vanishes and the model is finite everywhere it is sampled.

use num_complex::Complex64;

/// Read-only view of a blocked bath parameter vector.
#[derive(Debug, Clone, Copy)]
pub struct BathView<'a> {
    params: &'a [f64],
}

impl<'a> BathView<'a> {
    /// Wrap a parameter slice.
    ///
    /// # Panics
    /// Panics if `params` has odd length. Callers validate sizes up front.
    pub fn new(params: &'a [f64]) -> Self {
        assert!(
            params.len() % 2 == 0,
            "bath parameter vector must have even length, got {}",
            params.len()
        );
        Self { params }
    }

    pub fn nbath(&self) -> usize {
        self.params.len() / 2
    }

    /// `(e_k, V_k)` pairs in site order.
    pub fn sites(&self) -> impl Iterator<Item = (f64, f64)> + 'a {
        let n = self.nbath();
        let params = self.params;
        (0..n).map(move |k| (params[k], params[n + k]))
    }
}

/// Evaluate `Δ(z)` for one frequency point.
///
/// # Panics
/// Panics if `params` has odd length.
pub fn hybridization(params: &[f64], z: Complex64) -> Complex64 {
    BathView::new(params)
        .sites()
        .map(|(e, v)| v * v / (z - e))
        .sum()
}

/// Evaluate `Δ(z_n)` for every point of `z`, writing into `out`.
///
/// # Panics
/// Panics if `out.len() != z.len()` or `params` has odd length.
pub fn hybridization_on_grid(params: &[f64], z: &[Complex64], out: &mut [Complex64]) {
    assert_eq!(z.len(), out.len(), "output length must match the frequency grid");
    for (zn, o) in z.iter().zip(out.iter_mut()) {
        *o = hybridization(params, *zn);
    }
}

/// Partial derivatives of `Δ(z)` with respect to every parameter, in the same
/// blocked layout as `params`:
///
/// - `∂Δ/∂e_k = V_k² / (z − e_k)²`
/// - `∂Δ/∂V_k = 2·V_k / (z − e_k)`
///
/// # Panics
/// Panics if `out.len() != params.len()`.
pub fn hybridization_derivatives(params: &[f64], z: Complex64, out: &mut [Complex64]) {
    assert_eq!(out.len(), params.len(), "derivative buffer must match parameter length");
    let bath = BathView::new(params);
    let n = bath.nbath();
    for (k, (e, v)) in bath.sites().enumerate() {
        let inv = (z - e).inv();
        out[k] = v * v * inv * inv;
        out[n + k] = 2.0 * v * inv;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn single_site_matches_closed_form() {
        // V²/(iω − e) = V²(−e − iω)/(e² + ω²)
        let params = [0.5, 2.0];
        let z = Complex64::new(0.0, 1.5);
        let d = hybridization(&params, z);
        let denom = 0.25 + 2.25;
        assert_relative_eq!(d.re, -4.0 * 0.5 / denom, max_relative = 1e-14);
        assert_relative_eq!(d.im, -4.0 * 1.5 / denom, max_relative = 1e-14);
    }

    #[test]
    fn coupling_sign_does_not_matter() {
        let z = Complex64::new(0.0, 0.7);
        let a = hybridization(&[-1.0, 1.0, 0.3, 0.4], z);
        let b = hybridization(&[-1.0, 1.0, -0.3, -0.4], z);
        assert_eq!(a, b);
    }

    #[test]
    fn imaginary_part_is_negative_on_upper_half_axis() {
        let params = [-2.0, 0.0, 2.0, 0.3, 0.5, 0.3];
        for k in 0..20 {
            let z = Complex64::new(0.0, 0.1 + k as f64);
            assert!(hybridization(&params, z).im < 0.0);
        }
    }

    #[test]
    fn derivatives_match_finite_differences() {
        let params = [-0.7, 0.4, 0.6, 0.25];
        let z = Complex64::new(0.0, 0.9);
        let mut analytic = [Complex64::new(0.0, 0.0); 4];
        hybridization_derivatives(&params, z, &mut analytic);

        let h = 1e-6;
        for j in 0..params.len() {
            let mut up = params;
            let mut dn = params;
            up[j] += h;
            dn[j] -= h;
            let fd = (hybridization(&up, z) - hybridization(&dn, z)) / (2.0 * h);
            assert!((fd - analytic[j]).norm() < 1e-8, "param {j}: fd={fd} analytic={}", analytic[j]);
        }
    }

    #[test]
    #[should_panic(expected = "even length")]
    fn odd_parameter_vector_panics() {
        hybridization(&[0.0, 1.0, 2.0], Complex64::new(0.0, 1.0));
    }

    #[test]
    fn view_splits_blocked_layout() {
        let params = [1.0, 2.0, 3.0, 10.0, 20.0, 30.0];
        let view = BathView::new(&params);
        assert_eq!(view.nbath(), 3);
        let sites: Vec<_> = view.sites().collect();
        assert_eq!(sites, vec![(1.0, 10.0), (2.0, 20.0), (3.0, 30.0)]);
    }
}
