//! End-to-end checks of the public fitting API.

use bath_fit::fit::{Chi2Cost, FitOptions, StopReason, SweepSpec, fit_bath, initial_bath, sweep_nbath};
use bath_fit::math::matsubara_frequencies;
use bath_fit::models::{bath_target, semicircular_target};

fn cost_of(params: &[f64], nmats: usize, beta: f64, target: &[num_complex::Complex64]) -> f64 {
    let z = matsubara_frequencies(nmats, beta).unwrap();
    Chi2Cost::new(&z, target).unwrap().evaluate(params)
}

#[test]
fn eight_site_semicircular_fit() {
    let (nbath, nmats, beta) = (8, 3000, 70.0);
    let target = semicircular_target(nmats, beta, 1.0).unwrap();
    let zero_cost = cost_of(&vec![0.0; 2 * nbath], nmats, beta, &target);

    let mut params = initial_bath(nbath, 2.0).unwrap();
    let initial_cost = cost_of(&params, nmats, beta, &target);
    let options = FitOptions { max_iter: 30, ..FitOptions::default() };
    let out = fit_bath(&mut params, nbath, nmats, &target, beta, &options).unwrap();

    assert!(out.iterations >= 1 && out.iterations <= 30);
    assert!(out.cost <= initial_cost);
    assert!(out.cost * 100.0 <= zero_cost, "cost {} vs zero guess {}", out.cost, zero_cost);
    assert!(params.iter().all(|p| p.is_finite()));
    assert_eq!(out.cost, cost_of(&params, nmats, beta, &target));
    assert!(out.history.windows(2).all(|w| w[1] <= w[0]));
}

#[test]
fn recovers_a_generating_bath() {
    let truth = [-1.2, 0.1, 0.9, 0.4, 0.6, 0.5];
    let (nmats, beta) = (500, 50.0);
    let target = bath_target(&truth, 3, nmats, beta).unwrap();

    let mut params = vec![-1.1, 0.0, 1.0, 0.5, 0.5, 0.5];
    let options = FitOptions { abs_tol: 1e-12, max_iter: 400, ..FitOptions::default() };
    let out = fit_bath(&mut params, 3, nmats, &target, beta, &options).unwrap();

    assert!(out.cost < 1e-6, "cost {}", out.cost);
}

#[test]
fn repeated_fits_are_bit_identical() {
    let (nbath, nmats, beta) = (4, 400, 30.0);
    let target = semicircular_target(nmats, beta, 1.0).unwrap();
    let options = FitOptions { max_iter: 40, ..FitOptions::default() };

    let mut a = initial_bath(nbath, 2.0).unwrap();
    let mut b = a.clone();
    let out_a = fit_bath(&mut a, nbath, nmats, &target, beta, &options).unwrap();
    let out_b = fit_bath(&mut b, nbath, nmats, &target, beta, &options).unwrap();

    assert_eq!(a.iter().map(|v| v.to_bits()).collect::<Vec<_>>(), b.iter().map(|v| v.to_bits()).collect::<Vec<_>>());
    assert_eq!(out_a, out_b);
}

#[test]
fn single_site_single_frequency() {
    let target = semicircular_target(1, 10.0, 1.0).unwrap();
    let mut params = initial_bath(1, 2.0).unwrap();
    let start = cost_of(&params, 1, 10.0, &target);
    let out = fit_bath(&mut params, 1, 1, &target, 10.0, &FitOptions::default()).unwrap();

    assert!(params.iter().all(|p| p.is_finite()));
    assert!(out.cost <= start);
    assert!(out.iterations <= FitOptions::default().max_iter);
    assert_eq!(out.cost, cost_of(&params, 1, 10.0, &target));
}

#[test]
fn warm_started_larger_baths_never_fit_worse() {
    let spec = SweepSpec {
        nbath_min: 1,
        nbath_max: 4,
        nmats: 300,
        beta: 30.0,
        bandwidth: 1.0,
        warm_start: true,
    };
    let target = semicircular_target(spec.nmats, spec.beta, 1.0).unwrap();
    let entries = sweep_nbath(&spec, &target, &FitOptions { max_iter: 60, ..FitOptions::default() }).unwrap();

    assert_eq!(entries.iter().map(|e| e.nbath).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    for pair in entries.windows(2) {
        assert!(
            pair[1].outcome.cost <= pair[0].outcome.cost,
            "nbath {} cost {} > nbath {} cost {}",
            pair[1].nbath,
            pair[1].outcome.cost,
            pair[0].nbath,
            pair[0].outcome.cost
        );
    }
}

#[test]
fn iteration_cap_returns_best_point_without_error() {
    let (nbath, nmats, beta) = (4, 300, 30.0);
    let target = semicircular_target(nmats, beta, 1.0).unwrap();
    let mut params = initial_bath(nbath, 2.0).unwrap();
    let start = cost_of(&params, nmats, beta, &target);
    let options = FitOptions { max_iter: 3, ..FitOptions::default() };
    let out = fit_bath(&mut params, nbath, nmats, &target, beta, &options).unwrap();

    assert_eq!(out.iterations, 3);
    assert_eq!(out.stop_reason, StopReason::MaxIterations);
    assert!(!out.converged());
    assert!(out.cost < start);
    assert_eq!(out.cost, cost_of(&params, nmats, beta, &target));
}

#[test]
fn exact_guess_is_returned_unchanged() {
    let truth = [-0.5, 0.5, 0.3, 0.3];
    let target = bath_target(&truth, 2, 64, 16.0).unwrap();
    let mut params = truth.to_vec();
    let out = fit_bath(&mut params, 2, 64, &target, 16.0, &FitOptions::default()).unwrap();
    assert_eq!(out.iterations, 0);
    assert_eq!(out.stop_reason, StopReason::ExactFit);
    assert_eq!(params, truth.to_vec());
}
