//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fitting code stays free of presentation concerns
//! - output changes are localized (the tests below pin the layout)

use crate::domain::{FitSummary, SweepSummary};
use crate::math::matsubara_omega;
use crate::models::BathView;

/// Format the full fit report (setup, diagnostics, fitted sites).
pub fn format_fit_summary(summary: &FitSummary) -> String {
    let mut out = String::new();
    let outcome = &summary.outcome;

    out.push_str("=== bathfit - Matsubara bath fit ===\n");
    out.push_str(&format!(
        "Target: {} (D={:.3})\n",
        summary.target.display_name(),
        summary.half_bandwidth
    ));
    out.push_str(&format!(
        "Grid: nmats={} | beta={:.3} | omega_max={:.3}\n",
        summary.nmats,
        summary.beta,
        matsubara_omega(summary.nmats.saturating_sub(1), summary.beta)
    ));
    out.push_str(&format!("Bath: nbath={}\n", summary.nbath));

    out.push('\n');
    out.push_str(&format!("Fit completed with {} iterations.\n", outcome.iterations));
    out.push_str(&format!("Stop: {}\n", outcome.stop_reason.display_name()));
    out.push_str(&format!("Cost: {:.6}\n", outcome.cost));
    out.push_str(&format!("RMS residual: {:.3e}\n", outcome.residual_rms));
    out.push_str(&format!("Gradient norm: {:.3e}\n", outcome.gradient_norm));
    out.push_str(&format!(
        "Evaluations: {} (skipped directions: {})\n",
        outcome.evaluations, outcome.skipped_directions
    ));

    out.push_str("\nBath sites:\n");
    out.push_str(&format_site_table(&summary.params));
    out.push('\n');
    out.push_str(&format!("Parameters: {}\n", format_parameters(&summary.params)));

    out
}

/// Space-separated parameter vector with six decimals.
pub fn format_parameters(params: &[f64]) -> String {
    let parts: Vec<String> = params.iter().map(|x| format!("{x:.6}")).collect();
    parts.join(" ")
}

/// One row per bath size.
pub fn format_sweep_table(summary: &SweepSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Sweep: {} | nmats={} | beta={:.3} | {}\n",
        summary.target.display_name(),
        summary.nmats,
        summary.beta,
        if summary.warm_start { "warm start" } else { "independent" }
    ));

    out.push_str(
        format!(
            "{:>6} {:>6} {:>14} {:>12} {:<22}\n",
            "nbath", "iters", "cost", "rms", "stop"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<6} {:-<6} {:-<14} {:-<12} {:-<22}\n", "", "", "", "", "").trim_end());
    out.push('\n');

    for e in &summary.entries {
        out.push_str(
            format!(
                "{:>6} {:>6} {:>14.6e} {:>12.3e} {:<22}\n",
                e.nbath,
                e.outcome.iterations,
                e.outcome.cost,
                e.outcome.residual_rms,
                e.outcome.stop_reason.display_name()
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn format_site_table(params: &[f64]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:>4} {:>12} {:>12}\n", "k", "energy", "coupling").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<4} {:-<12} {:-<12}\n", "", "", "").trim_end());
    out.push('\n');

    for (k, (e, v)) in BathView::new(params).sites().enumerate() {
        out.push_str(&format!("{k:>4} {e:>12.6} {v:>12.6}\n"));
    }
    out
}
