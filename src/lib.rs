//! `bath-fit` library crate.
//!
//! The binary (`bathfit`) is a thin wrapper around this library so that:
//!
//! - the fitting engine is testable without spawning processes
//! - `fit_bath` can be called directly from other solvers

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;

pub use error::{AppError, FitError};
pub use fit::{FitOptions, FitOutcome, StopReason, fit_bath};
