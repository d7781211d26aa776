//! Domain types used by the binary pipeline.
//!
//! This module defines:
//!
//! - resolved run configuration (`FitConfig`, `SweepConfig`)
//! - serializable run summaries (`FitSummary`, `SweepSummary`, `BathSite`)

pub mod types;

pub use types::*;
