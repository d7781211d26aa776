//! Bath fitting.
//!
//! Responsibilities:
//!
//! - least-squares objective on the Matsubara grid (`cost`)
//! - line minimization and Powell's direction-set method (`line_search`, `powell`)
//! - stopping rules (`convergence`)
//! - starting points and bath growth (`initial`)
//! - single fits and sweeps over bath sizes (`fitter`, `sweep`)

pub mod convergence;
pub mod cost;
pub mod fitter;
pub mod initial;
pub mod line_search;
pub mod powell;
pub mod sweep;

pub use convergence::*;
pub use cost::*;
pub use fitter::*;
pub use initial::*;
pub use line_search::*;
pub use powell::*;
pub use sweep::*;
