//! Hybridization models.
//!
//! - `hybridization`: the discrete-bath model `Σ V_k²/(z − e_k)` and its
//!   parameter derivatives
//! - `target`: reference hybridization functions to fit against

pub mod hybridization;
pub mod target;

pub use hybridization::*;
pub use target::*;
