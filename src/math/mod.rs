//! Mathematical utilities: the Matsubara frequency grid and compensated summation.

pub mod matsubara;
pub mod summation;

pub use matsubara::*;
pub use summation::*;
