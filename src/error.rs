//! Error types.
//!
//! - [`FitError`] is the typed error of the fitting engine (library API).
//! - [`AppError`] is what the binary reports: a message plus a process exit code.

use thiserror::Error;

/// Errors surfaced by the fitting engine.
///
/// Numerical degeneracies inside a pass are absorbed by the optimizer and never
/// show up here, and hitting the iteration cap is a normal return
/// (`StopReason::MaxIterations`), not an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// Bad sizes, non-positive temperature, non-finite inputs or options.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// An internal buffer could not be allocated.
    #[error("failed to allocate {what} ({requested} elements)")]
    ResourceExhaustion { what: &'static str, requested: usize },
}

impl FitError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        FitError::InvalidArgument {
            reason: reason.into(),
        }
    }
}

/// Empty vector with room for exactly `len` elements, reporting allocation
/// failure instead of aborting.
pub(crate) fn try_with_capacity<T>(what: &'static str, len: usize) -> Result<Vec<T>, FitError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| FitError::ResourceExhaustion { what, requested: len })?;
    Ok(buf)
}

/// [`try_with_capacity`] filled with `len` copies of `fill`.
pub(crate) fn try_buffer<T: Clone>(what: &'static str, len: usize, fill: T) -> Result<Vec<T>, FitError> {
    let mut buf = try_with_capacity(what, len)?;
    buf.resize(len, fill);
    Ok(buf)
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        let code = match err {
            FitError::InvalidArgument { .. } => 2,
            FitError::ResourceExhaustion { .. } => 3,
        };
        AppError::new(code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
