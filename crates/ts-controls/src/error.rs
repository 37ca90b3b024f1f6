//! Error types for control system operations.

use thiserror::Error;
use ts_core::TsError;

/// Result type for control system operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur in control system operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// A gain, bias or limit failed its range check.
    #[error("Invalid controller parameter: {0}")]
    InvalidParameter(#[from] TsError),

    /// Output limits are inverted.
    #[error("Invalid output limits: min_output ({min}) must not exceed max_output ({max})")]
    InvalidLimits { min: f64, max: f64 },
}
