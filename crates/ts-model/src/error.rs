//! Error types for process model construction.

use thiserror::Error;
use ts_core::TsError;

/// Errors raised while building a process model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid model parameter: {0}")]
    InvalidParameter(#[from] TsError),
}

pub type ModelResult<T> = Result<T, ModelError>;
