//! Error types for image operations.

use thiserror::Error;

/// Error type for image operations.
///
/// Every variant is raised by a precondition check, before any buffer is
/// allocated or any parallel work starts.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Non-positive target size, or an empty source buffer.
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    /// Convolution matrix not square with odd size, or a custom filter
    /// support that is not a positive finite number.
    #[error("invalid kernel: {0}")]
    InvalidKernel(String),

    /// Edge handling name not recognized.
    #[error("unsupported edge policy: {0}")]
    UnsupportedEdgePolicy(String),

    /// Invalid parameter value (non-finite sigma, unknown filter name, ...).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Buffer construction failed.
    #[error(transparent)]
    Core(#[from] pxl_core::Error),
}

/// Result type for image operations.
pub type OpsResult<T> = Result<T, OpsError>;
