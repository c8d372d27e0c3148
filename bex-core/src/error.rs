//! Error types for BIOS extraction.
//!
//! Only fatal conditions live here. Per-module failures (bad signature,
//! buffer overrun, unknown compression, output write failure) never abort
//! the chain walk; they are recorded as [`ModuleStatus`](crate::ModuleStatus)
//! values on the extraction report instead.

use thiserror::Error;

/// Errors that abort an extraction run.
#[derive(Error, Debug)]
pub enum BiosError {
    #[error("image length {0} is not a power of two")]
    InvalidImageLength(usize),

    #[error("failed to locate BCPSYS identifier record")]
    AnchorNotFound,

    #[error("retrieved invalid modules offset")]
    InvalidModulesOffset,

    #[error("Phoenix TrustedCore images are not supported")]
    UnsupportedFormat,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for BIOS extraction operations.
pub type BiosResult<T> = Result<T, BiosError>;
