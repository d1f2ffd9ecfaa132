//! Errors returned by filter operations.

use crate::common::ErrorSeverity;
use crate::transfer::TransferError;

/// Failure of a single filter operation or command attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// No handler exists for the device's protocol variant
    #[error("operation not implemented for device type {variant}")]
    UnsupportedVariant {
        /// Name of the device type
        variant: &'static str,
    },

    /// Destination or source buffer is shorter than the operation needs
    #[error("buffer too small: need {required} bytes, got {actual}")]
    BufferTooSmall {
        /// Bytes required
        required: usize,
        /// Bytes supplied
        actual: usize,
    },

    /// Report contents could not be translated
    #[error("invalid report: {0}")]
    InvalidReport(String),

    /// Transfer buffer for a command could not be allocated
    #[error("failed to allocate {bytes} byte transfer buffer")]
    AllocationFailed {
        /// Requested buffer size
        bytes: usize,
    },

    /// Control request could not be formatted
    #[error("failed to format control request: {0}")]
    FormattingFailed(String),

    /// Transport refused to accept the request
    #[error("failed to submit request: {0}")]
    SubmitFailed(#[source] TransferError),

    /// Transport completed the request with a failure
    #[error("transfer failed: {0}")]
    Transfer(#[from] TransferError),

    /// Virtual-controller backend rejected a report
    #[error("virtual pad error: {0}")]
    VirtualPad(String),

    /// Timers were requested outside an async runtime
    #[error("no async runtime available: {0}")]
    RuntimeUnavailable(String),
}

impl FilterError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            FilterError::UnsupportedVariant { .. } => ErrorSeverity::Info,
            FilterError::BufferTooSmall { .. } => ErrorSeverity::Error,
            FilterError::InvalidReport(_) => ErrorSeverity::Warning,
            FilterError::AllocationFailed { .. } => ErrorSeverity::Warning,
            FilterError::FormattingFailed(_) => ErrorSeverity::Warning,
            FilterError::SubmitFailed(e) | FilterError::Transfer(e) => e.severity(),
            FilterError::VirtualPad(_) => ErrorSeverity::Warning,
            FilterError::RuntimeUnavailable(_) => ErrorSeverity::Critical,
        }
    }

    /// Check if the next timer tick may succeed where this attempt failed.
    ///
    /// Unsupported variants and undersized buffers never change between
    /// attempts, so they are not retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            FilterError::UnsupportedVariant { .. } | FilterError::BufferTooSmall { .. } => false,
            FilterError::InvalidReport(_) => false,
            FilterError::AllocationFailed { .. } | FilterError::FormattingFailed(_) => true,
            FilterError::SubmitFailed(e) | FilterError::Transfer(e) => e.is_retryable(),
            FilterError::VirtualPad(_) => true,
            FilterError::RuntimeUnavailable(_) => false,
        }
    }

    /// Create an unsupported variant error.
    pub fn unsupported(variant: &'static str) -> Self {
        FilterError::UnsupportedVariant { variant }
    }

    /// Create a buffer too small error.
    pub fn buffer_too_small(required: usize, actual: usize) -> Self {
        FilterError::BufferTooSmall { required, actual }
    }
}
