//! Completion status of USB transfers.
//!
//! The transport reports the outcome of every control or data transfer
//! asynchronously. A successful completion carries the number of bytes
//! transferred.

use crate::common::ErrorSeverity;

/// Outcome of a transfer as seen by a completion routine.
pub type TransferStatus = std::result::Result<usize, TransferError>;

/// Failure reported by the transport for a single transfer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    /// The device stalled the endpoint
    #[error("endpoint stalled")]
    Stalled,

    /// The transfer was cancelled before it completed
    #[error("transfer cancelled")]
    Cancelled,

    /// The device was removed while the transfer was pending
    #[error("device removed")]
    DeviceRemoved,

    /// The transport has no capacity for another request
    #[error("transport busy")]
    Busy,

    /// Any other transport failure
    #[error("transport error: {0}")]
    Io(String),
}

impl TransferError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TransferError::Stalled => ErrorSeverity::Warning,
            TransferError::Cancelled => ErrorSeverity::Info,
            TransferError::DeviceRemoved => ErrorSeverity::Critical,
            TransferError::Busy => ErrorSeverity::Warning,
            TransferError::Io(_) => ErrorSeverity::Error,
        }
    }

    /// Check if a later attempt of the same command might succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TransferError::DeviceRemoved)
    }

    /// Create an I/O error from a message.
    pub fn io(message: impl Into<String>) -> Self {
        TransferError::Io(message.into())
    }
}
