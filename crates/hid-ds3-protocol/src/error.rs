//! Protocol-level translation errors.

#![deny(static_mut_refs)]

/// Reasons a report cannot be translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Ds3ProtocolError {
    /// Source report is shorter than the fixed layout requires.
    #[error("report too short: need {required} bytes, got {actual}")]
    ReportTooShort { required: usize, actual: usize },

    /// Destination buffer does not match the source length.
    #[error("output buffer length {actual} does not match report length {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}
