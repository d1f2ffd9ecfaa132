//! Error types for the dsbridge controller filter
//!
//! Every failure in the filter is local to one operation or one command
//! attempt; none of them tears down the device context. The types here give
//! callers enough classification to decide between "log and wait for the
//! next timer tick" and "report back to the host".
//!
//! - [`common`]: severity levels shared by all error types
//! - [`filter`]: the [`FilterError`] taxonomy returned by filter operations
//! - [`transfer`]: completion status of control and data transfers
//!
//! # Example
//!
//! ```
//! use dsbridge_errors::prelude::*;
//!
//! fn copy_descriptor(dst: &mut [u8], src: &[u8]) -> FilterResult<usize> {
//!     if dst.len() < src.len() {
//!         return Err(FilterError::buffer_too_small(src.len(), dst.len()));
//!     }
//!     dst[..src.len()].copy_from_slice(src);
//!     Ok(src.len())
//! }
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod common;
pub mod filter;
pub mod prelude;
pub mod transfer;

pub use common::ErrorSeverity;
pub use filter::FilterError;
pub use transfer::{TransferError, TransferStatus};

/// A specialized `Result` type for filter operations.
pub type FilterResult<T> = std::result::Result<T, FilterError>;
