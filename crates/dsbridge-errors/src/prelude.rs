//! Prelude module for convenient error handling imports.

pub use crate::{
    FilterResult,
    common::ErrorSeverity,
    filter::FilterError,
    transfer::{TransferError, TransferStatus},
};
