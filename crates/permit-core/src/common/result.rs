//! Common Result Type

use super::error::PermitError;

/// Result type used by every fallible operation in the crate.
pub type PermitResult<T> = Result<T, PermitError>;
