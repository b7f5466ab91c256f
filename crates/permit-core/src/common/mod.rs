//! Common Utilities
//!
//! Shared error types, path resolution and token interpolation used across the crate.

pub mod error;
pub mod interpolation;
pub mod paths;
pub mod result;

pub use error::{ErrorCode, ManifestLoadError, PermitError};
pub use interpolation::{resolve_token, CACHE_PATH_TOKEN, EXEC_PATH_TOKEN};
pub use paths::{default_cache_dir, default_exec_path, deno_dir};
pub use result::PermitResult;
