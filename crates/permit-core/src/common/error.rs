//! Common Error Types
//!
//! Error handling with process exit status mapping.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Process exit statuses
///
/// A child's own status is propagated verbatim in launch mode and never
/// passes through this table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// No manifest candidate exists, or the one that does lacks the entry
    ManifestNotFound = 1,
    /// Invalid environment configuration
    Config = 2,
    /// The runtime executable could not be started
    SpawnFailed = 127,
    /// Any other I/O failure
    Io = 3,
}

impl ErrorCode {
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

/// Errors that abort a reconciliation pass
#[derive(Debug, Error)]
pub enum PermitError {
    #[error("No permissions found in manifest")]
    ManifestNotFound,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to spawn {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl PermitError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            PermitError::ManifestNotFound => ErrorCode::ManifestNotFound,
            PermitError::Config(_) => ErrorCode::Config,
            PermitError::Spawn { .. } => ErrorCode::SpawnFailed,
            PermitError::Io(_) => ErrorCode::Io,
        }
    }

    /// Exit status the process should terminate with
    pub fn exit_code(&self) -> i32 {
        self.error_code().code()
    }
}

/// Why a single manifest candidate was skipped
///
/// Never fatal: the resolver logs it and moves on to the next candidate.
#[derive(Debug, Error)]
pub enum ManifestLoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is too large ({size} bytes, max {max})", .path.display())]
    TooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid permissions in {}: {message}", .path.display())]
    Decode { path: PathBuf, message: String },
}
