//! Exit codes for CLI operations following Unix conventions.
//!
//! # Exit Code Semantics
//!
//! - `0`: Success - tests were found
//! - `1`: General error - unspecified failure
//! - `3`: No tests in the parsed file or the searched directories
//! - `4-6`: Specific recoverable errors
//! - `126-255`: Reserved by shell

use crate::error::DiscoveryError;

/// Standard exit codes for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Operation succeeded (code 0)
    Success = 0,

    /// Unspecified error occurred (code 1)
    GeneralError = 1,

    /// Nothing to report but the command ran (code 3)
    NotFound = 3,

    /// File does not parse as PHP (code 4)
    ParseError = 4,

    /// File I/O error (code 5)
    IoError = 5,

    /// Configuration error (code 6)
    ConfigError = 6,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl ExitCode {
    /// Map a `DiscoveryError` to the exit code scripts can branch on.
    pub fn from_error(error: &DiscoveryError) -> Self {
        match error {
            DiscoveryError::Parse { .. } => ExitCode::ParseError,
            DiscoveryError::FileRead { .. }
            | DiscoveryError::FileWrite { .. }
            | DiscoveryError::Walk { .. } => ExitCode::IoError,
            DiscoveryError::ConfigError { .. } => ExitCode::ConfigError,
            DiscoveryError::General(_) => ExitCode::GeneralError,
        }
    }
}
