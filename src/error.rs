//! Error Handling Infrastructure
//!
//! This module defines all error types used throughout conninfo-parse.
//! Every error maps to a stable error code and to a process exit status.
//!
//! # Error Categories
//! - `Usage`: Malformed command invocation (bad flags, missing input, empty delimiter)
//! - `Parse`: The conninfo string violates the grammar or names an unknown keyword
//! - `Unavailable`: The requested output format is not available in this build
//! - `Config`: A parameter catalog was built with conflicting entries

use thiserror::Error;

/// Exit statuses, adapted from `sysexits.h`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Successful invocation
    Ok = 0,
    /// Parse or runtime error
    Error = 1,
    /// Command-line usage error (`EX_USAGE`)
    Usage = 64,
    /// Requested feature not available (`EX_UNAVAILABLE`)
    Unavailable = 69,
}

impl ExitStatus {
    /// Numeric process exit code
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Main error type for conninfo-parse operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConninfoError {
    /// Malformed command invocation
    #[error("{0}")]
    Usage(String),

    /// The conninfo string could not be parsed
    #[error("{message}{}", position_suffix(.position))]
    Parse {
        /// Human-readable description of the problem
        message: String,
        /// 0-based character offset into the input, when one could be derived
        position: Option<usize>,
    },

    /// Requested output format is not available
    #[error("{0}")]
    Unavailable(String),

    /// Invalid parameter catalog
    #[error("Configuration error: {0}")]
    Config(String),
}

fn position_suffix(position: &Option<usize>) -> String {
    position.map_or_else(String::new, |offset| format!(" (at offset {offset})"))
}

impl ConninfoError {
    /// Convert error to error code string
    ///
    /// Error codes are stable and suitable for programmatic handling.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Usage(_) => "USAGE",
            Self::Parse { .. } => "PARSE_ERROR",
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Process exit status for this error
    #[must_use]
    pub const fn exit_status(&self) -> ExitStatus {
        match self {
            Self::Usage(_) => ExitStatus::Usage,
            Self::Unavailable(_) => ExitStatus::Unavailable,
            Self::Parse { .. } | Self::Config(_) => ExitStatus::Error,
        }
    }

    /// Get human-readable error message
    ///
    /// Keyword/value messages name keywords only; URI messages may quote the
    /// offending component.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Character offset attached to a parse error, if any
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        match self {
            Self::Parse { position, .. } => *position,
            _ => None,
        }
    }

    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Create a parse error without position information
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            position: None,
        }
    }

    /// Create a parse error pointing at a character offset in the input
    pub fn parse_at(message: impl Into<String>, position: usize) -> Self {
        Self::Parse {
            message: message.into(),
            position: Some(position),
        }
    }

    /// Create an unavailable-feature error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type alias for conninfo-parse operations
pub type Result<T> = std::result::Result<T, ConninfoError>;
