//! Output Capabilities
//!
//! Which output formats this build can produce. Capabilities are plain
//! runtime values so that a missing format fails fast with an
//! `Unavailable` error (exit status 69) before any parsing happens.
//!
//! The `json` cargo feature (enabled by default) controls JSON availability
//! in [`Capabilities::detect`]. The JSON renderer itself is always compiled.

use serde::Serialize;

use crate::error::{ConninfoError, Result};

/// Output formats that can be requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// `keyword<delimiter>value` lines
    Delimited,
    /// `keyword='value'` shell assignments
    Shell,
    /// Single JSON object
    Json,
}

impl Format {
    /// Format name as a string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Delimited => "delimited",
            Self::Shell => "shell",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output formats available in this build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// JSON output support
    pub json: bool,
}

impl Capabilities {
    /// Capabilities compiled into this binary
    #[must_use]
    pub const fn detect() -> Self {
        Self {
            json: cfg!(feature = "json"),
        }
    }

    /// Capabilities with every optional format disabled
    #[must_use]
    pub const fn minimal() -> Self {
        Self { json: false }
    }

    /// Whether `format` can be produced
    #[must_use]
    pub const fn supports(&self, format: Format) -> bool {
        match format {
            Format::Delimited | Format::Shell => true,
            Format::Json => self.json,
        }
    }

    /// Reject formats this build cannot produce
    pub fn require(&self, format: Format) -> Result<()> {
        if self.supports(format) {
            Ok(())
        } else {
            let name = match format {
                Format::Json => "JSON",
                Format::Delimited | Format::Shell => format.as_str(),
            };
            Err(ConninfoError::unavailable(format!("{name} support not available")))
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::detect()
    }
}
