//! Output Renderers
//!
//! Renderers turn a resolved parameter sequence into text. Only parameters
//! with a value are rendered; absent ones are skipped in every format.
//!
//! # Formats
//! - Delimited: `keyword<delimiter>value\n`, catalog order (default delimiter `\t`)
//! - Shell: `keyword='value'\n`, each embedded `'` written as `'\''`
//! - JSON: `{"keyword":"value",...}\n`, member order unspecified

use serde_json::{Map, Value};

use crate::capability::{Capabilities, Format};
use crate::config::ParsedParameter;
use crate::error::{ConninfoError, Result};

/// Delimiter used when none is given
pub const DEFAULT_DELIMITER: &str = "\t";

/// Text renderer for a resolved parameter sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Renderer {
    /// One `keyword<delimiter>value` line per parameter
    Delimited {
        /// Column delimiter, never empty
        delimiter: String,
    },
    /// One shell assignment per parameter
    Shell,
    /// A single JSON object
    Json,
}

impl Renderer {
    /// Delimited renderer; an empty delimiter is a usage error
    pub fn delimited(delimiter: impl Into<String>) -> Result<Self> {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(ConninfoError::usage("invalid delimiter spec"));
        }
        Ok(Self::Delimited { delimiter })
    }

    /// Shell assignment renderer
    #[must_use]
    pub const fn shell() -> Self {
        Self::Shell
    }

    /// JSON renderer, if this build supports it
    pub fn json(caps: &Capabilities) -> Result<Self> {
        caps.require(Format::Json)?;
        Ok(Self::Json)
    }

    /// Output format produced by this renderer
    #[must_use]
    pub const fn format(&self) -> Format {
        match self {
            Self::Delimited { .. } => Format::Delimited,
            Self::Shell => Format::Shell,
            Self::Json => Format::Json,
        }
    }

    /// Render every present parameter
    #[must_use]
    pub fn render(&self, params: &[ParsedParameter]) -> String {
        let present = params.iter().filter_map(|param| {
            param
                .value
                .as_deref()
                .map(|value| (param.keyword.as_str(), value))
        });

        match self {
            Self::Delimited { delimiter } => present
                .map(|(keyword, value)| format!("{keyword}{delimiter}{value}\n"))
                .collect(),
            Self::Shell => present
                .map(|(keyword, value)| format!("{keyword}={}\n", shell_escape(value)))
                .collect(),
            Self::Json => {
                let object: Map<String, Value> = present
                    .map(|(keyword, value)| {
                        (keyword.to_string(), Value::String(value.to_string()))
                    })
                    .collect();
                format!("{}\n", Value::Object(object))
            }
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::Delimited {
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }
}

/// Wrap `value` in single quotes so a POSIX shell reads it back verbatim
///
/// Each embedded `'` closes the quote, adds an escaped quote and reopens it.
#[must_use]
pub fn shell_escape(value: &str) -> String {
    const QUOTE_ESCAPE: &str = r"'\''";

    let quotes = value.matches('\'').count();
    let capacity = value.len() + quotes * (QUOTE_ESCAPE.len() - 1) + 2;
    let mut escaped = String::with_capacity(capacity);

    escaped.push('\'');
    let mut runs = value.split('\'');
    if let Some(first) = runs.next() {
        escaped.push_str(first);
    }
    for run in runs {
        escaped.push_str(QUOTE_ESCAPE);
        escaped.push_str(run);
    }
    escaped.push('\'');

    escaped
}
