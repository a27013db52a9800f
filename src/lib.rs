//! conninfo-parse - PostgreSQL conninfo string parser
//!
//! Parses a PostgreSQL connection-info string, in either keyword/value form
//! (`host=localhost port=5432`) or URI form (`postgresql://localhost:5432/db`),
//! into the ordered set of recognized connection parameters, and renders that
//! set as delimited lines, shell assignments or JSON.
//!
//! # Core Principles
//! - Purely syntactic: no connection attempts, no value validation
//! - All or nothing: a string either parses completely or yields an error
//! - Explicit inputs: the catalog and the environment are passed in, not global
//! - Stable output order: catalog order, for every format
//!
//! # Module Organization
//! - [`catalog`] - Recognized keywords, environment fallbacks and defaults
//! - [`parser`] - Keyword/value and URI grammars
//! - [`config`] - Value resolution (explicit, environment, default)
//! - [`capability`] - Output formats available in this build
//! - [`output`] - Delimited, shell and JSON renderers
//! - [`error`] - Error types and exit statuses
//!
//! # Example
//! ```
//! use conninfo_parse::{parse, Catalog, EmptyEnv, Renderer};
//!
//! let catalog = Catalog::standard();
//! let params = parse("host=localhost dbname='my db'", &catalog, &EmptyEnv).unwrap();
//! let out = Renderer::shell().render(&params);
//! assert!(out.contains("dbname='my db'\n"));
//! ```

pub mod capability;
pub mod catalog;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;

pub use capability::{Capabilities, Format};
pub use catalog::{Catalog, ParameterSpec};
pub use config::{resolve, EmptyEnv, EnvSource, ParsedParameter, ProcessEnv, Settings};
pub use error::{ConninfoError, ExitStatus, Result};
pub use output::{shell_escape, Renderer, DEFAULT_DELIMITER};
pub use parser::{detect_syntax, parse, parse_settings, Syntax};
