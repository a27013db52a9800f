//! Parameter Resolution
//!
//! This module turns the explicit settings found in a conninfo string into the
//! full, ordered parameter sequence handed to renderers.
//!
//! # Resolution Precedence
//! For every keyword in the catalog, independently:
//! 1. Value written explicitly in the conninfo string (highest priority)
//! 2. The keyword's environment variable, if declared, set and non-empty
//! 3. The keyword's compiled-in default
//! 4. Absent
//!
//! # Environment Access
//! The environment is read through [`EnvSource`], never mutated. The CLI uses
//! [`ProcessEnv`]; tests pass a `HashMap` snapshot instead.

use std::collections::HashMap;

use serde::Serialize;
use tracing::trace;

use crate::catalog::Catalog;

/// Read-only view of environment variables
pub trait EnvSource {
    /// Look up a variable; `None` when unset or not valid Unicode
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// An environment with no variables set
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyEnv;

impl EnvSource for EmptyEnv {
    fn var(&self, _name: &str) -> Option<String> {
        None
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl EnvSource for HashMap<&str, &str> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).map(|value| (*value).to_string())
    }
}

/// Explicit keyword/value pairs taken from a conninfo string
///
/// Keywords are always catalog keywords. Setting a keyword twice keeps the
/// original position and replaces the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    entries: Vec<(&'static str, String)>,
}

impl Settings {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an explicit value, replacing any earlier one for `keyword`
    pub fn set(&mut self, keyword: &'static str, value: String) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == keyword) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((keyword, value)),
        }
    }

    /// Explicit value for `keyword`
    #[must_use]
    pub fn get(&self, keyword: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == keyword)
            .map(|(_, v)| v.as_str())
    }

    /// Number of distinct keywords set
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no keyword was set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate explicit settings in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(keyword, value)| (*keyword, value.as_str()))
    }
}

/// A resolved catalog keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedParameter {
    /// Catalog keyword
    pub keyword: String,

    /// Resolved value; `None` when no source supplied one
    pub value: Option<String>,
}

impl ParsedParameter {
    /// Create a resolved parameter
    pub fn new(keyword: impl Into<String>, value: Option<String>) -> Self {
        Self {
            keyword: keyword.into(),
            value,
        }
    }

    /// Whether the parameter has a value and will be rendered
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.value.is_some()
    }
}

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// Written in the conninfo string
    Explicit,
    /// Taken from the keyword's environment variable
    Environment,
    /// Compiled-in default
    Default,
}

/// Resolve every catalog keyword, in catalog order
pub fn resolve(
    catalog: &Catalog,
    settings: &Settings,
    env: &dyn EnvSource,
) -> Vec<ParsedParameter> {
    catalog
        .iter()
        .map(|spec| {
            let resolved = settings
                .get(spec.keyword)
                .map(|value| (value.to_string(), ValueSource::Explicit))
                .or_else(|| {
                    spec.envvar
                        .and_then(|name| env.var(name))
                        .filter(|value| !value.is_empty())
                        .map(|value| (value, ValueSource::Environment))
                })
                .or_else(|| {
                    spec.compiled_default
                        .map(|value| (value.to_string(), ValueSource::Default))
                });

            match resolved {
                Some((value, source)) => {
                    trace!(keyword = spec.keyword, ?source, "resolved connection parameter");
                    ParsedParameter::new(spec.keyword, Some(value))
                }
                None => ParsedParameter::new(spec.keyword, None),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ParameterSpec;

    fn small_catalog() -> Catalog {
        Catalog::new(vec![
            ParameterSpec::new("host", "Database-Host").env("PGHOST"),
            ParameterSpec::new("port", "Database-Port")
                .env("PGPORT")
                .default_value("5432"),
            ParameterSpec::new("replication", "Replication"),
        ])
        .unwrap()
    }

    fn value_of<'a>(params: &'a [ParsedParameter], keyword: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|p| p.keyword == keyword)
            .and_then(|p| p.value.as_deref())
    }

    #[test]
    fn test_settings_last_value_wins() {
        let mut settings = Settings::new();
        settings.set("host", "a".to_string());
        settings.set("port", "1".to_string());
        settings.set("host", "b".to_string());

        assert_eq!(settings.len(), 2);
        assert_eq!(settings.get("host"), Some("b"));
        let order: Vec<_> = settings.iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["host", "port"]);
    }

    #[test]
    fn test_explicit_beats_environment() {
        let mut settings = Settings::new();
        settings.set("host", "explicit".to_string());
        let env = HashMap::from([("PGHOST", "from-env")]);

        let params = resolve(&small_catalog(), &settings, &env);
        assert_eq!(value_of(&params, "host"), Some("explicit"));
    }

    #[test]
    fn test_environment_beats_default() {
        let env = HashMap::from([("PGPORT", "6543")]);
        let params = resolve(&small_catalog(), &Settings::new(), &env);
        assert_eq!(value_of(&params, "port"), Some("6543"));
    }

    #[test]
    fn test_empty_environment_value_ignored() {
        let env = HashMap::from([("PGPORT", ""), ("PGHOST", "")]);
        let params = resolve(&small_catalog(), &Settings::new(), &env);
        assert_eq!(value_of(&params, "port"), Some("5432"));
        assert_eq!(value_of(&params, "host"), None);
    }

    #[test]
    fn test_explicit_empty_value_is_present() {
        let mut settings = Settings::new();
        settings.set("port", String::new());
        let params = resolve(&small_catalog(), &settings, &EmptyEnv);
        assert_eq!(value_of(&params, "port"), Some(""));
    }

    #[test]
    fn test_absent_without_any_source() {
        let params = resolve(&small_catalog(), &Settings::new(), &EmptyEnv);
        let replication = params
            .iter()
            .find(|p| p.keyword == "replication")
            .unwrap();
        assert!(!replication.is_present());
    }

    #[test]
    fn test_resolution_covers_catalog_in_order() {
        let mut settings = Settings::new();
        settings.set("replication", "database".to_string());
        settings.set("host", "h".to_string());

        let params = resolve(&small_catalog(), &settings, &EmptyEnv);
        let keywords: Vec<_> = params.iter().map(|p| p.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["host", "port", "replication"]);
    }

    #[test]
    fn test_owned_string_map_env() {
        let env: HashMap<String, String> =
            HashMap::from([("PGHOST".to_string(), "owned".to_string())]);
        let params = resolve(&small_catalog(), &Settings::new(), &env);
        assert_eq!(value_of(&params, "host"), Some("owned"));
    }

    #[test]
    fn test_parsed_parameter_serialization() {
        let param = ParsedParameter::new("host", Some("localhost".to_string()));
        let json = serde_json::to_string(&param).unwrap();
        assert_eq!(json, r#"{"keyword":"host","value":"localhost"}"#);
    }
}
