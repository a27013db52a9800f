//! Connection Parameter Catalog
//!
//! This module defines the fixed, ordered set of conninfo keywords the parser
//! understands. Each keyword carries an optional environment variable fallback
//! and an optional compiled-in default.
//!
//! # Ordering
//! Catalog order is the canonical output order for every renderer. The
//! standard catalog follows the libpq keyword order.
//!
//! # Ownership
//! A catalog is an ordinary value: build it once with [`Catalog::standard`]
//! and pass it by reference to [`crate::parse`]. There is no global table.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{ConninfoError, Result};

/// Description of a single recognized connection keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSpec {
    /// Keyword as written in a conninfo string (case-sensitive)
    pub keyword: &'static str,

    /// Environment variable consulted when the string does not set the keyword
    #[serde(skip_serializing_if = "Option::is_none")]
    pub envvar: Option<&'static str>,

    /// Default value used when neither the string nor the environment supplies one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiled_default: Option<&'static str>,

    /// Human-readable label
    pub label: &'static str,

    /// Whether the value is a secret (informational only)
    pub is_secret: bool,
}

impl ParameterSpec {
    /// Create a spec with no environment fallback, no default and no secret flag
    #[must_use]
    pub const fn new(keyword: &'static str, label: &'static str) -> Self {
        Self {
            keyword,
            envvar: None,
            compiled_default: None,
            label,
            is_secret: false,
        }
    }

    /// Attach an environment variable fallback
    #[must_use]
    pub const fn env(mut self, envvar: &'static str) -> Self {
        self.envvar = Some(envvar);
        self
    }

    /// Attach a compiled-in default value
    #[must_use]
    pub const fn default_value(mut self, value: &'static str) -> Self {
        self.compiled_default = Some(value);
        self
    }

    /// Mark the parameter as secret
    #[must_use]
    pub const fn secret(mut self) -> Self {
        self.is_secret = true;
        self
    }
}

/// Ordered, immutable set of parameter specs with unique keywords
#[derive(Debug, Clone)]
pub struct Catalog {
    specs: Vec<ParameterSpec>,
}

impl Catalog {
    /// Build a catalog from specs, rejecting duplicate keywords
    pub fn new(specs: Vec<ParameterSpec>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(specs.len());
        for spec in &specs {
            if spec.keyword.is_empty() {
                return Err(ConninfoError::config_error("catalog keyword cannot be empty"));
            }
            if !seen.insert(spec.keyword) {
                return Err(ConninfoError::config_error(format!(
                    "duplicate catalog keyword \"{}\"",
                    spec.keyword
                )));
            }
        }
        Ok(Self { specs })
    }

    /// The standard PostgreSQL keyword set, in libpq order
    #[must_use]
    pub fn standard() -> Self {
        Self {
            specs: standard_specs(),
        }
    }

    /// Exact, case-sensitive keyword lookup
    #[must_use]
    pub fn lookup(&self, keyword: &str) -> Option<&ParameterSpec> {
        self.specs.iter().find(|spec| spec.keyword == keyword)
    }

    /// All specs in catalog order
    #[must_use]
    pub fn all(&self) -> &[ParameterSpec] {
        &self.specs
    }

    /// Iterate specs in catalog order
    pub fn iter(&self) -> std::slice::Iter<'_, ParameterSpec> {
        self.specs.iter()
    }

    /// Number of keywords in the catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the catalog has no keywords
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a ParameterSpec;
    type IntoIter = std::slice::Iter<'a, ParameterSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}

// Mirrors libpq's PQconninfoOptions. Keep in sync with the keyword order there.
fn standard_specs() -> Vec<ParameterSpec> {
    vec![
        ParameterSpec::new("service", "Database-Service")
            .env("PGSERVICE"),
        ParameterSpec::new("user", "Database-User").env("PGUSER"),
        ParameterSpec::new("password", "Database-Password")
            .env("PGPASSWORD")
            .secret(),
        ParameterSpec::new("passfile", "Database-Password-File")
            .env("PGPASSFILE"),
        ParameterSpec::new("channel_binding", "Channel-Binding")
            .env("PGCHANNELBINDING")
            .default_value("prefer"),
        ParameterSpec::new("connect_timeout", "Connect-timeout")
            .env("PGCONNECT_TIMEOUT"),
        ParameterSpec::new("dbname", "Database-Name")
            .env("PGDATABASE"),
        ParameterSpec::new("host", "Database-Host").env("PGHOST"),
        ParameterSpec::new("hostaddr", "Database-Host-IP-Address")
            .env("PGHOSTADDR"),
        ParameterSpec::new("port", "Database-Port")
            .env("PGPORT")
            .default_value("5432"),
        ParameterSpec::new("client_encoding", "Client-Encoding")
            .env("PGCLIENTENCODING"),
        ParameterSpec::new("options", "Backend-Options")
            .env("PGOPTIONS")
            .default_value(""),
        ParameterSpec::new("application_name", "Application-Name")
            .env("PGAPPNAME"),
        ParameterSpec::new("fallback_application_name", "Fallback-Application-Name"),
        ParameterSpec::new("keepalives", "TCP-Keepalives"),
        ParameterSpec::new("keepalives_idle", "TCP-Keepalives-Idle"),
        ParameterSpec::new("keepalives_interval", "TCP-Keepalives-Interval"),
        ParameterSpec::new("keepalives_count", "TCP-Keepalives-Count"),
        ParameterSpec::new("tcp_user_timeout", "TCP-User-Timeout"),
        ParameterSpec::new("sslmode", "SSL-Mode")
            .env("PGSSLMODE")
            .default_value("prefer"),
        ParameterSpec::new("sslcompression", "SSL-Compression")
            .env("PGSSLCOMPRESSION")
            .default_value("0"),
        ParameterSpec::new("sslcert", "SSL-Client-Cert")
            .env("PGSSLCERT"),
        ParameterSpec::new("sslkey", "SSL-Client-Key")
            .env("PGSSLKEY"),
        ParameterSpec::new("sslcertmode", "SSL-Client-Cert-Mode")
            .env("PGSSLCERTMODE")
            .default_value("allow"),
        ParameterSpec::new("sslpassword", "SSL-Client-Key-Password")
            .secret(),
        ParameterSpec::new("sslrootcert", "SSL-Root-Certificate")
            .env("PGSSLROOTCERT"),
        ParameterSpec::new("sslcrl", "SSL-Revocation-List")
            .env("PGSSLCRL"),
        ParameterSpec::new("sslcrldir", "SSL-Revocation-List-Dir")
            .env("PGSSLCRLDIR"),
        ParameterSpec::new("sslsni", "SSL-SNI")
            .env("PGSSLSNI")
            .default_value("1"),
        ParameterSpec::new("requirepeer", "Require-Peer")
            .env("PGREQUIREPEER"),
        ParameterSpec::new("require_auth", "Require-Auth")
            .env("PGREQUIREAUTH"),
        ParameterSpec::new("ssl_min_protocol_version", "SSL-Minimum-Protocol-Version")
            .env("PGSSLMINPROTOCOLVERSION")
            .default_value("TLSv1.2"),
        ParameterSpec::new("ssl_max_protocol_version", "SSL-Maximum-Protocol-Version")
            .env("PGSSLMAXPROTOCOLVERSION"),
        ParameterSpec::new("gssencmode", "GSSENC-Mode")
            .env("PGGSSENCMODE")
            .default_value("prefer"),
        ParameterSpec::new("krbsrvname", "Kerberos-service-name")
            .env("PGKRBSRVNAME")
            .default_value("postgres"),
        ParameterSpec::new("gsslib", "GSS-library").env("PGGSSLIB"),
        ParameterSpec::new("gssdelegation", "GSS-delegation")
            .env("PGGSSDELEGATION")
            .default_value("0"),
        ParameterSpec::new("replication", "Replication"),
        ParameterSpec::new("target_session_attrs", "Target-Session-Attrs")
            .env("PGTARGETSESSIONATTRS")
            .default_value("any"),
        ParameterSpec::new("load_balance_hosts", "Load-Balance-Hosts")
            .env("PGLOADBALANCEHOSTS")
            .default_value("disable"),
    ]
}
