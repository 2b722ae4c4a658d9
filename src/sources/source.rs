//! Source records - one configured upstream registry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sources::template::{TemplateVars, UrlTemplate};
use crate::sources::SourceError;
use crate::util::config::{SourceConfig, UpstreamConfig};

/// Name of the source synthesized from a legacy `[upstream]` block.
pub const LEGACY_SOURCE_NAME: &str = "upstream";

/// Priority assigned when a source does not declare one.
pub const DEFAULT_PRIORITY: u32 = 100;

/// Highest priority value accepted in configuration.
pub const MAX_PRIORITY: u32 = 1000;

/// Which flavour of registry a source points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Official,
    Community,
    #[default]
    Custom,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Official => write!(f, "official"),
            SourceKind::Community => write!(f, "community"),
            SourceKind::Custom => write!(f, "custom"),
        }
    }
}

/// How a source publishes its package index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// A git repository of per-package JSON-lines files
    #[default]
    Git,
    /// An HTTP-served index (not synchronized yet)
    Http,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Git => write!(f, "git"),
            IndexKind::Http => write!(f, "http"),
        }
    }
}

/// Authentication scheme for archive downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    #[default]
    None,
    Bearer,
    Basic,
}

/// Credentials for a source.
///
/// Each credential may be a literal or contain `${VAR}` references, which
/// are looked up in the environment every time headers are built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(rename = "type", default)]
    pub kind: AuthKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl AuthConfig {
    /// Bearer token authentication.
    pub fn bearer(token: impl Into<String>) -> Self {
        AuthConfig {
            kind: AuthKind::Bearer,
            token: Some(token.into()),
            ..Default::default()
        }
    }

    /// HTTP basic authentication.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        AuthConfig {
            kind: AuthKind::Basic,
            username: Some(username.into()),
            password: Some(password.into()),
            ..Default::default()
        }
    }
}

/// A configured upstream registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Unique name
    pub name: String,

    /// Registry flavour
    pub kind: SourceKind,

    /// Base URL substituted for `${url}` in archive URLs
    pub base_url: String,

    /// Location of the package index
    pub index_url: String,

    /// How the index is published
    pub index_kind: IndexKind,

    /// Archive URL template
    pub url_template: UrlTemplate,

    /// Disabled sources are skipped by fallback downloads
    pub enabled: bool,

    /// Lower is tried first
    pub priority: u32,

    /// Credentials for archive downloads
    pub auth: Option<AuthConfig>,

    /// Synthesized from a legacy `[upstream]` block
    legacy: bool,
}

impl Source {
    /// Build a source from its configuration entry.
    pub fn from_config(config: &SourceConfig) -> Result<Self, SourceError> {
        let name = config.name.trim();
        if name.is_empty() {
            return Err(SourceError::EmptyName);
        }

        let priority = config.priority.unwrap_or(DEFAULT_PRIORITY);
        if priority > MAX_PRIORITY {
            return Err(SourceError::InvalidPriority {
                name: name.to_string(),
                priority,
            });
        }

        Ok(Source {
            name: name.to_string(),
            kind: config.kind,
            base_url: config.url.clone(),
            index_url: config.index_url.clone(),
            index_kind: config.index_type,
            url_template: parse_template(config.package_url_pattern.as_deref())?,
            enabled: config.enabled,
            priority,
            auth: config.auth.clone(),
            legacy: false,
        })
    }

    /// Synthesize the implicit source for a legacy single-upstream config.
    pub fn from_upstream(upstream: &UpstreamConfig) -> Result<Self, SourceError> {
        Ok(Source {
            name: LEGACY_SOURCE_NAME.to_string(),
            kind: SourceKind::Custom,
            base_url: upstream.url.clone(),
            index_url: upstream.index_url.clone(),
            index_kind: upstream.index_type,
            url_template: parse_template(upstream.package_url_pattern.as_deref())?,
            enabled: true,
            priority: 0,
            auth: upstream.auth.clone(),
            legacy: true,
        })
    }

    /// Whether this source came from a legacy `[upstream]` block.
    pub fn is_legacy(&self) -> bool {
        self.legacy
    }

    /// Build the archive URL for a package version.
    pub fn download_url(&self, owner: &str, name: &str, version: &str) -> String {
        self.url_template.expand(&TemplateVars {
            url: &self.base_url,
            owner,
            name,
            version,
        })
    }
}

fn parse_template(pattern: Option<&str>) -> Result<UrlTemplate, SourceError> {
    match pattern {
        Some(p) => UrlTemplate::parse(p),
        None => Ok(UrlTemplate::default()),
    }
}
