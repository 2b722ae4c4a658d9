//! Configuration file support for Depot.
//!
//! Depot reads two configuration files:
//! - Global: `~/.depot/config.toml` - User-wide defaults
//! - Project: `.depot/config.toml` (or `--config <path>`) - Overrides
//!
//! Project config takes precedence over global config.
//!
//! ## Example config.toml
//!
//! ```toml
//! default_source = "internal"
//!
//! [storage]
//! index_dir = "/srv/depot/index"
//! package_dir = "/srv/depot/packages"
//!
//! [net]
//! timeout_secs = 30
//! jobs = 4
//!
//! [[sources]]
//! name = "internal"
//! url = "https://packages.internal"
//! index_url = "https://git.internal/registry-index"
//! priority = 10
//! auth = { type = "bearer", token = "${INTERNAL_TOKEN}" }
//!
//! [[sources]]
//! name = "public"
//! type = "official"
//! url = "https://packages.example.com"
//! index_url = "https://github.com/example/registry-index"
//! priority = 100
//! ```
//!
//! Older configurations describe a single registry with an `[upstream]`
//! table instead of `[[sources]]`; it is turned into one implicit source
//! named `upstream`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::sources::source::MAX_PRIORITY;
use crate::sources::{AuthConfig, IndexKind, SourceKind};

/// Depot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source used when none is named
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_source: Option<String>,

    /// On-disk locations
    pub storage: StorageConfig,

    /// Network settings
    pub net: NetConfig,

    /// Legacy single-registry configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream: Option<UpstreamConfig>,

    /// Configured sources, in declaration order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceConfig>,
}

/// Where indices and packages are stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root of the local index copies (default: `<home>/index`)
    pub index_dir: Option<PathBuf>,

    /// Root of the package archive cache (default: `<home>/packages`)
    pub package_dir: Option<PathBuf>,
}

/// Network-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// HTTP request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Number of parallel downloads (None or 1 = sequential)
    pub jobs: Option<usize>,

    /// Offline mode (don't synchronize indices)
    #[serde(default)]
    pub offline: bool,
}

/// One `[[sources]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Unique source name
    pub name: String,

    /// Registry flavour
    #[serde(rename = "type", default)]
    pub kind: SourceKind,

    /// Base URL for archive downloads
    pub url: String,

    /// Location of the package index
    pub index_url: String,

    /// How the index is published
    #[serde(default)]
    pub index_type: IndexKind,

    /// Archive URL template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_url_pattern: Option<String>,

    /// Whether the source takes part in fallback downloads
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Lower is tried first (0..=1000)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,

    /// Download credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
}

impl SourceConfig {
    /// Create a source entry with defaults.
    pub fn new(name: impl Into<String>, url: impl Into<String>, index_url: impl Into<String>) -> Self {
        SourceConfig {
            name: name.into(),
            kind: SourceKind::default(),
            url: url.into(),
            index_url: index_url.into(),
            index_type: IndexKind::default(),
            package_url_pattern: None,
            enabled: true,
            priority: None,
            auth: None,
        }
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set credentials.
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set the index kind.
    pub fn with_index_type(mut self, index_type: IndexKind) -> Self {
        self.index_type = index_type;
        self
    }

    /// Disable this source.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Legacy `[upstream]` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub url: String,

    pub index_url: String,

    #[serde(default)]
    pub index_type: IndexKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_url_pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Parse and validate configuration from TOML content.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for source in &self.sources {
            if source.name.trim().is_empty() {
                bail!("source name must not be empty");
            }
            if !seen.insert(source.name.as_str()) {
                bail!("duplicate source name `{}`", source.name);
            }
            if source.url.trim().is_empty() {
                bail!("source `{}` is missing `url`", source.name);
            }
            if source.index_url.trim().is_empty() {
                bail!("source `{}` is missing `index_url`", source.name);
            }
            if let Some(priority) = source.priority {
                if priority > MAX_PRIORITY {
                    bail!(
                        "source `{}` has priority {}, expected 0..={}",
                        source.name,
                        priority,
                        MAX_PRIORITY
                    );
                }
            }
            url::Url::parse(&source.url)
                .with_context(|| format!("source `{}` has an invalid `url`", source.name))?;
        }

        if let Some(upstream) = &self.upstream {
            if upstream.url.trim().is_empty() || upstream.index_url.trim().is_empty() {
                bail!("[upstream] requires both `url` and `index_url`");
            }
        }

        if let Some(default) = &self.default_source {
            if !self.sources.is_empty() && !seen.contains(default.as_str()) {
                bail!("default_source `{}` does not name a configured source", default);
            }
        }

        Ok(())
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Storage settings
        if other.storage.index_dir.is_some() {
            self.storage.index_dir = other.storage.index_dir;
        }
        if other.storage.package_dir.is_some() {
            self.storage.package_dir = other.storage.package_dir;
        }

        // Net settings
        if other.net.timeout_secs.is_some() {
            self.net.timeout_secs = other.net.timeout_secs;
        }
        if other.net.jobs.is_some() {
            self.net.jobs = other.net.jobs;
        }
        if other.net.offline {
            self.net.offline = true;
        }

        // Source tables are replaced wholesale, never interleaved, and the
        // default goes with them
        if other.upstream.is_some() || !other.sources.is_empty() {
            self.upstream = other.upstream;
            self.sources = other.sources;
            self.default_source = other.default_source;
        } else if other.default_source.is_some() {
            self.default_source = other.default_source;
        }
    }

    /// Number of parallel download jobs (at least 1).
    pub fn jobs(&self) -> usize {
        self.net.jobs.unwrap_or(1).max(1)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.depot/config.toml or --config)
/// 2. Global config (~/.depot/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    // Load global config first
    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    // Project config overrides global
    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project);
    }

    config
}

/// Get the project config path (.depot/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".depot").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::AuthKind;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.sources.is_empty());
        assert!(config.upstream.is_none());
        assert!(!config.net.offline);
        assert_eq!(config.jobs(), 1);
    }

    #[test]
    fn test_parse_sources() {
        let config = Config::parse(
            r#"
default_source = "public"

[[sources]]
name = "internal"
url = "https://packages.internal"
index_url = "https://git.internal/index"
priority = 10
auth = { type = "bearer", token = "${INTERNAL_TOKEN}" }

[[sources]]
name = "public"
type = "official"
url = "https://packages.example.com"
index_url = "https://packages.example.com/index"
index_type = "http"
enabled = false
"#,
        )
        .unwrap();

        assert_eq!(config.default_source.as_deref(), Some("public"));
        assert_eq!(config.sources.len(), 2);

        let internal = &config.sources[0];
        assert_eq!(internal.kind, SourceKind::Custom);
        assert_eq!(internal.index_type, IndexKind::Git);
        assert_eq!(internal.priority, Some(10));
        assert!(internal.enabled);
        assert_eq!(internal.auth.as_ref().unwrap().kind, AuthKind::Bearer);

        let public = &config.sources[1];
        assert_eq!(public.kind, SourceKind::Official);
        assert_eq!(public.index_type, IndexKind::Http);
        assert!(!public.enabled);
        assert!(public.priority.is_none());
    }

    #[test]
    fn test_parse_legacy_upstream() {
        let config = Config::parse(
            r#"
[upstream]
url = "https://packages.example.com"
index_url = "https://github.com/example/index"
"#,
        )
        .unwrap();

        let upstream = config.upstream.unwrap();
        assert_eq!(upstream.url, "https://packages.example.com");
        assert_eq!(upstream.index_type, IndexKind::Git);
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let err = Config::parse(
            r#"
[[sources]]
name = "a"
url = "https://a"
index_url = "https://a/index"

[[sources]]
name = "a"
url = "https://b"
index_url = "https://b/index"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate source name"));
    }

    #[test]
    fn test_validate_rejects_priority_out_of_range() {
        let err = Config::parse(
            r#"
[[sources]]
name = "a"
url = "https://a"
index_url = "https://a/index"
priority = 5000
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("priority 5000"));
    }

    #[test]
    fn test_validate_rejects_unknown_default() {
        let err = Config::parse(
            r#"
default_source = "nope"

[[sources]]
name = "a"
url = "https://a"
index_url = "https://a/index"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("default_source `nope`"));
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.net.jobs = Some(4);
        base.storage.index_dir = Some(PathBuf::from("/global/index"));
        base.sources = vec![SourceConfig::new("global", "https://g", "https://g/index")];

        let mut project = Config::default();
        project.storage.index_dir = Some(PathBuf::from("/project/index"));

        base.merge(project);

        assert_eq!(base.storage.index_dir, Some(PathBuf::from("/project/index")));
        assert_eq!(base.net.jobs, Some(4)); // Not overridden
        assert_eq!(base.sources.len(), 1); // Not overridden
    }

    #[test]
    fn test_config_merge_replaces_source_table() {
        let mut base = Config::default();
        base.upstream = Some(UpstreamConfig {
            url: "https://legacy".to_string(),
            index_url: "https://legacy/index".to_string(),
            ..Default::default()
        });

        let mut project = Config::default();
        project.sources = vec![SourceConfig::new("internal", "https://i", "https://i/index")];

        base.merge(project);

        assert!(base.upstream.is_none());
        assert_eq!(base.sources[0].name, "internal");
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(
            &global_path,
            r#"
[net]
timeout_secs = 10
jobs = 2
"#,
        )
        .unwrap();

        std::fs::write(
            &project_path,
            r#"
[net]
jobs = 8
"#,
        )
        .unwrap();

        let config = load_config(&global_path, &project_path);
        assert_eq!(config.net.timeout_secs, Some(10));
        assert_eq!(config.jobs(), 8);
    }

    #[test]
    fn test_load_or_default_on_invalid_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();

        let config = Config::load_or_default(&path);
        assert!(config.sources.is_empty());
    }
}
