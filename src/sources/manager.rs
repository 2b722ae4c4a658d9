//! The source table: which upstream, with what credentials, at what priority.
//!
//! Sources are searched in priority order (lower = tried first). Sources
//! with equal priority keep their declaration order.

use tracing::debug;

use crate::sources::auth::{build_auth_headers, AuthHeaders};
use crate::sources::{Source, SourceError};
use crate::util::config::Config;

/// Prioritized table of named sources.
#[derive(Debug, Clone, Default)]
pub struct SourceManager {
    /// Sources in declaration order
    sources: Vec<Source>,

    /// Explicit default source name
    default: Option<String>,
}

impl SourceManager {
    /// Create a manager from already-built sources.
    pub fn new(sources: Vec<Source>, default: Option<String>) -> Result<Self, SourceError> {
        let mut manager = SourceManager::default();
        for source in sources {
            manager.add_source(source)?;
        }
        if let Some(name) = default {
            manager.set_default(&name)?;
        }
        Ok(manager)
    }

    /// Normalize configuration into a source table.
    ///
    /// An explicit `[[sources]]` list wins. Without one, a legacy
    /// `[upstream]` block becomes a single implicit source named `upstream`.
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let sources = if !config.sources.is_empty() {
            config
                .sources
                .iter()
                .map(Source::from_config)
                .collect::<Result<Vec<_>, _>>()?
        } else if let Some(upstream) = &config.upstream {
            debug!("synthesizing `upstream` source from legacy configuration");
            vec![Source::from_upstream(upstream)?]
        } else {
            Vec::new()
        };

        SourceManager::new(sources, config.default_source.clone())
    }

    /// Look up a source by name.
    pub fn get(&self, name: &str) -> Result<&Source, SourceError> {
        self.sources
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| SourceError::NotFound(name.to_string()))
    }

    /// The default source: the explicit default, else the first declared.
    pub fn default_source(&self) -> Option<&Source> {
        match &self.default {
            Some(name) => self.sources.iter().find(|s| &s.name == name),
            None => self.sources.first(),
        }
    }

    /// Get the named source, or the default source when no name is given.
    ///
    /// An unknown name is an error; a missing default is not.
    pub fn get_source(&self, name: Option<&str>) -> Result<Option<&Source>, SourceError> {
        match name {
            Some(name) => self.get(name).map(Some),
            None => Ok(self.default_source()),
        }
    }

    /// All enabled sources, ascending by priority, stable for ties.
    ///
    /// This is the order in which fallback downloads try sources.
    pub fn list_enabled_sources(&self) -> Vec<&Source> {
        let mut enabled: Vec<&Source> = self.sources.iter().filter(|s| s.enabled).collect();
        enabled.sort_by_key(|s| s.priority);
        enabled
    }

    /// All sources in declaration order.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// The explicit default source name, if any.
    pub fn default_name(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Check if no sources are configured.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Build the archive URL for a package version on a source.
    pub fn build_download_url(&self, source: &Source, owner: &str, name: &str, version: &str) -> String {
        source.download_url(owner, name, version)
    }

    /// Build authentication headers for a source.
    pub fn build_auth_headers(&self, source: &Source) -> Result<AuthHeaders, SourceError> {
        build_auth_headers(source.auth.as_ref())
    }

    /// Add a source. Names must be unique.
    pub fn add_source(&mut self, source: Source) -> Result<(), SourceError> {
        if source.name.is_empty() {
            return Err(SourceError::EmptyName);
        }
        if self.sources.iter().any(|s| s.name == source.name) {
            return Err(SourceError::Duplicate(source.name));
        }
        self.sources.push(source);
        Ok(())
    }

    /// Remove a source, clearing the default if it pointed there.
    pub fn remove_source(&mut self, name: &str) -> Result<Source, SourceError> {
        let pos = self
            .sources
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| SourceError::NotFound(name.to_string()))?;

        if self.default.as_deref() == Some(name) {
            self.default = None;
        }

        Ok(self.sources.remove(pos))
    }

    /// Enable a source.
    pub fn enable_source(&mut self, name: &str) -> Result<(), SourceError> {
        self.get_mut(name)?.enabled = true;
        Ok(())
    }

    /// Disable a source.
    pub fn disable_source(&mut self, name: &str) -> Result<(), SourceError> {
        self.get_mut(name)?.enabled = false;
        Ok(())
    }

    /// Make an existing source the default.
    pub fn set_default(&mut self, name: &str) -> Result<(), SourceError> {
        self.get(name)?;
        self.default = Some(name.to_string());
        Ok(())
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Source, SourceError> {
        self.sources
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| SourceError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::LEGACY_SOURCE_NAME;
    use crate::util::config::{SourceConfig, UpstreamConfig};

    fn source(name: &str, priority: u32) -> Source {
        let config = SourceConfig::new(
            name,
            format!("https://{}.example.com", name),
            format!("https://{}.example.com/index", name),
        )
        .with_priority(priority);
        Source::from_config(&config).unwrap()
    }

    fn names(sources: &[&Source]) -> Vec<String> {
        sources.iter().map(|s| s.name.clone()).collect()
    }

    #[test]
    fn test_equal_priority_keeps_declaration_order() {
        let manager = SourceManager::new(vec![source("b", 50), source("a", 50)], None).unwrap();
        assert_eq!(names(&manager.list_enabled_sources()), vec!["b", "a"]);
    }

    #[test]
    fn test_enabled_sources_sorted_by_priority() {
        let mut manager = SourceManager::new(
            vec![source("public", 100), source("internal", 10), source("mirror", 50)],
            None,
        )
        .unwrap();
        manager.disable_source("mirror").unwrap();

        assert_eq!(names(&manager.list_enabled_sources()), vec!["internal", "public"]);

        manager.enable_source("mirror").unwrap();
        assert_eq!(
            names(&manager.list_enabled_sources()),
            vec!["internal", "mirror", "public"]
        );
    }

    #[test]
    fn test_default_is_first_declared() {
        let manager = SourceManager::new(vec![source("b", 50), source("a", 0)], None).unwrap();
        assert_eq!(manager.default_source().unwrap().name, "b");
        assert_eq!(manager.get_source(None).unwrap().unwrap().name, "b");
    }

    #[test]
    fn test_explicit_default() {
        let manager =
            SourceManager::new(vec![source("b", 50), source("a", 0)], Some("a".to_string())).unwrap();
        assert_eq!(manager.default_source().unwrap().name, "a");
    }

    #[test]
    fn test_unknown_name_is_not_found() {
        let manager = SourceManager::new(vec![source("a", 0)], None).unwrap();
        assert!(matches!(
            manager.get_source(Some("nope")),
            Err(SourceError::NotFound(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_missing_default_is_none() {
        let manager = SourceManager::default();
        assert!(manager.get_source(None).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = SourceManager::new(vec![source("a", 0), source("a", 10)], None);
        assert!(matches!(result, Err(SourceError::Duplicate(name)) if name == "a"));
    }

    #[test]
    fn test_removing_default_clears_pointer() {
        let mut manager =
            SourceManager::new(vec![source("a", 0), source("b", 10)], Some("a".to_string())).unwrap();

        manager.remove_source("a").unwrap();
        assert!(manager.default_name().is_none());
        assert_eq!(manager.default_source().unwrap().name, "b");
    }

    #[test]
    fn test_set_default_requires_existing_source() {
        let mut manager = SourceManager::new(vec![source("a", 0)], None).unwrap();
        assert!(manager.set_default("missing").is_err());
        assert!(manager.default_name().is_none());

        manager.set_default("a").unwrap();
        assert_eq!(manager.default_name(), Some("a"));
    }

    #[test]
    fn test_from_config_synthesizes_legacy_upstream() {
        let config = Config {
            upstream: Some(UpstreamConfig {
                url: "https://pkgs.example.com".to_string(),
                index_url: "https://github.com/example/index".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };

        let manager = SourceManager::from_config(&config).unwrap();
        let default = manager.default_source().unwrap();
        assert_eq!(default.name, LEGACY_SOURCE_NAME);
        assert_eq!(default.priority, 0);
        assert!(default.is_legacy());
    }

    #[test]
    fn test_from_config_prefers_sources_list() {
        let config = Config {
            upstream: Some(UpstreamConfig {
                url: "https://legacy.example.com".to_string(),
                index_url: "https://legacy.example.com/index".to_string(),
                ..Default::default()
            }),
            sources: vec![SourceConfig::new("internal", "https://i", "https://i/index")],
            ..Default::default()
        };

        let manager = SourceManager::from_config(&config).unwrap();
        assert_eq!(manager.sources().len(), 1);
        assert_eq!(manager.default_source().unwrap().name, "internal");
    }

    #[test]
    fn test_build_download_url() {
        let manager = SourceManager::new(vec![source("a", 0)], None).unwrap();
        let a = manager.get("a").unwrap();
        assert_eq!(
            manager.build_download_url(a, "acme", "widget", "0.3.1"),
            "https://a.example.com/user/acme/widget/0.3.1.zip"
        );
        assert!(manager.build_auth_headers(a).unwrap().is_empty());
    }
}
