//! Test fixtures for common test scenarios.
//!
//! This module provides pre-built sources and an index builder for
//! resolver, store and mirror tests.

use std::path::Path;

use crate::core::{PackageId, PackageVersion};
use crate::index::IndexManager;
use crate::sources::Source;
use crate::util::config::{SourceConfig, UpstreamConfig};

/// A named source at `https://<name>.example.com` with the default template.
pub fn named_source(name: &str, priority: u32) -> Source {
    let config = SourceConfig::new(
        name,
        format!("https://{}.example.com", name),
        format!("https://{}.example.com/index", name),
    )
    .with_priority(priority);
    Source::from_config(&config).expect("fixture source is valid")
}

/// The synthesized legacy `upstream` source.
pub fn legacy_source() -> Source {
    let config = UpstreamConfig {
        url: "https://upstream.example.com".to_string(),
        index_url: "https://upstream.example.com/index".to_string(),
        ..Default::default()
    };
    Source::from_upstream(&config).expect("fixture upstream is valid")
}

/// Builder for an on-disk index tree.
#[derive(Debug, Clone, Default)]
pub struct IndexFixture {
    entries: Vec<(PackageId, PackageVersion)>,
}

impl IndexFixture {
    /// Create an empty index fixture.
    pub fn new() -> Self {
        IndexFixture::default()
    }

    /// Add a version with the given dependencies.
    pub fn package(mut self, id: &str, version: &str, deps: &[&str]) -> Self {
        let mut entry = PackageVersion::new(version, "");
        for dep in deps {
            entry = entry.with_dep(*dep, "*");
        }
        self.entries.push((id.parse().expect("fixture id is valid"), entry));
        self
    }

    /// Add a fully specified version entry.
    pub fn entry(mut self, id: &str, entry: PackageVersion) -> Self {
        self.entries.push((id.parse().expect("fixture id is valid"), entry));
        self
    }

    /// Write every entry into the source's index tree under `root`.
    pub fn write_to(&self, root: &Path, source: &Source) -> IndexManager {
        let index = IndexManager::new(root);
        for (id, entry) in &self.entries {
            index
                .write_package_entry(source, id, entry)
                .expect("fixture entry written");
        }
        index
    }
}
