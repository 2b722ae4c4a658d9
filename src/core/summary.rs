//! Package metadata as recorded in a source's index.
//!
//! Each index file holds one JSON object per line, one line per published
//! version:
//!
//! ```text
//! {"version":"1.2.0","checksum":"9f86d08...","deps":{"acme/base":"^1.0"}}
//! {"version":"1.3.0","checksum":"60303ae...","deps":{},"yanked":true}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::PackageId;
use crate::resolver::version::latest_version;

/// A single published version of a package.
///
/// Entries are immutable once written; the index is append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageVersion {
    /// Version string as published (not necessarily semver)
    pub version: String,

    /// Content digest of the archive (SHA-256, hex)
    pub checksum: String,

    /// Dependencies: package id -> version requirement
    #[serde(default)]
    pub deps: BTreeMap<String, String>,

    /// Whether this version has been withdrawn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yanked: Option<bool>,
}

impl PackageVersion {
    /// Create a new, non-yanked version entry.
    pub fn new(version: impl Into<String>, checksum: impl Into<String>) -> Self {
        PackageVersion {
            version: version.into(),
            checksum: checksum.into(),
            deps: BTreeMap::new(),
            yanked: None,
        }
    }

    /// Add a dependency.
    pub fn with_dep(mut self, package: impl Into<String>, requirement: impl Into<String>) -> Self {
        self.deps.insert(package.into(), requirement.into());
        self
    }

    /// Mark the version as yanked.
    pub fn yanked(mut self) -> Self {
        self.yanked = Some(true);
        self
    }

    /// Check whether the version has been yanked.
    pub fn is_yanked(&self) -> bool {
        self.yanked.unwrap_or(false)
    }

    /// The checksum, or `None` if the index recorded an empty one.
    pub fn checksum(&self) -> Option<&str> {
        let checksum = self.checksum.trim();
        (!checksum.is_empty()).then_some(checksum)
    }
}

/// Full version history of one package within one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    pub owner: String,
    pub name: String,
    /// Versions in index (publication) order
    pub versions: Vec<PackageVersion>,
}

impl PackageMetadata {
    /// Create metadata for a package.
    pub fn new(id: &PackageId, versions: Vec<PackageVersion>) -> Self {
        PackageMetadata {
            owner: id.owner().to_string(),
            name: id.name().to_string(),
            versions,
        }
    }

    /// The newest non-yanked version.
    pub fn latest(&self) -> Option<&PackageVersion> {
        latest_version(&self.versions)
    }

    /// Versions eligible for mirroring (non-yanked), in index order.
    pub fn installable(&self) -> impl Iterator<Item = &PackageVersion> {
        self.versions.iter().filter(|v| !v.is_yanked())
    }

    /// Find a specific version.
    pub fn version(&self, version: &str) -> Option<&PackageVersion> {
        self.versions.iter().find(|v| v.version == version)
    }
}
