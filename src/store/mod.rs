//! Local cache of package archives.
//!
//! Archives are addressed by identity, not content:
//!
//! ```text
//! packages/
//! └── acme/
//!     └── widget/
//!         ├── 1.0.0.zip
//!         └── 1.1.0.zip
//! ```
//!
//! The recorded checksum is the only validity signal. Downloads are staged
//! in a temporary file next to the destination and renamed into place only
//! after verification, so the destination path either holds a verified
//! archive or nothing.

pub mod transport;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::core::PackageId;
use crate::sources::{Source, SourceError, SourceManager};
use crate::util::fs::{dir_size, remove_dir_all_if_exists};
use crate::util::hash::{checksum_matches, sha256_bytes, sha256_file};

pub use transport::{HttpResponse, HttpTransport, Transport, TransportError};

/// File extension of cached archives.
pub const ARCHIVE_EXT: &str = "zip";

/// Errors produced while fetching archives.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("checksum mismatch for {package}@{version}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        package: PackageId,
        version: String,
        expected: String,
        actual: String,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("GET {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("I/O error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    #[error("invalid version `{0}`")]
    InvalidVersion(String),

    #[error("{package}@{version} not found in any source (tried: {})", attempts.join(", "))]
    NotFoundInAnySource {
        package: PackageId,
        version: String,
        attempts: Vec<String>,
    },
}

/// How an archive was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// A valid archive was already in the cache.
    Cached(PathBuf),
    /// The archive was downloaded and verified.
    Downloaded(PathBuf),
}

impl Fetched {
    /// The archive's location.
    pub fn path(&self) -> &Path {
        match self {
            Fetched::Cached(path) | Fetched::Downloaded(path) => path,
        }
    }

    /// Check whether the archive came from the cache.
    pub fn was_cached(&self) -> bool {
        matches!(self, Fetched::Cached(_))
    }
}

/// One archive in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPackage {
    pub owner: String,
    pub name: String,
    pub version: String,
    pub path: PathBuf,
    pub size: u64,
}

/// The package archive cache.
#[derive(Clone)]
pub struct PackageStore {
    root: PathBuf,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for PackageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageStore").field("root", &self.root).finish()
    }
}

impl PackageStore {
    /// Create a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>, transport: Arc<dyn Transport>) -> Self {
        PackageStore {
            root: root.into(),
            transport,
        }
    }

    /// The cache root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn package_dir(&self, owner: &str, name: &str) -> PathBuf {
        self.root.join(owner).join(name)
    }

    fn archive_path(&self, id: &PackageId, version: &str) -> Result<PathBuf, StoreError> {
        validate_version(version)?;
        Ok(self
            .package_dir(id.owner(), id.name())
            .join(format!("{}.{}", version, ARCHIVE_EXT)))
    }

    /// Check whether an archive exists for a version, without verifying it.
    pub fn has_package(&self, id: &PackageId, version: &str) -> bool {
        self.archive_path(id, version)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    /// Check whether any version of a package is cached.
    ///
    /// This is a presence heuristic: it says nothing about which version a
    /// dependent actually needs.
    pub fn has_any_version(&self, id: &PackageId) -> bool {
        let dir = self.package_dir(id.owner(), id.name());
        let Ok(entries) = fs::read_dir(&dir) else {
            return false;
        };
        entries.flatten().any(|entry| {
            let path = entry.path();
            path.is_file() && path.extension().is_some_and(|ext| ext == ARCHIVE_EXT)
        })
    }

    /// The cached archive for a version, if present.
    pub fn get_package_file(&self, id: &PackageId, version: &str) -> Option<PathBuf> {
        self.archive_path(id, version).ok().filter(|p| p.is_file())
    }

    /// Return a cached archive if it is valid, purging it if it is not.
    fn validate_cached(
        &self,
        id: &PackageId,
        version: &str,
        path: &Path,
        checksum: Option<&str>,
    ) -> Result<bool, StoreError> {
        if !path.is_file() {
            return Ok(false);
        }

        let Some(expected) = checksum else {
            return Ok(true);
        };

        let actual = sha256_file(path).map_err(|e| StoreError::Io {
            path: path.to_path_buf(),
            err: io::Error::other(e),
        })?;
        if checksum_matches(&actual, expected) {
            return Ok(true);
        }

        warn!(
            "cached archive for {}@{} has checksum {}, expected {}; re-downloading",
            id, version, actual, expected
        );
        fs::remove_file(path).map_err(|err| StoreError::Io {
            path: path.to_path_buf(),
            err,
        })?;
        Ok(false)
    }

    /// Download a version from one source into the cache.
    fn fetch_from(
        &self,
        sources: &SourceManager,
        source: &Source,
        id: &PackageId,
        version: &str,
        checksum: Option<&str>,
        dest: &Path,
    ) -> Result<PathBuf, StoreError> {
        let url = sources.build_download_url(source, id.owner(), id.name(), version);
        let headers = sources.build_auth_headers(source)?;

        info!("downloading {}@{} from `{}`", id, version, source.name);
        let response = self.transport.get(&url, &headers)?;
        if !response.is_success() {
            return Err(StoreError::HttpStatus {
                url,
                status: response.status,
            });
        }

        if let Some(expected) = checksum {
            let actual = sha256_bytes(&response.body);
            if !checksum_matches(&actual, expected) {
                return Err(StoreError::ChecksumMismatch {
                    package: id.clone(),
                    version: version.to_string(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        let dir = dest.parent().unwrap_or(&self.root);
        let io_err = |err| StoreError::Io {
            path: dest.to_path_buf(),
            err,
        };
        fs::create_dir_all(dir).map_err(io_err)?;

        let mut staged = NamedTempFile::new_in(dir).map_err(io_err)?;
        staged.write_all(&response.body).map_err(io_err)?;
        staged.as_file().sync_all().map_err(io_err)?;
        staged.persist(dest).map_err(|e| io_err(e.error))?;

        debug!("stored {} ({} bytes)", dest.display(), response.body.len());
        Ok(dest.to_path_buf())
    }

    /// Ensure a version is cached, downloading it from one source.
    ///
    /// With no source name the default source is used. A cached archive
    /// that fails verification is deleted and downloaded again exactly once.
    pub fn download_package(
        &self,
        sources: &SourceManager,
        id: &PackageId,
        version: &str,
        checksum: Option<&str>,
        source_name: Option<&str>,
    ) -> Result<Fetched, StoreError> {
        let dest = self.archive_path(id, version)?;
        if self.validate_cached(id, version, &dest, checksum)? {
            return Ok(Fetched::Cached(dest));
        }

        let source = sources
            .get_source(source_name)?
            .ok_or(SourceError::NoSources)?;

        self.fetch_from(sources, source, id, version, checksum, &dest)
            .map(Fetched::Downloaded)
    }

    /// Ensure a version is cached, trying enabled sources in priority order.
    ///
    /// The first source that delivers a verified archive wins. Failures are
    /// logged and the next source is tried.
    pub fn download_package_with_fallback(
        &self,
        sources: &SourceManager,
        id: &PackageId,
        version: &str,
        checksum: Option<&str>,
    ) -> Result<Fetched, StoreError> {
        let dest = self.archive_path(id, version)?;
        if self.validate_cached(id, version, &dest, checksum)? {
            return Ok(Fetched::Cached(dest));
        }

        let mut attempts = Vec::new();
        for source in sources.list_enabled_sources() {
            match self.fetch_from(sources, source, id, version, checksum, &dest) {
                Ok(path) => return Ok(Fetched::Downloaded(path)),
                Err(e) => {
                    warn!("source `{}` failed for {}@{}: {}", source.name, id, version, e);
                    attempts.push(source.name.clone());
                }
            }
        }

        Err(StoreError::NotFoundInAnySource {
            package: id.clone(),
            version: version.to_string(),
            attempts,
        })
    }

    /// Every archive in the cache, sorted by owner, name and version.
    pub fn list_cached(&self) -> anyhow::Result<Vec<CachedPackage>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut packages = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(3).max_depth(3) {
            let entry =
                entry.with_context(|| format!("failed to read cache: {}", self.root.display()))?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().map_or(true, |ext| ext != ARCHIVE_EXT)
            {
                continue;
            }

            let version = path.file_stem().and_then(|s| s.to_str());
            let name = path.parent().and_then(Path::file_name).and_then(|s| s.to_str());
            let owner = path
                .parent()
                .and_then(Path::parent)
                .and_then(Path::file_name)
                .and_then(|s| s.to_str());

            if let (Some(owner), Some(name), Some(version)) = (owner, name, version) {
                let size = entry
                    .metadata()
                    .with_context(|| format!("failed to stat: {}", path.display()))?
                    .len();
                packages.push(CachedPackage {
                    owner: owner.to_string(),
                    name: name.to_string(),
                    version: version.to_string(),
                    path: path.to_path_buf(),
                    size,
                });
            }
        }

        packages.sort_by(|a, b| {
            (&a.owner, &a.name, &a.version).cmp(&(&b.owner, &b.name, &b.version))
        });
        Ok(packages)
    }

    /// Total bytes on disk under the cache root.
    pub fn get_cache_size(&self) -> anyhow::Result<u64> {
        dir_size(&self.root)
    }

    /// Delete one cached archive. Returns whether anything was removed.
    pub fn remove_package(&self, id: &PackageId, version: &str) -> anyhow::Result<bool> {
        let path = self.archive_path(id, version)?;
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path).with_context(|| format!("failed to remove {}", path.display()))?;
        Ok(true)
    }

    /// Delete every cached archive.
    pub fn clear_cache(&self) -> anyhow::Result<()> {
        remove_dir_all_if_exists(&self.root)
    }
}

/// Reject versions that would escape the package directory.
fn validate_version(version: &str) -> Result<(), StoreError> {
    let bad = version.is_empty()
        || version.starts_with('.')
        || version.contains(['/', '\\'])
        || version.chars().any(char::is_control);
    if bad {
        return Err(StoreError::InvalidVersion(version.to_string()));
    }
    Ok(())
}
