//! Local copies of each source's package index.
//!
//! # Index Structure
//!
//! ```text
//! index/
//! ├── acme/                  # legacy `upstream` source uses the root
//! │   ├── widget             # one JSON object per line, one per version
//! │   └── gadget
//! └── sources/
//!     └── internal/          # every named source gets its own tree
//!         └── acme/
//!             └── widget
//! ```
//!
//! Hidden entries (such as `.git`) and the reserved `sources` directory are
//! never treated as package owners.

pub mod git;

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::core::{PackageId, PackageMetadata, PackageVersion, Pattern};
use crate::sources::{IndexKind, Source};
use crate::util::fs::is_hidden;

/// Directory under the index root holding per-source trees.
pub const SOURCES_DIR: &str = "sources";

/// Errors produced while reading or syncing an index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to read index at {path}")]
    Read {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    #[error("malformed index entry at {path}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("failed to sync index from {url}: {message}")]
    Sync { url: String, message: String },
}

/// What a sync actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// First sync: the index was cloned.
    Cloned,
    /// An existing checkout was brought up to date.
    Updated,
    /// The index kind cannot be synced; the local copy is whatever exists.
    Unsynced,
}

/// Manages on-disk index trees for all sources.
#[derive(Debug, Clone)]
pub struct IndexManager {
    root: PathBuf,
}

impl IndexManager {
    /// Create a manager rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        IndexManager { root: root.into() }
    }

    /// The index root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory holding a source's index tree.
    pub fn source_dir(&self, source: &Source) -> PathBuf {
        if source.is_legacy() {
            self.root.clone()
        } else {
            self.root.join(SOURCES_DIR).join(&source.name)
        }
    }

    fn package_path(&self, source: &Source, id: &PackageId) -> PathBuf {
        self.source_dir(source).join(id.owner()).join(id.name())
    }

    /// Bring a source's local index up to date.
    pub fn sync_source_index(&self, source: &Source) -> Result<SyncOutcome, IndexError> {
        let dir = self.source_dir(source);

        match source.index_kind {
            IndexKind::Git => {
                if git::is_checkout(&dir) {
                    git::update_index(&source.index_url, &dir)?;
                    Ok(SyncOutcome::Updated)
                } else {
                    if let Some(parent) = dir.parent() {
                        fs::create_dir_all(parent).map_err(|err| IndexError::Read {
                            path: parent.to_path_buf(),
                            err,
                        })?;
                    }
                    git::clone_index(&source.index_url, &dir)?;
                    Ok(SyncOutcome::Cloned)
                }
            }
            IndexKind::Http => {
                fs::create_dir_all(&dir).map_err(|err| IndexError::Read {
                    path: dir.clone(),
                    err,
                })?;
                info!(
                    "source `{}` uses an http index which cannot be synced; using local copy at {}",
                    source.name,
                    dir.display()
                );
                Ok(SyncOutcome::Unsynced)
            }
        }
    }

    /// Read a package's full version history from a source.
    ///
    /// Returns `Ok(None)` when the source has no entry for the package.
    pub fn get_package_from_source(
        &self,
        source: &Source,
        id: &PackageId,
    ) -> Result<Option<PackageMetadata>, IndexError> {
        let path = self.package_path(source, id);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(IndexError::Read { path, err }),
        };

        let mut versions = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let version: PackageVersion =
                serde_json::from_str(line).map_err(|e| IndexError::Parse {
                    path: path.clone(),
                    line: idx + 1,
                    message: e.to_string(),
                })?;
            versions.push(version);
        }

        Ok(Some(PackageMetadata::new(id, versions)))
    }

    /// List every package recorded in a source's index, sorted.
    pub fn list_packages_from_source(&self, source: &Source) -> Result<Vec<PackageId>, IndexError> {
        let dir = self.source_dir(source);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let walker = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(2)
            .into_iter()
            .filter_entry(|entry| {
                let name = entry.file_name();
                if is_hidden(name) {
                    return false;
                }
                !(entry.depth() == 1 && name == SOURCES_DIR)
            });

        let mut packages = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| IndexError::Read {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.clone()),
                err: e
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other("directory loop in index")),
            })?;

            if entry.depth() != 2 || !entry.file_type().is_file() {
                continue;
            }

            let owner = entry
                .path()
                .parent()
                .and_then(Path::file_name)
                .and_then(|n| n.to_str());
            let name = entry.file_name().to_str();

            match (owner, name) {
                (Some(owner), Some(name)) => match PackageId::new(owner, name) {
                    Ok(id) => packages.push(id),
                    Err(e) => debug!("skipping index entry {}: {}", entry.path().display(), e),
                },
                _ => debug!("skipping non-UTF-8 index entry {}", entry.path().display()),
            }
        }

        packages.sort();
        Ok(packages)
    }

    /// List packages in a source whose id matches a glob pattern.
    pub fn list_packages_matching_from_source(
        &self,
        source: &Source,
        pattern: &Pattern,
    ) -> Result<Vec<PackageId>, IndexError> {
        Ok(self
            .list_packages_from_source(source)?
            .into_iter()
            .filter(|id| pattern.matches(id))
            .collect())
    }

    /// Append one version entry to a package's index file.
    ///
    /// Existing lines are never rewritten.
    pub fn write_package_entry(
        &self,
        source: &Source,
        id: &PackageId,
        entry: &PackageVersion,
    ) -> Result<(), IndexError> {
        let path = self.package_path(source, id);
        let io_err = |err| IndexError::Read {
            path: path.clone(),
            err,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let line = serde_json::to_string(entry).map_err(|e| IndexError::Parse {
            path: path.clone(),
            line: 0,
            message: e.to_string(),
        })?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err)?;
        writeln!(file, "{}", line).map_err(io_err)?;

        Ok(())
    }
}
