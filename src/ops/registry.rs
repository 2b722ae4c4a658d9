//! The registry facade used by commands and serving layers.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::core::{PackageId, PackageMetadata, Pattern};
use crate::index::{IndexManager, SyncOutcome};
use crate::ops::mirror::{mirror, MirrorOptions, MirrorReport};
use crate::sources::{Source, SourceError, SourceManager};
use crate::store::{HttpTransport, PackageStore};
use crate::util::{GlobalContext, Shell, Status};

/// Sources, indexes and the archive cache, wired together.
#[derive(Debug)]
pub struct Registry {
    sources: SourceManager,
    index: IndexManager,
    store: PackageStore,
    shell: Arc<Shell>,
    jobs: usize,
    offline: bool,
}

impl Registry {
    /// Assemble a registry from its parts.
    pub fn new(
        sources: SourceManager,
        index: IndexManager,
        store: PackageStore,
        shell: Arc<Shell>,
    ) -> Self {
        Registry {
            sources,
            index,
            store,
            shell,
            jobs: 1,
            offline: false,
        }
    }

    /// Build a registry from the loaded configuration.
    pub fn from_context(ctx: &GlobalContext, shell: Arc<Shell>) -> Result<Self> {
        let config = ctx.config();
        let sources = SourceManager::from_config(config).context("invalid source configuration")?;
        let transport = HttpTransport::new(ctx.timeout())?;

        Ok(Registry::new(
            sources,
            IndexManager::new(ctx.index_dir()),
            PackageStore::new(ctx.package_dir(), Arc::new(transport)),
            shell,
        )
        .with_jobs(config.jobs())
        .with_offline(ctx.offline()))
    }

    /// Set the number of parallel downloads.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Disable index syncing.
    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn sources(&self) -> &SourceManager {
        &self.sources
    }

    pub fn index(&self) -> &IndexManager {
        &self.index
    }

    pub fn store(&self) -> &PackageStore {
        &self.store
    }

    pub fn shell(&self) -> &Arc<Shell> {
        &self.shell
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// The named source, or the default one. It must exist and be enabled.
    pub fn resolve_source(&self, name: Option<&str>) -> Result<&Source, SourceError> {
        let source = self
            .sources
            .get_source(name)?
            .ok_or(SourceError::NoSources)?;
        if !source.enabled {
            return Err(SourceError::Disabled(source.name.clone()));
        }
        Ok(source)
    }

    /// Sync a source's index, reporting what happened.
    pub fn sync(&self, name: Option<&str>) -> Result<SyncOutcome> {
        let source = self.resolve_source(name)?;
        self.sync_source(source)
    }

    pub(crate) fn sync_source(&self, source: &Source) -> Result<SyncOutcome> {
        self.shell.status(
            Status::Syncing,
            format!("index of `{}` ({})", source.name, source.index_url),
        );

        let outcome = self
            .index
            .sync_source_index(source)
            .with_context(|| format!("failed to sync index of `{}`", source.name))?;

        if outcome == SyncOutcome::Unsynced {
            self.shell.warn(format!(
                "source `{}` has an {} index which cannot be synced; using the local copy as-is",
                source.name, source.index_kind
            ));
        }
        Ok(outcome)
    }

    /// Full metadata of a package.
    pub fn get_package(&self, id: &PackageId, source: Option<&str>) -> Result<Option<PackageMetadata>> {
        let source = self.resolve_source(source)?;
        Ok(self.index.get_package_from_source(source, id)?)
    }

    /// Every package in a source's index.
    pub fn list_packages(&self, source: Option<&str>) -> Result<Vec<PackageId>> {
        let source = self.resolve_source(source)?;
        Ok(self.index.list_packages_from_source(source)?)
    }

    /// Packages whose id matches a glob pattern.
    pub fn list_packages_matching(&self, pattern: &str, source: Option<&str>) -> Result<Vec<PackageId>> {
        let source = self.resolve_source(source)?;
        let pattern =
            Pattern::new(pattern).with_context(|| format!("invalid package pattern `{}`", pattern))?;
        Ok(self.index.list_packages_matching_from_source(source, &pattern)?)
    }

    /// Check whether a version's archive is cached.
    pub fn has_package(&self, id: &PackageId, version: &str) -> bool {
        self.store.has_package(id, version)
    }

    /// The cached archive of a version, for streaming to clients.
    pub fn get_package_file(&self, id: &PackageId, version: &str) -> Option<PathBuf> {
        self.store.get_package_file(id, version)
    }

    /// Mirror packages into the local cache.
    pub fn mirror(&self, options: &MirrorOptions) -> Result<MirrorReport> {
        mirror(self, options)
    }
}
