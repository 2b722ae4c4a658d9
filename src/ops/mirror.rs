//! Implementation of `depot mirror`.

use std::sync::Mutex;

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::core::PackageId;
use crate::ops::Registry;
use crate::resolver::{DependencyResolver, ResolutionResult, ResolveOptions};
use crate::store::Fetched;
use crate::util::Status;

/// Options for mirror command.
#[derive(Debug, Clone, Default)]
pub struct MirrorOptions {
    /// Glob patterns selecting packages
    pub patterns: Vec<String>,

    /// Mirror every package in the index
    pub full: bool,

    /// Do not follow dependencies
    pub strict: bool,

    /// Suppress warnings about unselected dependencies
    pub quiet: bool,

    /// Mirror from this source only (default: index of the default source,
    /// archives from any enabled source)
    pub source: Option<String>,
}

/// What a mirror run did.
#[derive(Debug, Clone, Default)]
pub struct MirrorReport {
    /// Archives fetched during this run
    pub downloaded: usize,

    /// Archives that were already cached and valid
    pub cached: usize,

    /// Packages or versions that could not be mirrored
    pub failed: usize,

    /// The package selection that was mirrored
    pub resolution: ResolutionResult,
}

impl MirrorReport {
    /// Check whether every selected archive is now cached.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// One archive to fetch.
#[derive(Debug, Clone)]
struct FetchJob {
    id: PackageId,
    version: String,
    checksum: Option<String>,
}

enum FetchOutcome {
    Downloaded,
    Cached,
    Failed,
}

/// Resolve the selection and make sure every non-yanked version of every
/// selected package is in the cache.
///
/// Configuration problems abort the run. Problems with individual packages
/// are reported and counted, and the rest of the batch continues.
pub fn mirror(registry: &Registry, opts: &MirrorOptions) -> Result<MirrorReport> {
    let shell = registry.shell();
    let source = registry.resolve_source(opts.source.as_deref())?;

    if registry.is_offline() {
        info!("offline: using local index of `{}`", source.name);
    } else {
        registry.sync_source(source)?;
    }

    shell.status(Status::Resolving, format!("packages from `{}`", source.name));
    let resolver = DependencyResolver::new(registry.index(), registry.store(), shell.clone());
    let resolution = resolver
        .resolve(
            source,
            &ResolveOptions {
                patterns: opts.patterns.clone(),
                full: opts.full,
                strict: opts.strict,
                quiet: opts.quiet,
            },
        )
        .context("failed to resolve packages")?;

    let mut report = MirrorReport::default();
    let mut jobs = Vec::new();
    for id in &resolution.packages {
        match registry.index().get_package_from_source(source, id) {
            Ok(Some(metadata)) => {
                jobs.extend(metadata.installable().map(|v| FetchJob {
                    id: id.clone(),
                    version: v.version.clone(),
                    checksum: v.checksum().map(str::to_string),
                }));
            }
            Ok(None) => {
                shell.warn(format!("{} not found in the index of `{}`", id, source.name));
                report.failed += 1;
            }
            Err(e) => {
                shell.warn(format!("failed to read metadata of {}: {}", id, e));
                report.failed += 1;
            }
        }
    }

    shell.status(
        Status::Mirroring,
        format!("{} versions of {} packages", jobs.len(), resolution.packages.len()),
    );

    let progress = Mutex::new(shell.progress(jobs.len() as u64, "Mirroring"));
    let explicit = opts.source.as_deref();
    let fetch = |job: &FetchJob| -> FetchOutcome {
        let result = match explicit {
            Some(name) => registry.store().download_package(
                registry.sources(),
                &job.id,
                &job.version,
                job.checksum.as_deref(),
                Some(name),
            ),
            None => registry.store().download_package_with_fallback(
                registry.sources(),
                &job.id,
                &job.version,
                job.checksum.as_deref(),
            ),
        };

        let mut progress = progress.lock().unwrap_or_else(|e| e.into_inner());
        progress.inc(1);
        match result {
            Ok(Fetched::Cached(_)) => FetchOutcome::Cached,
            Ok(Fetched::Downloaded(_)) => {
                progress.println(Status::Downloaded, format!("{}@{}", job.id, job.version));
                FetchOutcome::Downloaded
            }
            Err(e) => {
                debug!("failed to mirror {}@{}: {:?}", job.id, job.version, e);
                progress.println(
                    Status::Warning,
                    format!("failed to mirror {}@{}: {}", job.id, job.version, e),
                );
                FetchOutcome::Failed
            }
        }
    };

    let outcomes: Vec<FetchOutcome> = if registry.jobs() > 1 && jobs.len() > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(registry.jobs())
            .build()
            .context("failed to start download workers")?;
        pool.install(|| jobs.par_iter().map(&fetch).collect())
    } else {
        jobs.iter().map(&fetch).collect()
    };
    progress.lock().unwrap_or_else(|e| e.into_inner()).finish();

    for outcome in outcomes {
        match outcome {
            FetchOutcome::Downloaded => report.downloaded += 1,
            FetchOutcome::Cached => report.cached += 1,
            FetchOutcome::Failed => report.failed += 1,
        }
    }

    info!(
        "mirror of `{}` finished: {} downloaded, {} cached, {} failed",
        source.name, report.downloaded, report.cached, report.failed
    );
    shell.status(
        Status::Finished,
        format!(
            "{} packages: {} downloaded, {} already cached, {} failed",
            resolution.packages.len(),
            report.downloaded,
            report.cached,
            report.failed
        ),
    );

    report.resolution = resolution;
    Ok(report)
}
