//! Package selection.
//!
//! Turns glob patterns into the closed set of packages to mirror. The
//! resolver decides *which packages* are needed, never which versions:
//! dependency requirements are not interpreted, only dependency names.

pub mod errors;
pub mod resolve;
pub mod version;

pub use errors::ResolveError;
pub use resolve::ResolutionResult;

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::pattern::matches_any;
use crate::core::{PackageId, Pattern};
use crate::index::IndexManager;
use crate::sources::Source;
use crate::store::PackageStore;
use crate::util::Shell;

/// What to resolve.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Glob patterns selecting packages by `owner/name`
    pub patterns: Vec<String>,

    /// Select every package in the index
    pub full: bool,

    /// Do not follow dependencies at all
    pub strict: bool,

    /// Suppress warnings about unselected dependencies
    pub quiet: bool,
}

/// Computes package closures against one source's index.
pub struct DependencyResolver<'a> {
    index: &'a IndexManager,
    store: &'a PackageStore,
    shell: Arc<Shell>,
}

impl<'a> DependencyResolver<'a> {
    /// Create a resolver.
    pub fn new(index: &'a IndexManager, store: &'a PackageStore, shell: Arc<Shell>) -> Self {
        DependencyResolver { index, store, shell }
    }

    /// Resolve the packages to mirror from `source`.
    pub fn resolve(
        &self,
        source: &Source,
        options: &ResolveOptions,
    ) -> Result<ResolutionResult, ResolveError> {
        if !options.full && options.patterns.is_empty() {
            return Err(ResolveError::NoPatterns);
        }

        let patterns = options
            .patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|err| ResolveError::InvalidPattern {
                    pattern: p.clone(),
                    err,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for pattern in patterns.iter().filter(|p| !p.spans_owner_and_name()) {
            self.shell.warn(format!(
                "pattern `{}` has no `/` and cannot match any `owner/name` id; did you mean `{}/*` or `*/{}`?",
                pattern, pattern, pattern
            ));
        }

        let known = self
            .index
            .list_packages_from_source(source)
            .map_err(|err| ResolveError::Index {
                name: source.name.clone(),
                err,
            })?;

        let mut result = ResolutionResult {
            packages: if options.full {
                known.into_iter().collect()
            } else {
                known
                    .into_iter()
                    .filter(|id| matches_any(&patterns, id))
                    .collect()
            },
            ..Default::default()
        };
        debug!(
            "selected {} packages from `{}` before dependencies",
            result.packages.len(),
            source.name
        );

        if !options.strict {
            self.follow_dependencies(source, &patterns, &mut result);
        }

        result.cached = result
            .packages
            .iter()
            .filter(|id| self.store.has_any_version(id))
            .cloned()
            .collect();

        if !options.quiet {
            self.warn_skipped(&result);
        }

        Ok(result)
    }

    /// Expand the selection along dependency edges whose target also
    /// matches one of the original patterns.
    fn follow_dependencies(&self, source: &Source, patterns: &[Pattern], result: &mut ResolutionResult) {
        let mut worklist: VecDeque<PackageId> = result.packages.iter().cloned().collect();
        let mut processed: HashSet<PackageId> = HashSet::new();

        while let Some(id) = worklist.pop_front() {
            if !processed.insert(id.clone()) {
                continue;
            }

            let metadata = match self.index.get_package_from_source(source, &id) {
                Ok(Some(metadata)) => metadata,
                Ok(None) => {
                    debug!("{} has no index entry in `{}`", id, source.name);
                    continue;
                }
                Err(e) => {
                    debug!("dropping {} from traversal: {}", id, e);
                    continue;
                }
            };

            let Some(latest) = metadata.latest() else {
                continue;
            };

            for dep in latest.deps.keys() {
                let dep_id: PackageId = match dep.parse() {
                    Ok(dep_id) => dep_id,
                    Err(e) => {
                        warn!("ignoring dependency of {}: {}", id, e);
                        continue;
                    }
                };

                if result.packages.contains(&dep_id) {
                    continue;
                }

                if matches_any(patterns, &dep_id) {
                    result.packages.insert(dep_id.clone());
                    worklist.push_back(dep_id);
                } else {
                    result.record_skip(dep_id, id.clone());
                }
            }
        }
    }

    fn warn_skipped(&self, result: &ResolutionResult) {
        for (dep, requirers) in &result.skipped {
            // Any cached version is taken as good enough to stay silent.
            if self.store.has_any_version(dep) {
                continue;
            }
            let requirers: BTreeSet<String> = requirers.iter().map(|r| r.to_string()).collect();
            self.shell.warn(format!(
                "{} is required by {} but not selected for mirroring",
                dep,
                requirers.into_iter().collect::<Vec<_>>().join(", ")
            ));
        }
    }
}
