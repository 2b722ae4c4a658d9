//! The outcome of a resolution.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::PackageId;

/// The set of packages to mirror, plus the edges that were left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionResult {
    /// Packages selected for mirroring
    pub packages: BTreeSet<PackageId>,

    /// Unselected dependency -> packages that require it
    pub skipped: BTreeMap<PackageId, Vec<PackageId>>,

    /// Selected packages with at least one version already cached
    pub cached: BTreeSet<PackageId>,
}

impl ResolutionResult {
    /// Record that `requirer` depends on the unselected `dependency`.
    pub fn record_skip(&mut self, dependency: PackageId, requirer: PackageId) {
        let requirers = self.skipped.entry(dependency).or_default();
        if !requirers.contains(&requirer) {
            requirers.push(requirer);
        }
    }

    /// Number of selected packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Check if nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
