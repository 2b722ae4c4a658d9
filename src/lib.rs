//! Depot - a source-aware mirror and offline cache for package registries
//!
//! This crate provides the core library functionality for Depot:
//! source configuration, per-source package indexes, package selection
//! and the verified archive cache.

pub mod core;
pub mod index;
pub mod ops;
pub mod resolver;
pub mod sources;
pub mod store;
pub mod util;

/// Test utilities and mocks for Depot unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a mock HTTP transport and index fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{PackageId, PackageMetadata, PackageVersion};
pub use index::IndexManager;
pub use resolver::{DependencyResolver, ResolutionResult};
pub use sources::{Source, SourceManager};
pub use store::PackageStore;
pub use util::context::GlobalContext;
