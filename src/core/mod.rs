//! Core data structures for Depot.

pub mod package_id;
pub mod pattern;
pub mod summary;

pub use package_id::{InvalidPackageId, PackageId};
pub use pattern::{match_glob, Pattern};
pub use summary::{PackageMetadata, PackageVersion};
