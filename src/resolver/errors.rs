//! Resolution error types.

use thiserror::Error;

use crate::index::IndexError;

/// Error that aborts a resolution.
///
/// Per-package metadata problems never surface here; they only drop the
/// affected package from traversal.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid package pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        err: regex::Error,
    },

    #[error("no package patterns given; pass at least one pattern or request a full mirror")]
    NoPatterns,

    #[error("failed to list packages of source `{name}`")]
    Index {
        name: String,
        #[source]
        err: IndexError,
    },
}
