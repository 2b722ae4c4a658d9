//! Package sources.
//!
//! A source is a named upstream registry: where its index lives, how archive
//! URLs are built, which credentials to send, and where it ranks when a
//! package has to be fetched from whichever source has it.

pub mod auth;
pub mod manager;
pub mod source;
pub mod template;

pub use auth::{build_auth_headers, AuthHeaders};
pub use manager::SourceManager;
pub use source::{AuthConfig, AuthKind, IndexKind, Source, SourceKind, LEGACY_SOURCE_NAME};
pub use template::{UrlTemplate, DEFAULT_URL_TEMPLATE};

use thiserror::Error;

/// Errors raised while configuring or using sources.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source `{0}` not found")]
    NotFound(String),

    #[error("source `{0}` is disabled")]
    Disabled(String),

    #[error("source `{0}` is already configured")]
    Duplicate(String),

    #[error("source name must not be empty")]
    EmptyName,

    #[error("no sources are configured")]
    NoSources,

    #[error("source `{name}` has invalid priority {priority} (expected 0..=1000)")]
    InvalidPriority { name: String, priority: u32 },

    #[error("invalid package url pattern `{template}`: {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("{kind} authentication requires `{field}`")]
    IncompleteAuth {
        kind: &'static str,
        field: &'static str,
    },

    #[error("environment variable `{0}` referenced in credentials is not set")]
    MissingCredential(String),
}
