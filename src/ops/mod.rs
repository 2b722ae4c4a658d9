//! High-level operations.
//!
//! This module contains the implementation of Depot commands.

pub mod mirror;
pub mod registry;

pub use mirror::{mirror, MirrorOptions, MirrorReport};
pub use registry::Registry;
