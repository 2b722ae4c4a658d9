//! Package identification - `owner/name`.
//!
//! A PackageId names a package within a source's index, independent of
//! version. Both halves end up as path components (in the index tree and
//! in the package cache), so they are validated on construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error produced when a string is not a valid `owner/name` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid package id `{id}`: {reason}")]
pub struct InvalidPackageId {
    pub id: String,
    pub reason: &'static str,
}

/// A package identifier: owner (or scope) plus package name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId {
    owner: String,
    name: String,
}

impl PackageId {
    /// Create a package ID from its two halves.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, InvalidPackageId> {
        let owner = owner.into();
        let name = name.into();

        for segment in [&owner, &name] {
            if let Err(reason) = validate_segment(segment) {
                return Err(InvalidPackageId {
                    id: format!("{}/{}", owner, name),
                    reason,
                });
            }
        }

        Ok(PackageId { owner, name })
    }

    /// Get the owner half.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get the package name half.
    pub fn name(&self) -> &str {
        &self.name
    }
}

fn validate_segment(segment: &str) -> Result<(), &'static str> {
    if segment.is_empty() {
        return Err("owner and name must not be empty");
    }
    if segment.starts_with('.') {
        return Err("owner and name must not start with `.`");
    }
    if segment.contains(['/', '\\']) {
        return Err("expected exactly one `/` separating owner and name");
    }
    if segment.chars().any(char::is_control) {
        return Err("control characters are not allowed");
    }
    Ok(())
}

impl FromStr for PackageId {
    type Err = InvalidPackageId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name)) => PackageId::new(owner, name).map_err(|e| InvalidPackageId {
                id: s.to_string(),
                reason: e.reason,
            }),
            None => Err(InvalidPackageId {
                id: s.to_string(),
                reason: "expected `owner/name`",
            }),
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl Serialize for PackageId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PackageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let id: PackageId = "acme/widget".parse().unwrap();
        assert_eq!(id.owner(), "acme");
        assert_eq!(id.name(), "widget");
        assert_eq!(id.to_string(), "acme/widget");
    }

    #[test]
    fn test_rejects_malformed_ids() {
        assert!("widget".parse::<PackageId>().is_err());
        assert!("/widget".parse::<PackageId>().is_err());
        assert!("acme/".parse::<PackageId>().is_err());
        assert!("a/b/c".parse::<PackageId>().is_err());
        assert!(".git/config".parse::<PackageId>().is_err());
        assert!("owner/..".parse::<PackageId>().is_err());
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let mut ids: Vec<PackageId> = ["b/z", "a/y", "a/x"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        ids.sort();
        let rendered: Vec<_> = ids.iter().map(|id| id.to_string()).collect();
        assert_eq!(rendered, vec!["a/x", "a/y", "b/z"]);
    }

    #[test]
    fn test_serde_as_string() {
        let id: PackageId = "a/x".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"a/x\"");
        let back: PackageId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
