//! Version ordering for index entries.
//!
//! Published versions are not guaranteed to be semver, so ordering is a
//! plain component-wise numeric comparison of the dot-separated parts.
//! Components that are missing or not numeric compare as zero.

use std::cmp::Ordering;

use crate::core::PackageVersion;

fn component(part: Option<&str>) -> u64 {
    part.and_then(|p| p.trim().parse().ok()).unwrap_or(0)
}

/// Compare two version strings.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left: Vec<&str> = a.split('.').collect();
    let right: Vec<&str> = b.split('.').collect();
    let len = left.len().max(right.len());

    for i in 0..len {
        let ord = component(left.get(i).copied()).cmp(&component(right.get(i).copied()));
        if ord != Ordering::Equal {
            return ord;
        }
    }

    Ordering::Equal
}

/// The highest non-yanked version. Ties go to the earliest entry.
pub fn latest_version(versions: &[PackageVersion]) -> Option<&PackageVersion> {
    let mut best: Option<&PackageVersion> = None;
    for candidate in versions.iter().filter(|v| !v.is_yanked()) {
        match best {
            Some(current)
                if compare_versions(&candidate.version, &current.version) != Ordering::Greater => {}
            _ => best = Some(candidate),
        }
    }
    best
}
