//! Glob patterns for selecting packages by id.
//!
//! `*` matches any run of characters within one segment of the id and `?`
//! matches a single character; everything else is literal. Matches are
//! anchored to the whole `owner/name` string, so `acme/*` selects every
//! package of `acme` and `*/*` selects everything.

use std::fmt;

use regex::Regex;

use crate::core::PackageId;

/// A compiled package selection pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a glob pattern.
    pub fn new(glob: &str) -> Result<Self, regex::Error> {
        let mut source = String::with_capacity(glob.len() * 2 + 2);
        source.push('^');
        for c in glob.chars() {
            match c {
                '*' => source.push_str("[^/]*"),
                '?' => source.push_str("[^/]"),
                other => source.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
            }
        }
        source.push('$');

        Ok(Pattern {
            raw: glob.to_string(),
            regex: Regex::new(&source)?,
        })
    }

    /// Compile a list of patterns.
    pub fn compile_all<S: AsRef<str>>(globs: &[S]) -> Result<Vec<Pattern>, regex::Error> {
        globs.iter().map(|g| Pattern::new(g.as_ref())).collect()
    }

    /// Check whether a raw id string matches.
    pub fn matches_str(&self, id: &str) -> bool {
        self.regex.is_match(id)
    }

    /// Check whether a package id matches.
    pub fn matches(&self, id: &PackageId) -> bool {
        self.matches_str(&id.to_string())
    }

    /// Check whether the pattern can match an `owner/name` id at all.
    ///
    /// Wildcards never cross `/`, so a pattern without one selects nothing.
    pub fn spans_owner_and_name(&self) -> bool {
        self.raw.contains('/')
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Match a package id against a glob pattern.
pub fn match_glob(id: &str, pattern: &str) -> bool {
    Pattern::new(pattern)
        .map(|p| p.matches_str(id))
        .unwrap_or(false)
}

/// Check whether any of the patterns matches.
pub fn matches_any(patterns: &[Pattern], id: &PackageId) -> bool {
    let id = id.to_string();
    patterns.iter().any(|p| p.matches_str(&id))
}
