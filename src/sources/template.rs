//! Archive URL templates.
//!
//! A template is parsed once, when its source is configured, into literal
//! and placeholder segments. Only four placeholders exist:
//!
//! | placeholder    | value                              |
//! |----------------|------------------------------------|
//! | `${url}`       | the source base URL (no trailing /) |
//! | `${username}`  | package owner (alias `${owner}`)   |
//! | `${name}`      | package name                       |
//! | `${version}`   | package version                    |
//!
//! Anything else inside `${...}` is rejected, so an expanded URL can never
//! carry an unexpanded placeholder.

use std::fmt;

use crate::sources::SourceError;

/// Template used when a source does not configure one.
pub const DEFAULT_URL_TEMPLATE: &str = "${url}/user/${username}/${name}/${version}.zip";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder {
    Url,
    Owner,
    Name,
    Version,
}

impl Placeholder {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "url" => Some(Placeholder::Url),
            "username" | "owner" => Some(Placeholder::Owner),
            "name" => Some(Placeholder::Name),
            "version" => Some(Placeholder::Version),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// Values substituted into a template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateVars<'a> {
    pub url: &'a str,
    pub owner: &'a str,
    pub name: &'a str,
    pub version: &'a str,
}

/// A parsed archive URL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl UrlTemplate {
    /// Parse a template string.
    pub fn parse(raw: &str) -> Result<Self, SourceError> {
        let invalid = |reason: String| SourceError::InvalidTemplate {
            template: raw.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        let mut rest = raw;

        while let Some(start) = rest.find("${") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }

            let after = &rest[start + 2..];
            let end = after
                .find('}')
                .ok_or_else(|| invalid("unterminated `${`".to_string()))?;

            let name = &after[..end];
            let placeholder = Placeholder::parse(name)
                .ok_or_else(|| invalid(format!("unknown placeholder `${{{}}}`", name)))?;
            segments.push(Segment::Placeholder(placeholder));

            rest = &after[end + 1..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(UrlTemplate {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Expand the template.
    pub fn expand(&self, vars: &TemplateVars<'_>) -> String {
        let mut out = String::with_capacity(self.raw.len() + 32);
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Placeholder(Placeholder::Url) => out.push_str(vars.url.trim_end_matches('/')),
                Segment::Placeholder(Placeholder::Owner) => out.push_str(vars.owner),
                Segment::Placeholder(Placeholder::Name) => out.push_str(vars.name),
                Segment::Placeholder(Placeholder::Version) => out.push_str(vars.version),
            }
        }
        out
    }

    /// The template as configured.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Default for UrlTemplate {
    fn default() -> Self {
        let lit = |s: &str| Segment::Literal(s.to_string());
        UrlTemplate {
            raw: DEFAULT_URL_TEMPLATE.to_string(),
            segments: vec![
                Segment::Placeholder(Placeholder::Url),
                lit("/user/"),
                Segment::Placeholder(Placeholder::Owner),
                lit("/"),
                Segment::Placeholder(Placeholder::Name),
                lit("/"),
                Segment::Placeholder(Placeholder::Version),
                lit(".zip"),
            ],
        }
    }
}

impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
