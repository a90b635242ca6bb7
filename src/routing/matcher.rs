//! Path prefix matching.
//!
//! # Responsibilities
//! - Validate configured prefixes
//! - Match request paths on segment boundaries
//! - Compute the path forwarded to the backend
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - `/auth` matches `/auth` and `/auth/...`, never `/authz`
//! - No regex to guarantee O(n) matching

use thiserror::Error;

/// Reasons a configured prefix is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrefixError {
    #[error("path prefix {0:?} must start with '/'")]
    MissingLeadingSlash(String),

    #[error("path prefix \"/\" would capture every request")]
    Root,

    #[error("path prefix {0:?} must not end with '/'")]
    TrailingSlash(String),

    #[error("path prefix {0:?} contains an empty segment")]
    EmptySegment(String),

    #[error("path prefix {0:?} must not contain '?', '#' or whitespace")]
    InvalidCharacter(String),
}

/// A validated path prefix owned by one service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathPrefix(String);

impl PathPrefix {
    /// Validate a configured prefix.
    pub fn parse(raw: &str) -> Result<Self, PrefixError> {
        if !raw.starts_with('/') {
            return Err(PrefixError::MissingLeadingSlash(raw.to_string()));
        }
        if raw == "/" {
            return Err(PrefixError::Root);
        }
        if raw.ends_with('/') {
            return Err(PrefixError::TrailingSlash(raw.to_string()));
        }
        if raw.contains("//") {
            return Err(PrefixError::EmptySegment(raw.to_string()));
        }
        if raw.chars().any(|c| c == '?' || c == '#' || c.is_whitespace()) {
            return Err(PrefixError::InvalidCharacter(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix length in bytes; longer prefixes are more specific.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: a parsed prefix holds at least one segment.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if `path` is this prefix or lies below it.
    pub fn matches(&self, path: &str) -> bool {
        self.strip(path).is_some()
    }

    /// Remove the prefix from `path`.
    ///
    /// Returns the remainder with its leading `/`, or `/` when the prefix
    /// consumed the whole path. Returns `None` when `path` does not match.
    pub fn strip<'p>(&self, path: &'p str) -> Option<&'p str> {
        let rest = path.strip_prefix(self.0.as_str())?;
        if rest.is_empty() {
            Some("/")
        } else if rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }
}

impl std::fmt::Display for PathPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
