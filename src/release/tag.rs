//! Release tags with repository-specific prefixes and strict version parsing.
use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt::Display, sync::LazyLock};

/// Matches a strict `major.minor.patch` version with an optional `v` prefix.
static STRICT_VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?(?<major>\d+)\.(?<minor>\d+)\.(?<patch>\d+)$").unwrap()
});

/// Parse `major.minor.patch` (optionally `v`-prefixed). Pre-release and build
/// metadata are rejected.
pub fn parse_strict_version(value: &str) -> Option<Version> {
    let caps = STRICT_VERSION_REGEX.captures(value.trim())?;
    let major = caps["major"].parse().ok()?;
    let minor = caps["minor"].parse().ok()?;
    let patch = caps["patch"].parse().ok()?;
    Some(Version::new(major, minor, patch))
}

/// A release tag in its unprefixed, internal form.
///
/// Tags are compared by parsed version only. Two tags whose versions can't
/// both be parsed are incomparable and [`ReleaseTag::compare`] returns
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseTag(String);

impl ReleaseTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_string())
    }

    /// Build from a tag name as published on the forge, stripping `prefix`
    /// when present.
    pub fn from_forge(name: &str, prefix: &str) -> Self {
        let stripped = if prefix.is_empty() {
            name
        } else {
            name.strip_prefix(prefix).unwrap_or(name)
        };
        Self::new(stripped)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Tag name as published on the forge.
    pub fn prefixed(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.0)
    }

    pub fn version(&self) -> Option<Version> {
        parse_strict_version(&self.0)
    }

    pub fn compare(&self, other: &ReleaseTag) -> Option<Ordering> {
        Some(self.version()?.cmp(&other.version()?))
    }

    /// True only when both tags parse and this one is strictly greater.
    pub fn is_newer_than(&self, other: &ReleaseTag) -> bool {
        matches!(self.compare(other), Some(Ordering::Greater))
    }
}

impl Display for ReleaseTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReleaseTag {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
