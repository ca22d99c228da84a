//! Request and response records exchanged with forge implementations.
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::{Result, error::ReleaseScribeError};

/// Repository identifier in `owner/name` form.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl FromStr for RepoId {
    type Err = ReleaseScribeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty()
                    && !name.is_empty()
                    && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(ReleaseScribeError::invalid_config(format!(
                "repository must be in owner/name form: {s}"
            ))),
        }
    }
}

impl TryFrom<String> for RepoId {
    type Error = ReleaseScribeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RepoId> for String {
    fn from(value: RepoId) -> Self {
        value.to_string()
    }
}

impl Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Release as reported by the forge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
#[builder(setter(into), default)]
pub struct ForgeRelease {
    pub id: u64,
    /// Tag name exactly as published, including any prefix.
    pub tag_name: String,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl ForgeRelease {
    /// Publish timestamp, falling back to the creation timestamp.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.published_at.or(self.created_at)
    }
}

/// Search for merged pull requests within a merge-date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrSearchRequest {
    pub repo: RepoId,
    pub base_branch: String,
    pub merged_since: DateTime<Utc>,
    pub merged_until: DateTime<Utc>,
    pub label: Option<String>,
}

impl PrSearchRequest {
    /// Hosting search query string for this request.
    pub fn query(&self) -> String {
        let mut query = format!(
            "repo:{} is:pr is:merged base:{} merged:{}..{}",
            self.repo,
            self.base_branch,
            self.merged_since.format("%Y-%m-%dT%H:%M:%SZ"),
            self.merged_until.format("%Y-%m-%dT%H:%M:%SZ"),
        );

        if let Some(label) = &self.label {
            query.push_str(&format!(" label:\"{label}\""));
        }

        query
    }
}

/// Full pull request detail as reported by the forge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
#[builder(setter(into), default)]
pub struct ForgePullRequest {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub author: String,
    pub body: String,
    pub labels: Vec<String>,
    pub merged_at: Option<DateTime<Utc>>,
}

/// Request to replace the description of an existing release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReleaseRequest {
    pub repo: RepoId,
    pub release_id: u64,
    pub body: String,
}
