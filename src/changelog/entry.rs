//! Persisted changelog record.
use derive_builder::Builder;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::config::stream::Audience;

/// Explicit marker for presentation fields that still need a human to fill
/// them in.
pub const PLACEHOLDER_URL: &str =
    "https://placeholder.invalid/needs-manual-completion";

/// Fixed label vocabulary of changelog entries.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ChangelogLabel {
    Bugfix,
    Deprecation,
    Feature,
    Improvement,
}

impl ChangelogLabel {
    /// Map a forge or summarizer label onto the vocabulary,
    /// case-insensitively.
    pub fn from_synonym(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "bug" | "bugfix" | "fix" => Some(Self::Bugfix),
            "feature" => Some(Self::Feature),
            "enhancement" | "improvement" => Some(Self::Improvement),
            "deprecation" | "breaking" => Some(Self::Deprecation),
            _ => None,
        }
    }
}

impl Display for ChangelogLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangelogLabel::Bugfix => f.write_str("bugfix"),
            ChangelogLabel::Deprecation => f.write_str("deprecation"),
            ChangelogLabel::Feature => f.write_str("feature"),
            ChangelogLabel::Improvement => f.write_str("improvement"),
        }
    }
}

/// A single announcement in the changelog.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Builder,
)]
#[builder(setter(into))]
pub struct ChangelogEntry {
    /// Globally unique, monotonically assigned identifier
    pub id: u64,
    /// URL-safe form of the title
    pub slug: String,
    #[schemars(length(min = 1, max = 60))]
    pub title: String,
    pub description: String,
    /// RFC 3339 timestamp of the release this entry belongs to
    pub published_at: String,
    pub published: bool,
    pub audience: Audience,
    #[schemars(length(min = 1))]
    pub labels: Vec<ChangelogLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub feature_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub learn_more_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub video_url: Option<String>,
}

impl ChangelogEntry {
    /// Names of presentation fields still set to [`PLACEHOLDER_URL`].
    pub fn placeholder_fields(&self) -> Vec<&'static str> {
        let mut fields = vec![];

        for (name, value) in [
            ("feature_image_url", &self.feature_image_url),
            ("learn_more_url", &self.learn_more_url),
            ("video_url", &self.video_url),
        ] {
            if value.as_deref() == Some(PLACEHOLDER_URL) {
                fields.push(name);
            }
        }

        fields
    }

    pub fn needs_completion(&self) -> bool {
        !self.placeholder_fields().is_empty()
    }
}
