//! Tuning sections of `release-scribe.toml` for the individual pipeline
//! stages.
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::image::DEFAULT_MAX_IMAGE_INDEX;

pub const DEFAULT_IMAGE_URL_TEMPLATE: &str =
    "https://public-flavor-logos.s3.eu-central-1.amazonaws.com/projects/{index}.jpg";

/// Illustration rotation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct ImageConfig {
    /// Number of illustrations in the rotation; indices run 1..=max_index
    pub max_index: u32,
    /// Illustration URL with an `{index}` placeholder
    pub url_template: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_index: DEFAULT_MAX_IMAGE_INDEX,
            url_template: DEFAULT_IMAGE_URL_TEMPLATE.to_string(),
        }
    }
}

/// Breaking-change detection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct BreakingConfig {
    /// Labels that mark a pull request as breaking
    pub labels: Vec<String>,
    /// Emit a "needs manual review" breaking section for major bumps with
    /// no breaking-labeled pull requests
    pub major_bump_placeholder: bool,
}

impl Default for BreakingConfig {
    fn default() -> Self {
        Self {
            labels: vec![
                "breaking".to_string(),
                "breaking-change".to_string(),
                "breaking change".to_string(),
            ],
            major_bump_placeholder: true,
        }
    }
}

/// Changelog grouping settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Maximum number of changelog entries per release
    pub max_groups: usize,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self { max_groups: 3 }
    }
}

/// Thresholds for advisory items in the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttentionConfig {
    /// Pull request descriptions shorter than this many characters are
    /// flagged
    pub short_description_threshold: usize,
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self {
            short_description_threshold: 50,
        }
    }
}

/// Defaults for the `sync` command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Repository whose release descriptions receive the notes
    pub target_repo: Option<String>,
    /// Document the notes are extracted from
    pub markdown_file: Option<String>,
}
