//! Configuration loading and validation for `release-scribe.toml`.
//!
//! One file describes every release stream (the repositories feeding it and
//! the document it writes to) plus the tuning of each pipeline stage.
use log::*;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path};

use crate::{
    Result,
    error::ReleaseScribeError,
    file_loader::load_file,
    forge::request::RepoId,
    retry::RetryPolicy,
    summarizer::anthropic::DEFAULT_MODEL,
};

/// Per-stage tuning sections.
pub mod pipeline;

/// Release stream and source repository configuration.
pub mod stream;

use pipeline::{
    AttentionConfig, BreakingConfig, GroupingConfig, ImageConfig, SyncConfig,
};
use stream::StreamConfig;

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "release-scribe.toml";
pub const DEFAULT_CHANGELOG_PATH: &str = "changelog.json";
pub const DEFAULT_IMAGE_STATE_PATH: &str = ".image_state";
pub const DEFAULT_RELEASE_NOTES_LABEL: &str = "release-notes";

/// Root configuration structure for `release-scribe.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Structured changelog written by `update`
    pub changelog_path: String,
    /// JSON Schema for the changelog; generated from the entry type if unset
    pub schema_path: Option<String>,
    /// Illustration rotation state file
    pub image_state_path: String,
    /// Label selecting pull requests for the release notes
    pub release_notes_label: String,
    /// Summarization model
    pub model: String,
    pub image: ImageConfig,
    pub breaking: BreakingConfig,
    pub grouping: GroupingConfig,
    pub attention: AttentionConfig,
    pub retry: RetryPolicy,
    pub sync: SyncConfig,
    /// Release streams
    #[serde(rename = "stream")]
    pub streams: Vec<StreamConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            changelog_path: DEFAULT_CHANGELOG_PATH.to_string(),
            schema_path: None,
            image_state_path: DEFAULT_IMAGE_STATE_PATH.to_string(),
            release_notes_label: DEFAULT_RELEASE_NOTES_LABEL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            image: ImageConfig::default(),
            breaking: BreakingConfig::default(),
            grouping: GroupingConfig::default(),
            attention: AttentionConfig::default(),
            retry: RetryPolicy::default(),
            sync: SyncConfig::default(),
            streams: vec![],
        }
    }
}

impl Config {
    /// Parse and validate configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = load_file(path)?.ok_or_else(|| {
            ReleaseScribeError::invalid_config(format!(
                "configuration file not found: {}",
                path.display()
            ))
        })?;

        debug!("loaded configuration from {}", path.display());

        Self::parse(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.streams.is_empty() {
            return Err(ReleaseScribeError::invalid_config(
                "at least one [[stream]] must be configured",
            ));
        }

        if self.image.max_index < 1 {
            return Err(ReleaseScribeError::invalid_config(
                "image.max_index must be at least 1",
            ));
        }

        if self.retry.max_attempts < 1 {
            return Err(ReleaseScribeError::invalid_config(
                "retry.max_attempts must be at least 1",
            ));
        }

        if self.grouping.max_groups < 1 {
            return Err(ReleaseScribeError::invalid_config(
                "grouping.max_groups must be at least 1",
            ));
        }

        if self.breaking.labels.iter().all(|l| l.trim().is_empty()) {
            return Err(ReleaseScribeError::invalid_config(
                "breaking.labels must not be empty",
            ));
        }

        if self.release_notes_label.trim().is_empty() {
            return Err(ReleaseScribeError::invalid_config(
                "release_notes_label must not be empty",
            ));
        }

        let mut owners: HashMap<&RepoId, &str> = HashMap::new();

        for stream in self.streams.iter() {
            if stream.name.trim().is_empty() {
                return Err(ReleaseScribeError::invalid_config(
                    "every stream needs a name",
                ));
            }

            if stream.markdown_file.trim().is_empty() {
                return Err(ReleaseScribeError::invalid_config(format!(
                    "stream {} needs a markdown_file",
                    stream.name
                )));
            }

            if stream.sources.is_empty() {
                return Err(ReleaseScribeError::invalid_config(format!(
                    "stream {} needs at least one [[stream.source]]",
                    stream.name
                )));
            }

            for source in stream.sources.iter() {
                if let Some(other) = owners.insert(&source.repo, &stream.name)
                {
                    return Err(ReleaseScribeError::invalid_config(format!(
                        "repository {} is configured in both stream {other} and stream {}",
                        source.repo, stream.name
                    )));
                }
            }
        }

        Ok(())
    }

    /// The stream the repository `repo` belongs to.
    pub fn stream_for_repo(&self, repo: &RepoId) -> Result<&StreamConfig> {
        self.streams
            .iter()
            .find(|s| s.source_for(repo).is_some())
            .ok_or_else(|| {
                ReleaseScribeError::UnconfiguredRepository(repo.to_string())
            })
    }
    /// Tag prefix configured for `repo` in any stream, or empty when the
    /// repository is not a configured source.
    pub fn tag_prefix_for(&self, repo: &RepoId) -> &str {
        self.streams
            .iter()
            .find_map(|s| s.source_for(repo))
            .map(|source| source.tag_prefix.as_str())
            .unwrap_or_default()
    }
}
