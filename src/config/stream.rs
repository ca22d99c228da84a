use derive_builder::Builder;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::forge::request::RepoId;

pub const DEFAULT_BASE_BRANCH: &str = "main";

/// Audience a changelog entry is published for.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    #[default]
    Oss,
    Pro,
    All,
}

impl Display for Audience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Audience::Oss => f.write_str("oss"),
            Audience::Pro => f.write_str("pro"),
            Audience::All => f.write_str("all"),
        }
    }
}

/// A repository feeding a release stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into))]
pub struct SourceConfig {
    /// Repository in owner/name form
    pub repo: RepoId,
    /// Branch pull requests must be merged into to count
    #[serde(default = "default_base_branch")]
    #[builder(default = "DEFAULT_BASE_BRANCH.to_string()")]
    pub base_branch: String,
    /// Literal prefix of this repository's release tags, e.g. "v"
    #[serde(default)]
    #[builder(default)]
    pub tag_prefix: String,
}

fn default_base_branch() -> String {
    DEFAULT_BASE_BRANCH.to_string()
}

/// One logical changelog/markdown target fed by one or more repositories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into))]
pub struct StreamConfig {
    /// Display name of the stream, e.g. "oss"
    pub name: String,
    /// Audience stamped on every changelog entry of this stream
    #[serde(default)]
    #[builder(default)]
    pub audience: Audience,
    /// Rolling release notes document this stream writes to
    pub markdown_file: String,
    /// Ask for pull request links in the generated body
    #[serde(default)]
    #[builder(default)]
    pub include_pr_links: bool,
    /// Append a "View full release on GitHub" footer to each section
    #[serde(default = "default_true")]
    #[builder(default = "true")]
    pub include_release_link: bool,
    /// Source repositories feeding this stream
    #[serde(rename = "source")]
    pub sources: Vec<SourceConfig>,
}

fn default_true() -> bool {
    true
}

impl StreamConfig {
    pub fn source_for(&self, repo: &RepoId) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| &s.repo == repo)
    }

    /// Sources ordered with the triggering repository first and the
    /// remaining (bundled) sources in configured order.
    pub fn sources_for_trigger(&self, repo: &RepoId) -> Vec<SourceConfig> {
        let mut ordered = vec![];

        if let Some(primary) = self.source_for(repo) {
            ordered.push(primary.clone());
        }

        ordered.extend(self.sources.iter().filter(|s| &s.repo != repo).cloned());

        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(repo: &str) -> SourceConfig {
        SourceConfigBuilder::default()
            .repo(repo.parse::<RepoId>().unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn source_defaults() {
        let src = source("acme/api");
        assert_eq!(src.base_branch, "main");
        assert_eq!(src.tag_prefix, "");
    }

    #[test]
    fn orders_trigger_first() {
        let stream = StreamConfigBuilder::default()
            .name("oss")
            .markdown_file("notes/oss.md")
            .sources(vec![
                source("acme/core"),
                source("acme/dashboard"),
                source("acme/cli"),
            ])
            .build()
            .unwrap();

        let ordered =
            stream.sources_for_trigger(&"acme/dashboard".parse().unwrap());
        let repos: Vec<String> =
            ordered.iter().map(|s| s.repo.to_string()).collect();
        assert_eq!(repos, vec!["acme/dashboard", "acme/core", "acme/cli"]);
    }

    #[test]
    fn deserializes_from_toml() {
        let stream: StreamConfig = toml::from_str(
            r#"
name = "pro"
audience = "pro"
markdown_file = "notes/pro.md"

[[source]]
repo = "acme/cloud-api"
base_branch = "develop"
tag_prefix = "v"
"#,
        )
        .unwrap();

        assert_eq!(stream.audience, Audience::Pro);
        assert!(stream.include_release_link);
        assert!(!stream.include_pr_links);
        assert_eq!(stream.sources[0].base_branch, "develop");
        assert_eq!(stream.sources[0].tag_prefix, "v");
    }
}
