//! Summary of an `update` run.
use serde::Serialize;
use std::fmt::Display;

use crate::{collector::PullRequest, release::tag::ReleaseTag};

/// Non-fatal condition a human should look at before publishing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttentionItem {
    /// Pull request description too short to summarize well
    ShortDescription {
        pr: String,
        url: String,
        length: usize,
    },
    /// Major version bump without any breaking-labeled pull request
    MajorBumpWithoutBreaking {
        previous: Option<ReleaseTag>,
        tag: ReleaseTag,
    },
    /// Changelog entry still carrying placeholder presentation fields
    PlaceholderFields {
        entry_id: u64,
        fields: Vec<String>,
    },
}

impl Display for AttentionItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttentionItem::ShortDescription { pr, url, length } => write!(
                f,
                "{pr} has a short description ({length} chars): {url}"
            ),
            AttentionItem::MajorBumpWithoutBreaking { previous, tag } => {
                let previous = previous
                    .as_ref()
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "(none)".into());
                write!(
                    f,
                    "{previous} -> {tag} is a major bump but no pull request is labeled as breaking"
                )
            }
            AttentionItem::PlaceholderFields { entry_id, fields } => write!(
                f,
                "changelog entry {entry_id} needs manual completion of {}",
                fields.join(", ")
            ),
        }
    }
}

/// Flag every pull request whose trimmed description is shorter than
/// `threshold` characters.
pub fn short_descriptions(
    prs: &[PullRequest],
    threshold: usize,
) -> Vec<AttentionItem> {
    prs.iter()
        .filter_map(|pr| {
            let length = pr.body.trim().chars().count();
            (length < threshold).then(|| AttentionItem::ShortDescription {
                pr: format!("{}#{}", pr.repo, pr.number),
                url: pr.url.clone(),
                length,
            })
        })
        .collect()
}

/// Outcome of an `update` run, printed as JSON at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub stream: String,
    pub tag: Option<ReleaseTag>,
    pub previous_tag: Option<ReleaseTag>,
    pub major_bump: bool,
    pub collected: usize,
    pub breaking: usize,
    pub regular: usize,
    pub entry_ids: Vec<u64>,
    pub image_index: Option<u32>,
    pub markdown_file: Option<String>,
    pub dry_run: bool,
    pub attention: Vec<AttentionItem>,
}
