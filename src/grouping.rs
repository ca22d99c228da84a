//! Assembly of grouped summary drafts into changelog entries.
//!
//! Drafts come from the summarization service and must partition the input
//! pull requests exactly: every pull request covered by one draft, none
//! covered twice, none invented. Pull requests are named by
//! `owner/name#number` so sources sharing a number stay distinct.
//! Violations are reported in full and never repaired.
use derive_builder::Builder;
use log::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    Result,
    changelog::entry::{ChangelogEntry, ChangelogLabel, PLACEHOLDER_URL},
    collector::PullRequest,
    config::stream::Audience,
    error::ReleaseScribeError,
};

/// A summary entry proposed by the summarization service.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    Builder,
)]
#[builder(setter(into), default)]
pub struct GroupedEntryDraft {
    /// Short user-facing headline (at most 60 characters)
    #[schemars(length(min = 1, max = 60))]
    pub title: String,
    /// One or two sentences on what users can now do or benefit from
    pub description: String,
    /// Labels to fall back on when the pull requests carry none that map
    #[serde(default)]
    pub suggested_labels: Vec<ChangelogLabel>,
    /// Pull requests this entry covers, as `owner/name#number`
    pub pull_requests: Vec<String>,
}

/// Check that `drafts` cover every pull request reference exactly once and
/// that there are at most `max_groups` of them.
pub fn validate_partition(
    prs: &[PullRequest],
    drafts: &[GroupedEntryDraft],
    max_groups: usize,
) -> Result<()> {
    if drafts.len() > max_groups {
        return Err(ReleaseScribeError::InvariantViolation(format!(
            "expected at most {max_groups} grouped entries, got {}",
            drafts.len()
        )));
    }

    let expected: BTreeSet<String> =
        prs.iter().map(PullRequest::reference).collect();

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for reference in drafts.iter().flat_map(|d| d.pull_requests.iter()) {
        *counts.entry(reference.trim()).or_default() += 1;
    }

    let duplicated: Vec<String> = counts
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(reference, _)| reference.to_string())
        .collect();

    let missing: Vec<String> = expected
        .iter()
        .filter(|r| !counts.contains_key(r.as_str()))
        .cloned()
        .collect();

    let unknown: Vec<String> = counts
        .keys()
        .filter(|r| !expected.contains(**r))
        .map(|r| r.to_string())
        .collect();

    if duplicated.is_empty() && missing.is_empty() && unknown.is_empty() {
        return Ok(());
    }

    Err(ReleaseScribeError::PartitionViolation {
        duplicated,
        missing,
        unknown,
    })
}

/// Ids for `count` new entries. The first entry gets the highest id and
/// each following entry one less, all above `max_existing`.
pub fn assign_ids(max_existing: u64, count: usize) -> Vec<u64> {
    let count = count as u64;
    (0..count).map(|index| max_existing + (count - index)).collect()
}

/// Map pull request labels onto the changelog vocabulary, falling back to
/// `suggested` and then to `improvement`. Output is sorted and unique.
pub fn map_labels<'a>(
    pr_labels: impl IntoIterator<Item = &'a str>,
    suggested: &[ChangelogLabel],
) -> Vec<ChangelogLabel> {
    let mut mapped: BTreeSet<ChangelogLabel> = pr_labels
        .into_iter()
        .filter_map(ChangelogLabel::from_synonym)
        .collect();

    if mapped.is_empty() {
        mapped.extend(suggested.iter().copied());
    }

    if mapped.is_empty() {
        mapped.insert(ChangelogLabel::Improvement);
    }

    mapped.into_iter().collect()
}

/// Lowercase ASCII slug with non-alphanumeric runs collapsed to `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Release-level values stamped on every assembled entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyContext {
    /// Highest id already persisted in the changelog
    pub max_existing_id: u64,
    pub published_at: String,
    pub audience: Audience,
    pub max_groups: usize,
}

/// Validate `drafts` against `prs` and turn them into changelog entries in
/// draft order, with strictly decreasing ids.
pub fn assemble(
    prs: &[PullRequest],
    drafts: &[GroupedEntryDraft],
    ctx: &AssemblyContext,
) -> Result<Vec<ChangelogEntry>> {
    validate_partition(prs, drafts, ctx.max_groups)?;

    let ids = assign_ids(ctx.max_existing_id, drafts.len());

    let entries = drafts
        .iter()
        .zip(ids)
        .map(|(draft, id)| {
            let covered: BTreeSet<&str> =
                draft.pull_requests.iter().map(|r| r.trim()).collect();
            let labels = map_labels(
                prs.iter()
                    .filter(|pr| covered.contains(pr.reference().as_str()))
                    .flat_map(|pr| pr.labels.iter().map(|l| l.as_str())),
                &draft.suggested_labels,
            );

            debug!(
                "entry {id} \"{}\" covers {:?} with labels {:?}",
                draft.title, draft.pull_requests, labels
            );

            ChangelogEntry {
                id,
                slug: slugify(&draft.title),
                title: draft.title.trim().to_string(),
                description: draft.description.trim().to_string(),
                published_at: ctx.published_at.clone(),
                published: true,
                audience: ctx.audience,
                labels,
                feature_image_url: Some(PLACEHOLDER_URL.to_string()),
                learn_more_url: Some(PLACEHOLDER_URL.to_string()),
                video_url: None,
            }
        })
        .collect();

    Ok(entries)
}
