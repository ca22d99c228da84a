//! Collection of merged pull requests within a release window.
use chrono::{DateTime, Utc};
use futures_util::{StreamExt, TryStreamExt, stream};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    config::stream::SourceConfig,
    forge::{
        config::DEFAULT_FETCH_CONCURRENCY,
        manager::ForgeManager,
        request::{ForgePullRequest, PrSearchRequest, RepoId},
    },
    release::window::ReleaseWindow,
};

/// Aggregation of pull requests across every source of a stream.
pub mod aggregate;

/// A merged pull request normalized from forge detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub author: String,
    pub body: String,
    pub labels: Vec<String>,
    pub merged_at: DateTime<Utc>,
    pub repo: RepoId,
}

impl PullRequest {
    /// Identity used for deduplication across sources.
    pub fn key(&self) -> (RepoId, u64) {
        (self.repo.clone(), self.number)
    }

    /// `owner/name#number`, unique across every source of a stream.
    pub fn reference(&self) -> String {
        format!("{}#{}", self.repo, self.number)
    }

    fn from_forge(repo: &RepoId, pr: ForgePullRequest) -> Option<Self> {
        let merged_at = pr.merged_at?;
        Some(Self {
            number: pr.number,
            title: pr.title,
            url: pr.url,
            author: pr.author,
            body: pr.body,
            labels: pr.labels,
            merged_at,
            repo: repo.clone(),
        })
    }
}

/// Search `source` for pull requests merged into its base branch within
/// `window`, optionally restricted to `label`, and fetch full detail for
/// each hit. Results are ascending by merge timestamp.
pub async fn collect_merged_prs(
    forge: &ForgeManager,
    source: &SourceConfig,
    window: &ReleaseWindow,
    label: Option<&str>,
) -> Result<Vec<PullRequest>> {
    let req = PrSearchRequest {
        repo: source.repo.clone(),
        base_branch: source.base_branch.clone(),
        merged_since: window.since,
        merged_until: window.until,
        label: label.map(|l| l.to_string()),
    };

    let numbers = forge.search_merged_pull_requests(req).await?;

    if numbers.is_empty() {
        debug!("no merged pull requests found in {}", source.repo);
        return Ok(vec![]);
    }

    let concurrency = numbers.len().min(DEFAULT_FETCH_CONCURRENCY);

    let details: Vec<(u64, Option<ForgePullRequest>)> =
        stream::iter(numbers)
            .map(|number| async move {
                let detail =
                    forge.get_pull_request(&source.repo, number).await?;
                Ok::<_, crate::error::ReleaseScribeError>((number, detail))
            })
            .buffer_unordered(concurrency)
            .try_collect()
            .await?;

    let mut prs = vec![];

    for (number, detail) in details {
        let Some(detail) = detail else {
            warn!("skipping {}#{number}: detail not available", source.repo);
            continue;
        };

        let Some(pr) = PullRequest::from_forge(&source.repo, detail) else {
            warn!(
                "skipping {}#{number}: no merge timestamp reported yet",
                source.repo
            );
            continue;
        };

        if !window.contains(&pr.merged_at) {
            debug!(
                "skipping {}#{number}: merged at {} outside window",
                source.repo, pr.merged_at
            );
            continue;
        }

        prs.push(pr);
    }

    prs.sort_by(|a, b| {
        a.merged_at.cmp(&b.merged_at).then(a.number.cmp(&b.number))
    });

    info!(
        "collected {} pull requests from {}{}",
        prs.len(),
        source.repo,
        label.map(|l| format!(" with label \"{l}\"")).unwrap_or_default()
    );

    Ok(prs)
}
