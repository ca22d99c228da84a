//! Common test helper functions shared across test modules.
//!
//! Dates passed as `(month, day)` all fall in 2024 at midnight UTC.
use chrono::{DateTime, TimeZone, Utc};

use crate::{
    changelog::entry::{ChangelogEntry, ChangelogEntryBuilder, ChangelogLabel},
    collector::PullRequest,
    config::stream::{Audience, SourceConfig, SourceConfigBuilder},
    forge::{
        manager::{ForgeManager, ForgeOptions},
        request::{ForgePullRequest, ForgeRelease, RepoId},
        traits::MockForge,
    },
    retry::{RetryPolicy, RetryPolicyBuilder},
};

pub fn date(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, 0, 0, 0).unwrap()
}

/// Retry policy with millisecond backoff so failing tests stay fast.
pub fn fast_retry_policy() -> RetryPolicy {
    RetryPolicyBuilder::default()
        .max_attempts(3u32)
        .initial_delay_ms(1u64)
        .max_delay_ms(2u64)
        .jitter_ms(0u64)
        .timeout_secs(5u64)
        .build()
        .unwrap()
}

/// Wraps a mock forge in a manager using [`fast_retry_policy`].
pub fn create_test_forge(mock: MockForge) -> ForgeManager {
    ForgeManager::new(
        Box::new(mock),
        ForgeOptions {
            dry_run: false,
            retry: fast_retry_policy(),
        },
    )
}

/// Source on the `main` branch with the given tag prefix.
pub fn create_test_source(repo: &str, prefix: &str) -> SourceConfig {
    SourceConfigBuilder::default()
        .repo(repo.parse::<RepoId>().unwrap())
        .tag_prefix(prefix)
        .build()
        .unwrap()
}

/// Published release named `tag` (including any prefix).
pub fn release(tag: &str, month: u32, day: u32) -> ForgeRelease {
    ForgeRelease {
        id: (month * 100 + day) as u64,
        tag_name: tag.to_string(),
        body: String::new(),
        published_at: Some(date(month, day)),
        created_at: Some(date(month, day)),
    }
}

/// Forge pull request detail; `merged` of `None` means not merged.
pub fn forge_pr(
    number: u64,
    labels: &[&str],
    merged: Option<(u32, u32)>,
) -> ForgePullRequest {
    ForgePullRequest {
        number,
        title: format!("Change number {number}"),
        url: format!("https://github.test/pull/{number}"),
        author: "octocat".to_string(),
        body: format!(
            "This pull request changes how number {number} behaves in detail."
        ),
        labels: labels.iter().map(|l| l.to_string()).collect(),
        merged_at: merged.map(|(m, d)| date(m, d)),
    }
}

/// Normalized pull request of `repo`, merged on the given date.
pub fn pull_request(
    repo: &str,
    number: u64,
    labels: &[&str],
    merged: (u32, u32),
) -> PullRequest {
    let repo: RepoId = repo.parse().unwrap();
    PullRequest {
        number,
        title: format!("Change number {number}"),
        url: format!("https://github.com/{repo}/pull/{number}"),
        author: "octocat".to_string(),
        body: format!(
            "This pull request changes how number {number} behaves in detail."
        ),
        labels: labels.iter().map(|l| l.to_string()).collect(),
        merged_at: date(merged.0, merged.1),
        repo,
    }
}

/// Complete changelog entry with the given id.
pub fn changelog_entry(id: u64) -> ChangelogEntry {
    ChangelogEntryBuilder::default()
        .id(id)
        .slug(format!("entry-{id}"))
        .title(format!("Entry {id}"))
        .description(format!("Description of entry {id}."))
        .published_at("2024-01-15T00:00:00Z")
        .published(true)
        .audience(Audience::Oss)
        .labels(vec![ChangelogLabel::Feature])
        .build()
        .unwrap()
}
