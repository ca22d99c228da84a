//! Common fixtures shared by the orchestrator test modules.
use std::{path::Path, sync::Arc};

use crate::{
    changelog::store::{ChangelogStore, FileChangelogStore},
    config::{Config, stream::StreamConfigBuilder},
    forge::{
        manager::{ForgeManager, ForgeOptions},
        request::ForgeRelease,
        traits::MockForge,
    },
    grouping::{GroupedEntryDraft, GroupedEntryDraftBuilder},
    image::state::{FileImageStateStore, ImageStateStore},
    orchestrator::{Orchestrator, update::UpdateParams},
    release::tag::ReleaseTag,
    summarizer::traits::{MockSummarizer, Summarizer},
    test_helpers::{
        create_test_source, date, fast_retry_policy, forge_pr, release,
    },
};

pub const STREAM_FILE: &str = "notes/oss.md";
pub const RELEASE_URL: &str = "https://github.com/acme/core/releases/tag/0.91.0";

/// Single `oss` stream fed by `acme/core`.
pub fn test_config() -> Config {
    Config {
        streams: vec![
            StreamConfigBuilder::default()
                .name("oss")
                .markdown_file(STREAM_FILE)
                .sources(vec![create_test_source("acme/core", "")])
                .build()
                .unwrap(),
        ],
        retry: fast_retry_policy(),
        ..Config::default()
    }
}

pub fn update_params(tag: &str) -> UpdateParams {
    UpdateParams {
        repo: "acme/core".parse().unwrap(),
        tag: ReleaseTag::new(tag),
        release_url: RELEASE_URL.to_string(),
        published_at: date(2, 1),
    }
}

/// Forge for `acme/core` publishing `releases`, with pull requests
/// 101..=103 labeled for the release notes and `breaking` among them
/// labeled as breaking. PR `n` merges on January `n - 90`.
pub fn core_forge(releases: Vec<ForgeRelease>, breaking: Vec<u64>) -> MockForge {
    let mut mock = MockForge::new();

    let listed = releases.clone();
    mock.expect_list_releases()
        .returning(move |_| Ok(listed.clone()));

    mock.expect_get_release_by_tag().returning(move |_, tag| {
        Ok(releases.iter().find(|r| r.tag_name == tag).cloned())
    });

    let breaking_hits = breaking.clone();
    mock.expect_search_merged_pull_requests().returning(move |req| {
        Ok(match req.label.as_deref() {
            Some("release-notes") => vec![101, 102, 103],
            Some("breaking") => breaking_hits.clone(),
            _ => vec![],
        })
    });

    mock.expect_get_pull_request().returning(move |_, number| {
        let mut labels = vec!["release-notes", "feature"];
        if breaking.contains(&number) {
            labels.push("breaking");
        }
        Ok(Some(forge_pr(
            number,
            &labels,
            Some((1, (number - 90) as u32)),
        )))
    });

    mock
}

/// Default release history: 0.90.0 on January 1st, 0.91.0 on February 1st.
pub fn core_releases() -> Vec<ForgeRelease> {
    vec![release("0.90.0", 1, 1), release("0.91.0", 2, 1)]
}

pub fn draft(title: &str, prs: &[u64]) -> GroupedEntryDraft {
    GroupedEntryDraftBuilder::default()
        .title(title)
        .description(format!("{title}, explained for readers."))
        .pull_requests(
            prs.iter()
                .map(|n| format!("acme/core#{n}"))
                .collect::<Vec<_>>(),
        )
        .build()
        .unwrap()
}

/// Summarizer grouping into two entries, with one breaking bullet and a
/// short body.
pub fn summarizer() -> MockSummarizer {
    let mut mock = MockSummarizer::new();

    mock.expect_group_entries().returning(|_| {
        Ok(vec![
            draft("Faster pipelines", &[101, 103]),
            draft("Legacy API removal", &[102]),
        ])
    });

    mock.expect_breaking_bullets()
        .returning(|_| Ok(vec!["- Removed the legacy v1 API".to_string()]));

    mock.expect_release_body()
        .returning(|_| Ok("### Highlights\n\nPipelines run faster.".into()));

    mock
}

/// Orchestrator rooted at `root` with file-backed stores.
pub fn orchestrator(
    root: &Path,
    config: Config,
    forge: MockForge,
    summarizer: MockSummarizer,
    dry_run: bool,
) -> Orchestrator {
    let changelog_store: Arc<dyn ChangelogStore> =
        Arc::new(FileChangelogStore::new(root.join(&config.changelog_path)));
    let image_store: Arc<dyn ImageStateStore> =
        Arc::new(FileImageStateStore::new(root.join(&config.image_state_path)));
    let summarizer: Arc<dyn Summarizer> = Arc::new(summarizer);

    let forge = ForgeManager::new(
        Box::new(forge),
        ForgeOptions {
            dry_run,
            retry: fast_retry_policy(),
        },
    );

    Orchestrator::builder()
        .config(Arc::new(config))
        .forge(Arc::new(forge))
        .summarizer(summarizer)
        .changelog_store(changelog_store)
        .image_store(image_store)
        .root(root.to_path_buf())
        .dry_run(dry_run)
        .build()
        .unwrap()
}
