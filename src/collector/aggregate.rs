use log::*;
use std::collections::HashMap;

use crate::{
    Result,
    collector::{PullRequest, collect_merged_prs},
    config::stream::{SourceConfig, StreamConfig},
    forge::{manager::ForgeManager, request::RepoId},
    release::{
        tag::ReleaseTag,
        window::{ReleaseWindow, WindowResolver},
    },
};

/// A source repository together with the release it contributes and the
/// merge window that release covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceWindow {
    pub source: SourceConfig,
    pub tag: ReleaseTag,
    pub previous: Option<ReleaseTag>,
    pub window: ReleaseWindow,
    pub primary: bool,
}

/// Collects pull requests for a stream across all of its sources.
pub struct Aggregator<'a> {
    forge: &'a ForgeManager,
    windows: Vec<SourceWindow>,
}

impl<'a> Aggregator<'a> {
    /// Resolve the release and window for every source of `stream`.
    ///
    /// The triggering repository uses `tag` directly. Every other source
    /// uses its own latest published release; sources without one are
    /// skipped.
    pub async fn resolve(
        forge: &'a ForgeManager,
        stream: &StreamConfig,
        trigger: &RepoId,
        tag: &ReleaseTag,
    ) -> Result<Self> {
        let resolver = WindowResolver::new(forge);
        let mut windows = vec![];

        for source in stream.sources_for_trigger(trigger) {
            let primary = &source.repo == trigger;

            let tag = if primary {
                tag.clone()
            } else {
                match resolver.latest_tag(&source).await? {
                    Some(latest) => latest,
                    None => {
                        warn!(
                            "skipping bundled source {}: no published release",
                            source.repo
                        );
                        continue;
                    }
                }
            };

            let previous = resolver.previous_tag(&source, &tag).await?;
            let window = resolver
                .release_window(&source, previous.as_ref(), &tag)
                .await?;

            info!(
                "{}: {} -> {tag} ({} .. {})",
                source.repo,
                previous
                    .as_ref()
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "(none)".into()),
                window.since,
                window.until
            );

            windows.push(SourceWindow {
                source,
                tag,
                previous,
                window,
                primary,
            });
        }

        Ok(Self { forge, windows })
    }

    pub fn windows(&self) -> &[SourceWindow] {
        &self.windows
    }

    /// Window of the triggering repository.
    pub fn primary(&self) -> Option<&SourceWindow> {
        self.windows.iter().find(|w| w.primary)
    }

    /// Pull requests carrying `label` across every resolved source,
    /// deduplicated and ascending by merge timestamp.
    pub async fn collect(&self, label: &str) -> Result<Vec<PullRequest>> {
        let mut all = vec![];

        for sw in self.windows.iter() {
            let prs =
                collect_merged_prs(self.forge, &sw.source, &sw.window, Some(label))
                    .await?;
            all.extend(prs);
        }

        Ok(dedupe_pull_requests(all))
    }

    /// Union of [`Aggregator::collect`] over every label in `labels`,
    /// deduplicated the same way.
    pub async fn collect_any(
        &self,
        labels: &[String],
    ) -> Result<Vec<PullRequest>> {
        let mut all = vec![];

        for label in labels.iter() {
            all.extend(self.collect(label).await?);
        }

        Ok(dedupe_pull_requests(all))
    }
}

/// Keep one pull request per (repository, number) pair, the one with the
/// earliest merge timestamp (first seen on ties), then order by merge
/// timestamp ascending. The sort is stable so equal timestamps keep their
/// input order.
pub fn dedupe_pull_requests(prs: Vec<PullRequest>) -> Vec<PullRequest> {
    let mut positions: HashMap<(RepoId, u64), usize> = HashMap::new();
    let mut unique: Vec<PullRequest> = vec![];

    for pr in prs {
        match positions.get(&pr.key()) {
            Some(&index) => {
                if pr.merged_at < unique[index].merged_at {
                    unique[index] = pr;
                }
            }
            None => {
                positions.insert(pr.key(), unique.len());
                unique.push(pr);
            }
        }
    }

    unique.sort_by_key(|pr| pr.merged_at);

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::stream::StreamConfigBuilder,
        forge::traits::MockForge,
        test_helpers::{
            create_test_forge, create_test_source, forge_pr, pull_request,
            release,
        },
    };

    #[test]
    fn dedupe_keeps_earliest_merge_and_sorts() {
        let mut later = pull_request("acme/api", 1, &["feature"], (1, 20));
        later.title = "later".into();
        let mut earliest = pull_request("acme/api", 1, &["feature"], (1, 2));
        earliest.title = "earliest".into();
        let mut tie = pull_request("acme/api", 1, &["feature"], (1, 2));
        tie.title = "tie".into();

        let prs = vec![
            later,
            pull_request("acme/web", 1, &[], (1, 10)),
            earliest,
            pull_request("acme/api", 2, &[], (1, 5)),
            tie,
        ];

        let result = dedupe_pull_requests(prs);

        let keys: Vec<(String, u64)> = result
            .iter()
            .map(|p| (p.repo.to_string(), p.number))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("acme/api".to_string(), 1),
                ("acme/api".to_string(), 2),
                ("acme/web".to_string(), 1),
            ]
        );
        assert_eq!(result[0].title, "earliest");
        assert!(result.windows(2).all(|w| w[0].merged_at <= w[1].merged_at));
    }

    fn stream() -> StreamConfig {
        StreamConfigBuilder::default()
            .name("oss")
            .markdown_file("notes/oss.md")
            .sources(vec![
                create_test_source("acme/core", ""),
                create_test_source("acme/dashboard", "v"),
                create_test_source("acme/empty", ""),
            ])
            .build()
            .unwrap()
    }

    fn mock_forge() -> MockForge {
        let mut mock = MockForge::new();

        mock.expect_list_releases()
            .returning(|repo| match repo.name.as_str() {
                "core" => {
                    Ok(vec![release("0.90.0", 1, 1), release("0.91.0", 2, 1)])
                }
                "dashboard" => Ok(vec![release("v1.4.0", 1, 15)]),
                _ => Ok(vec![]),
            });

        mock.expect_get_latest_release()
            .returning(|repo| match repo.name.as_str() {
                "dashboard" => Ok(Some(release("v1.4.0", 1, 15))),
                _ => Ok(None),
            });

        mock.expect_get_release_by_tag().returning(|_, tag| {
            Ok(match tag {
                "0.90.0" => Some(release("0.90.0", 1, 1)),
                "0.91.0" => Some(release("0.91.0", 2, 1)),
                "v1.4.0" => Some(release("v1.4.0", 1, 15)),
                _ => None,
            })
        });

        mock.expect_search_merged_pull_requests().returning(|req| {
            Ok(match (req.repo.name.as_str(), req.label.as_deref()) {
                ("core", Some("release-notes")) => vec![101, 102],
                ("core", Some("breaking")) => vec![102],
                ("dashboard", Some("release-notes")) => vec![7],
                ("dashboard", Some("breaking-change")) => vec![7],
                _ => vec![],
            })
        });

        mock.expect_get_pull_request().returning(|repo, number| {
            let day = match (repo.name.as_str(), number) {
                ("core", 101) => 10,
                ("core", 102) => 3,
                _ => 12,
            };
            Ok(Some(forge_pr(number, &[], Some((1, day)))))
        });

        mock
    }

    #[tokio::test]
    async fn resolves_primary_and_bundled_sources() {
        let forge = create_test_forge(mock_forge());

        let aggregator = Aggregator::resolve(
            &forge,
            &stream(),
            &"acme/core".parse().unwrap(),
            &ReleaseTag::new("0.91.0"),
        )
        .await
        .unwrap();

        let windows = aggregator.windows();
        assert_eq!(windows.len(), 2);

        let primary = aggregator.primary().unwrap();
        assert_eq!(primary.source.repo.to_string(), "acme/core");
        assert_eq!(primary.previous, Some(ReleaseTag::new("0.90.0")));

        let bundled = &windows[1];
        assert!(!bundled.primary);
        assert_eq!(bundled.tag, ReleaseTag::new("1.4.0"));
        assert_eq!(bundled.previous, None);
    }

    #[tokio::test]
    async fn collects_across_sources_and_labels() {
        let forge = create_test_forge(mock_forge());

        let aggregator = Aggregator::resolve(
            &forge,
            &stream(),
            &"acme/core".parse().unwrap(),
            &ReleaseTag::new("0.91.0"),
        )
        .await
        .unwrap();

        let notes = aggregator.collect("release-notes").await.unwrap();
        let keys: Vec<String> = notes
            .iter()
            .map(|p| format!("{}#{}", p.repo, p.number))
            .collect();
        assert_eq!(
            keys,
            vec!["acme/core#102", "acme/core#101", "acme/dashboard#7"]
        );

        let breaking = aggregator
            .collect_any(&[
                "breaking".to_string(),
                "breaking-change".to_string(),
                "breaking change".to_string(),
            ])
            .await
            .unwrap();
        let keys: Vec<String> = breaking
            .iter()
            .map(|p| format!("{}#{}", p.repo, p.number))
            .collect();
        assert_eq!(keys, vec!["acme/core#102", "acme/dashboard#7"]);
    }
}
