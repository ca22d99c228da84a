//! Manager that wraps forge implementations
use log::*;

use crate::{
    Result,
    forge::{
        request::{
            ForgePullRequest, ForgeRelease, PrSearchRequest, RepoId,
            UpdateReleaseRequest,
        },
        traits::Forge,
    },
    retry::RetryPolicy,
};

/// Options applied to every call made through the manager.
#[derive(Debug, Clone, Default)]
pub struct ForgeOptions {
    pub dry_run: bool,
    pub retry: RetryPolicy,
}

/// Wraps a [`Forge`] so every call goes through the retry policy and write
/// operations honour dry-run mode.
pub struct ForgeManager {
    forge: Box<dyn Forge>,
    options: ForgeOptions,
}

impl ForgeManager {
    pub fn new(forge: Box<dyn Forge>, options: ForgeOptions) -> Self {
        Self { forge, options }
    }

    pub fn dry_run(&self) -> bool {
        self.options.dry_run
    }

    pub async fn list_releases(
        &self,
        repo: &RepoId,
    ) -> Result<Vec<ForgeRelease>> {
        debug!("listing releases for {repo}");
        self.options
            .retry
            .run(&format!("list releases for {repo}"), || {
                self.forge.list_releases(repo)
            })
            .await
    }

    pub async fn get_release_by_tag(
        &self,
        repo: &RepoId,
        tag: &str,
    ) -> Result<Option<ForgeRelease>> {
        debug!("looking up release {tag} in {repo}");
        self.options
            .retry
            .run(&format!("get release {tag} in {repo}"), || {
                self.forge.get_release_by_tag(repo, tag)
            })
            .await
    }

    pub async fn get_latest_release(
        &self,
        repo: &RepoId,
    ) -> Result<Option<ForgeRelease>> {
        debug!("looking up latest release in {repo}");
        self.options
            .retry
            .run(&format!("get latest release in {repo}"), || {
                self.forge.get_latest_release(repo)
            })
            .await
    }

    pub async fn search_merged_pull_requests(
        &self,
        req: PrSearchRequest,
    ) -> Result<Vec<u64>> {
        debug!("searching pull requests: {}", req.query());
        self.options
            .retry
            .run(&format!("search pull requests in {}", req.repo), || {
                self.forge.search_merged_pull_requests(req.clone())
            })
            .await
    }

    pub async fn get_pull_request(
        &self,
        repo: &RepoId,
        number: u64,
    ) -> Result<Option<ForgePullRequest>> {
        self.options
            .retry
            .run(&format!("get pull request {repo}#{number}"), || {
                self.forge.get_pull_request(repo, number)
            })
            .await
    }

    pub async fn update_release_body(
        &self,
        req: UpdateReleaseRequest,
    ) -> Result<()> {
        if self.options.dry_run {
            warn!(
                "dry_run: would update release {} in {}:\n{}",
                req.release_id, req.repo, req.body
            );
            return Ok(());
        }

        info!("updating release {} in {}", req.release_id, req.repo);

        self.options
            .retry
            .run(&format!("update release in {}", req.repo), || {
                self.forge.update_release_body(req.clone())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ReleaseScribeError, forge::traits::MockForge,
        test_helpers::fast_retry_policy,
    };

    fn manager(mock: MockForge, dry_run: bool) -> ForgeManager {
        ForgeManager::new(
            Box::new(mock),
            ForgeOptions {
                dry_run,
                retry: fast_retry_policy(),
            },
        )
    }

    #[tokio::test]
    async fn retries_transient_forge_errors() {
        let mut mock = MockForge::new();
        let mut seq = mockall::Sequence::new();

        mock.expect_get_latest_release()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ReleaseScribeError::RateLimitExceeded));

        mock.expect_get_latest_release()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(Some(ForgeRelease {
                    tag_name: "v1.0.0".into(),
                    ..Default::default()
                }))
            });

        let result = manager(mock, false)
            .get_latest_release(&RepoId::new("acme", "api"))
            .await
            .unwrap();

        assert_eq!(result.unwrap().tag_name, "v1.0.0");
    }

    #[tokio::test]
    async fn dry_run_skips_release_update() {
        let mut mock = MockForge::new();
        mock.expect_update_release_body().times(0);

        manager(mock, true)
            .update_release_body(UpdateReleaseRequest {
                repo: RepoId::new("acme", "api"),
                release_id: 7,
                body: "notes".into(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn forwards_release_update() {
        let mut mock = MockForge::new();
        mock.expect_update_release_body()
            .times(1)
            .withf(|req| req.release_id == 7 && req.body == "notes")
            .returning(|_| Ok(()));

        manager(mock, false)
            .update_release_body(UpdateReleaseRequest {
                repo: RepoId::new("acme", "api"),
                release_id: 7,
                body: "notes".into(),
            })
            .await
            .unwrap();
    }
}
