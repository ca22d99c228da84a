//! Traits related to remote git forges
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{
    Result,
    forge::request::{
        ForgePullRequest, ForgeRelease, PrSearchRequest, RepoId,
        UpdateReleaseRequest,
    },
};

/// Hosting API operations the release-notes pipeline depends on. Lookups
/// that can legitimately miss return `Ok(None)` rather than an error.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge: Send + Sync {
    /// All releases published for the repository, in forge order.
    async fn list_releases(&self, repo: &RepoId) -> Result<Vec<ForgeRelease>>;

    /// Release for an exact (prefixed) tag name.
    async fn get_release_by_tag(
        &self,
        repo: &RepoId,
        tag: &str,
    ) -> Result<Option<ForgeRelease>>;

    /// Most recently published release.
    async fn get_latest_release(
        &self,
        repo: &RepoId,
    ) -> Result<Option<ForgeRelease>>;

    /// Numbers of merged pull requests matching the search request.
    async fn search_merged_pull_requests(
        &self,
        req: PrSearchRequest,
    ) -> Result<Vec<u64>>;

    /// Full detail for a single pull request.
    async fn get_pull_request(
        &self,
        repo: &RepoId,
        number: u64,
    ) -> Result<Option<ForgePullRequest>>;

    /// Replace the body of an existing release.
    async fn update_release_body(&self, req: UpdateReleaseRequest)
    -> Result<()>;
}
