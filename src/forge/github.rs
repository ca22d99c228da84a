//! Implements the Forge trait for Github
use async_trait::async_trait;
use log::*;
use octocrab::{
    Octocrab,
    models::{pulls::PullRequest as GithubPullRequest, repos::Release},
};
use reqwest::StatusCode;
use std::time::Duration;

use crate::{
    Result,
    forge::{
        config::{DEFAULT_PAGE_SIZE, RemoteConfig},
        request::{
            ForgePullRequest, ForgeRelease, PrSearchRequest, RepoId,
            UpdateReleaseRequest,
        },
        traits::Forge,
    },
};

/// GitHub forge implementation using Octocrab for releases, pull request
/// search and release body updates.
pub struct Github {
    instance: Octocrab,
}

impl Github {
    /// Create GitHub client with personal access token authentication and API
    /// base URL configuration.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let timeout = Some(Duration::from_secs(config.timeout_secs));

        let instance = Octocrab::builder()
            .personal_token(config.token.clone())
            .base_uri(config.api_base_uri.as_str())?
            .set_connect_timeout(timeout)
            .set_read_timeout(timeout)
            .build()?;

        Ok(Self { instance })
    }
}

fn is_not_found(err: &octocrab::Error) -> bool {
    matches!(
        err,
        octocrab::Error::GitHub { source, .. }
            if source.status_code == StatusCode::NOT_FOUND
    )
}

fn to_forge_release(release: Release) -> ForgeRelease {
    ForgeRelease {
        id: release.id.0,
        tag_name: release.tag_name,
        body: release.body.unwrap_or_default(),
        published_at: release.published_at,
        created_at: release.created_at,
    }
}

fn to_forge_pull_request(pr: GithubPullRequest) -> ForgePullRequest {
    ForgePullRequest {
        number: pr.number,
        title: pr.title.unwrap_or_default(),
        url: pr.html_url.map(|u| u.to_string()).unwrap_or_default(),
        author: pr
            .user
            .map(|u| u.login)
            .unwrap_or_else(|| "unknown".to_string()),
        body: pr.body.unwrap_or_default(),
        labels: pr
            .labels
            .unwrap_or_default()
            .into_iter()
            .map(|l| l.name)
            .collect(),
        merged_at: pr.merged_at,
    }
}

#[async_trait]
impl Forge for Github {
    async fn list_releases(&self, repo: &RepoId) -> Result<Vec<ForgeRelease>> {
        let page = self
            .instance
            .repos(&repo.owner, &repo.name)
            .releases()
            .list()
            .per_page(DEFAULT_PAGE_SIZE)
            .send()
            .await?;

        let releases = self.instance.all_pages(page).await?;

        debug!("found {} releases in {repo}", releases.len());

        Ok(releases.into_iter().map(to_forge_release).collect())
    }

    async fn get_release_by_tag(
        &self,
        repo: &RepoId,
        tag: &str,
    ) -> Result<Option<ForgeRelease>> {
        let result = self
            .instance
            .repos(&repo.owner, &repo.name)
            .releases()
            .get_by_tag(tag)
            .await;

        match result {
            Ok(release) => Ok(Some(to_forge_release(release))),
            Err(err) if is_not_found(&err) => {
                info!("no release found for tag {tag} in {repo}");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn get_latest_release(
        &self,
        repo: &RepoId,
    ) -> Result<Option<ForgeRelease>> {
        let result = self
            .instance
            .repos(&repo.owner, &repo.name)
            .releases()
            .get_latest()
            .await;

        match result {
            Ok(release) => Ok(Some(to_forge_release(release))),
            Err(err) if is_not_found(&err) => {
                info!("no published release found in {repo}");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn search_merged_pull_requests(
        &self,
        req: PrSearchRequest,
    ) -> Result<Vec<u64>> {
        let query = req.query();

        let page = self
            .instance
            .search()
            .issues_and_pull_requests(&query)
            .per_page(DEFAULT_PAGE_SIZE)
            .send()
            .await?;

        let issues = self.instance.all_pages(page).await?;

        debug!("search returned {} results for: {query}", issues.len());

        Ok(issues.into_iter().map(|issue| issue.number).collect())
    }

    async fn get_pull_request(
        &self,
        repo: &RepoId,
        number: u64,
    ) -> Result<Option<ForgePullRequest>> {
        let result = self
            .instance
            .pulls(&repo.owner, &repo.name)
            .get(number)
            .await;

        match result {
            Ok(pr) => Ok(Some(to_forge_pull_request(pr))),
            Err(err) if is_not_found(&err) => {
                warn!("pull request {repo}#{number} not found");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn update_release_body(
        &self,
        req: UpdateReleaseRequest,
    ) -> Result<()> {
        self.instance
            .repos(&req.repo.owner, &req.repo.name)
            .releases()
            .update(req.release_id)
            .body(&req.body)
            .send()
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[tokio::test]
    async fn builds_client_from_remote_config() {
        let config = RemoteConfig {
            token: SecretString::from("test-token".to_string()),
            ..RemoteConfig::default()
        };
        assert!(Github::new(config).is_ok());
    }

    #[tokio::test]
    async fn rejects_invalid_base_uri() {
        let config = RemoteConfig {
            api_base_uri: "not a uri".into(),
            ..RemoteConfig::default()
        };
        assert!(Github::new(config).is_err());
    }
}
