//! Resolution of previous release tags and merge windows between releases.
use chrono::{DateTime, Utc};
use log::*;

use crate::{
    Result,
    config::stream::SourceConfig,
    error::ReleaseScribeError,
    forge::manager::ForgeManager,
    release::tag::ReleaseTag,
};

/// Lower bound used when a repository has no earlier release
/// (2020-01-01T00:00:00Z).
pub const DEFAULT_SINCE_TIMESTAMP: i64 = 1_577_836_800;

pub fn default_since() -> DateTime<Utc> {
    DateTime::from_timestamp(DEFAULT_SINCE_TIMESTAMP, 0)
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Half-open `[since, until)` range of merge timestamps, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseWindow {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl ReleaseWindow {
    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        *timestamp >= self.since && *timestamp < self.until
    }
}

/// Resolves tags and windows for a single source repository.
pub struct WindowResolver<'a> {
    forge: &'a ForgeManager,
}

impl<'a> WindowResolver<'a> {
    pub fn new(forge: &'a ForgeManager) -> Self {
        Self { forge }
    }

    /// Release tag published immediately before `current`, or `None` when
    /// `current` is the earliest release.
    pub async fn previous_tag(
        &self,
        source: &SourceConfig,
        current: &ReleaseTag,
    ) -> Result<Option<ReleaseTag>> {
        let mut releases = self.forge.list_releases(&source.repo).await?;

        releases.sort_by_key(|r| r.timestamp().unwrap_or(DateTime::<Utc>::MIN_UTC));

        let current_name = current.prefixed(&source.tag_prefix);

        let index = releases
            .iter()
            .position(|r| r.tag_name == current_name)
            .ok_or_else(|| {
                ReleaseScribeError::not_found(format!(
                    "release tag {current_name} in {}",
                    source.repo
                ))
            })?;

        if index == 0 {
            return Ok(None);
        }

        let previous = ReleaseTag::from_forge(
            &releases[index - 1].tag_name,
            &source.tag_prefix,
        );

        debug!("previous tag for {current} in {}: {previous}", source.repo);

        Ok(Some(previous))
    }

    /// Most recently published release tag, if any.
    pub async fn latest_tag(
        &self,
        source: &SourceConfig,
    ) -> Result<Option<ReleaseTag>> {
        let latest = self.forge.get_latest_release(&source.repo).await?;
        Ok(latest.map(|r| ReleaseTag::from_forge(&r.tag_name, &source.tag_prefix)))
    }

    /// Publish timestamp (falling back to creation) of a release.
    pub async fn release_date(
        &self,
        source: &SourceConfig,
        tag: &ReleaseTag,
    ) -> Result<DateTime<Utc>> {
        let name = tag.prefixed(&source.tag_prefix);

        let release = self
            .forge
            .get_release_by_tag(&source.repo, &name)
            .await?
            .ok_or_else(|| {
                ReleaseScribeError::not_found(format!(
                    "release {name} in {}",
                    source.repo
                ))
            })?;

        release.timestamp().ok_or_else(|| {
            ReleaseScribeError::forge(format!(
                "release {name} in {} has no published or created date",
                source.repo
            ))
        })
    }

    pub async fn release_window(
        &self,
        source: &SourceConfig,
        since: Option<&ReleaseTag>,
        until: &ReleaseTag,
    ) -> Result<ReleaseWindow> {
        let until = self.release_date(source, until).await?;

        let since = match since {
            Some(tag) => self.release_date(source, tag).await?,
            None => default_since(),
        };

        Ok(ReleaseWindow { since, until })
    }
}
