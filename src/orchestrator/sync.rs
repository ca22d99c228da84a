use log::*;

use crate::{
    Result,
    error::ReleaseScribeError,
    forge::request::{RepoId, UpdateReleaseRequest},
    markdown::{extract::extract_release_section, upsert::upsert_managed_block},
    orchestrator::Orchestrator,
    release::tag::ReleaseTag,
};

/// Copy one release's notes from a document into the hosting release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncParams {
    /// Release tag, with or without the target repository's tag prefix
    pub tag: String,
    pub target_repo: RepoId,
    pub markdown_file: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Unchanged,
    Updated,
}

impl Orchestrator {
    /// Extract the notes for `params.tag` and upsert them as the managed
    /// block of the matching release description.
    ///
    /// The document heading and managed-block markers use the unprefixed
    /// tag; the release is looked up with the target repository's prefix.
    pub async fn sync(&self, params: SyncParams) -> Result<SyncOutcome> {
        let prefix = self.config.tag_prefix_for(&params.target_repo);
        let tag = ReleaseTag::from_forge(&params.tag, prefix);
        let forge_tag = tag.prefixed(prefix);

        let document =
            self.read_document(&params.markdown_file)?.ok_or_else(|| {
                ReleaseScribeError::not_found(format!(
                    "release notes document {}",
                    params.markdown_file
                ))
            })?;

        let notes = extract_release_section(&document, tag.as_str())?;

        if notes.trim().is_empty() {
            return Err(ReleaseScribeError::InvariantViolation(format!(
                "release notes for {} in {} are empty after extraction",
                tag, params.markdown_file
            )));
        }

        let release = self
            .forge
            .get_release_by_tag(&params.target_repo, &forge_tag)
            .await?
            .ok_or_else(|| {
                ReleaseScribeError::not_found(format!(
                    "release {forge_tag} in {}",
                    params.target_repo
                ))
            })?;

        let body = upsert_managed_block(&release.body, &notes, tag.as_str())?;

        if body.trim() == release.body.trim() {
            info!(
                "release {forge_tag} in {} is up to date: no changes",
                params.target_repo
            );
            return Ok(SyncOutcome::Unchanged);
        }

        self.forge
            .update_release_body(UpdateReleaseRequest {
                repo: params.target_repo.clone(),
                release_id: release.id,
                body,
            })
            .await?;

        info!(
            "synced release notes for {tag} into {forge_tag} in {}",
            params.target_repo
        );

        Ok(SyncOutcome::Updated)
    }
}
