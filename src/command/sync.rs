//! Release description synchronization command implementation.
use log::*;

use crate::{
    Result,
    cli,
    command::common,
    error::ReleaseScribeError,
    forge::request::RepoId,
    orchestrator::sync::{SyncOutcome, SyncParams},
};

/// Execute the sync command, falling back to `[sync]` in the configuration
/// for the target repository and document.
pub async fn execute(args: &cli::Args) -> Result<()> {
    let cli::Command::Sync {
        tag,
        target_repo,
        markdown_file,
        github_token,
    } = &args.command
    else {
        return Err(ReleaseScribeError::InvalidArgs(
            "expected the sync command".into(),
        ));
    };

    let config = common::load_configuration(args)?;

    let target_repo: RepoId = match target_repo {
        Some(repo) => repo.clone(),
        None => config
            .sync
            .target_repo
            .as_deref()
            .ok_or_else(|| {
                ReleaseScribeError::InvalidArgs(
                    "must set --target-repo or [sync].target_repo".into(),
                )
            })?
            .parse()?,
    };

    let markdown_file = markdown_file
        .clone()
        .or_else(|| config.sync.markdown_file.clone())
        .ok_or_else(|| {
            ReleaseScribeError::InvalidArgs(
                "must set --markdown-file or [sync].markdown_file".into(),
            )
        })?;

    let forge = common::forge_manager(args, &config, github_token.clone())?;
    let orchestrator = common::orchestrator_builder(args, config, forge).build()?;

    let outcome = orchestrator
        .sync(SyncParams {
            tag: tag.clone(),
            target_repo: target_repo.clone(),
            markdown_file,
        })
        .await?;

    match outcome {
        SyncOutcome::Unchanged => {
            info!("release {tag} in {target_repo} already up to date")
        }
        SyncOutcome::Updated => {
            info!("release {tag} in {target_repo} updated")
        }
    }

    Ok(())
}
