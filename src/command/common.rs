//! Common functionality shared between commands
use log::*;
use secrecy::SecretString;
use std::{path::PathBuf, sync::Arc};

use crate::{
    Result,
    changelog::store::{ChangelogStore, FileChangelogStore},
    cli::{self, resolve_github_token},
    config::Config,
    forge::{
        config::RemoteConfig,
        github::Github,
        manager::{ForgeManager, ForgeOptions},
    },
    image::state::{FileImageStateStore, ImageStateStore},
    orchestrator::OrchestratorParamsBuilder,
};

/// Load and validate the configuration named on the command line.
pub fn load_configuration(args: &cli::Args) -> Result<Config> {
    info!("loading configuration from {}", args.config.display());
    Config::load(&args.config)
}

/// Directory relative configuration paths are resolved against.
pub fn working_root() -> PathBuf {
    PathBuf::from(".")
}

/// GitHub-backed forge manager honouring dry run and the configured retry
/// policy.
pub fn forge_manager(
    args: &cli::Args,
    config: &Config,
    token_flag: Option<String>,
) -> Result<ForgeManager> {
    let token: SecretString = resolve_github_token(token_flag)?;

    let github = Github::new(RemoteConfig {
        token,
        timeout_secs: config.retry.timeout_secs,
        ..RemoteConfig::default()
    })?;

    Ok(ForgeManager::new(
        Box::new(github),
        ForgeOptions {
            dry_run: args.dry_run,
            retry: config.retry.clone(),
        },
    ))
}

/// Orchestrator builder with the file-backed stores and forge filled in.
pub fn orchestrator_builder(
    args: &cli::Args,
    config: Config,
    forge: ForgeManager,
) -> OrchestratorParamsBuilder {
    let root = working_root();

    let changelog_store: Arc<dyn ChangelogStore> =
        Arc::new(FileChangelogStore::new(root.join(&config.changelog_path)));
    let image_store: Arc<dyn ImageStateStore> =
        Arc::new(FileImageStateStore::new(root.join(&config.image_state_path)));

    let mut builder = OrchestratorParamsBuilder::default();

    builder
        .config(Arc::new(config))
        .forge(Arc::new(forge))
        .changelog_store(changelog_store)
        .image_store(image_store)
        .root(root)
        .dry_run(args.dry_run);

    builder
}
