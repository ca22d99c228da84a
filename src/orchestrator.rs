//! Orchestrates the `update` and `sync` pipelines.
//!
//! The orchestrator owns every collaborator it uses (forge, summarizer,
//! changelog and image state stores) and receives them fully constructed,
//! so tests can substitute any of them.
use derive_builder::Builder;
use log::*;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    Result,
    changelog::store::ChangelogStore,
    config::Config,
    error::ReleaseScribeError,
    file_loader::{load_file, write_atomic},
    forge::manager::ForgeManager,
    image::state::ImageStateStore,
    summarizer::traits::Summarizer,
};

/// Run report and advisory items.
pub mod report;

/// Migration of release notes into hosting release descriptions.
pub mod sync;

/// Release-triggered changelog and document update.
pub mod update;

#[derive(Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct OrchestratorParams {
    pub config: Arc<Config>,
    pub forge: Arc<ForgeManager>,
    /// Only `update` generates text; `sync` runs without one
    #[builder(setter(into, strip_option), default)]
    pub summarizer: Option<Arc<dyn Summarizer>>,
    pub changelog_store: Arc<dyn ChangelogStore>,
    pub image_store: Arc<dyn ImageStateStore>,
    /// Directory relative paths from the configuration are resolved against
    #[builder(default = "PathBuf::from(\".\")")]
    pub root: PathBuf,
    #[builder(default)]
    pub dry_run: bool,
}

impl OrchestratorParamsBuilder {
    pub fn build(&self) -> Result<Orchestrator> {
        let params = self._build().map_err(|e| {
            ReleaseScribeError::invalid_config(format!(
                "Failed to build orchestrator: {}",
                e
            ))
        })?;
        Ok(Orchestrator::new(params))
    }
}

pub struct Orchestrator {
    config: Arc<Config>,
    forge: Arc<ForgeManager>,
    summarizer: Option<Arc<dyn Summarizer>>,
    changelog_store: Arc<dyn ChangelogStore>,
    image_store: Arc<dyn ImageStateStore>,
    root: PathBuf,
    dry_run: bool,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorParamsBuilder {
        OrchestratorParamsBuilder::default()
    }

    pub fn new(params: OrchestratorParams) -> Self {
        Self {
            config: params.config,
            forge: params.forge,
            summarizer: params.summarizer,
            changelog_store: params.changelog_store,
            image_store: params.image_store,
            root: params.root,
            dry_run: params.dry_run,
        }
    }

    fn summarizer(&self) -> Result<&dyn Summarizer> {
        self.summarizer.as_deref().ok_or_else(|| {
            ReleaseScribeError::invalid_config(
                "a summarizer is required to update release notes",
            )
        })
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn read_document(&self, file: &str) -> Result<Option<String>> {
        load_file(&self.resolve_path(file))
    }

    fn write_document(&self, file: &str, content: &str) -> Result<()> {
        if self.dry_run {
            warn!("dry_run: would write {file}:\n{content}");
            return Ok(());
        }

        info!("writing {file}");
        write_atomic(&self.resolve_path(file), content)
    }
}
