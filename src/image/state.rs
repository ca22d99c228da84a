//! Persisted illustration rotation state.
use chrono::{DateTime, Utc};
use log::*;
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::Mutex};

use crate::{
    Result,
    error::ReleaseScribeError,
    file_loader::{load_file, write_atomic},
    release::tag::ReleaseTag,
};

/// Last illustration handed out, and the release/document it was handed out
/// for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageState {
    pub last_index: u32,
    #[serde(default)]
    pub last_tag: Option<ReleaseTag>,
    #[serde(default)]
    pub last_file: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// On-disk forms accepted when reading: the full record or a legacy bare
/// integer index.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredImageState {
    Legacy(u32),
    Full(ImageState),
}

impl From<StoredImageState> for ImageState {
    fn from(value: StoredImageState) -> Self {
        match value {
            StoredImageState::Legacy(last_index) => ImageState {
                last_index,
                ..ImageState::default()
            },
            StoredImageState::Full(state) => state,
        }
    }
}

/// Parse persisted state. Empty or unreadable content yields the clean
/// state.
pub fn parse_image_state(content: &str) -> ImageState {
    let content = content.trim();

    if content.is_empty() {
        return ImageState::default();
    }

    match serde_json::from_str::<StoredImageState>(content) {
        Ok(stored) => stored.into(),
        Err(err) => {
            warn!("ignoring unreadable image state ({err}): starting clean");
            ImageState::default()
        }
    }
}

pub trait ImageStateStore: Send + Sync {
    fn load(&self) -> Result<ImageState>;
    fn save(&self, state: &ImageState) -> Result<()>;
}

/// Image state kept in a JSON file, replaced atomically on save.
pub struct FileImageStateStore {
    path: PathBuf,
}

impl FileImageStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ImageStateStore for FileImageStateStore {
    fn load(&self) -> Result<ImageState> {
        match load_file(&self.path)? {
            Some(content) => Ok(parse_image_state(&content)),
            None => {
                debug!(
                    "no image state at {}: starting clean",
                    self.path.display()
                );
                Ok(ImageState::default())
            }
        }
    }

    fn save(&self, state: &ImageState) -> Result<()> {
        let mut content = serde_json::to_string(state)?;
        content.push('\n');
        write_atomic(&self.path, &content)
    }
}

/// Image state kept in memory, for dry runs and tests.
#[derive(Default)]
pub struct MemoryImageStateStore {
    state: Mutex<ImageState>,
}

impl MemoryImageStateStore {
    pub fn new(state: ImageState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }
}

impl ImageStateStore for MemoryImageStateStore {
    fn load(&self) -> Result<ImageState> {
        self.state.lock().map(|s| s.clone()).map_err(|e| {
            ReleaseScribeError::InvariantViolation(format!(
                "image state poisoned: {e}"
            ))
        })
    }

    fn save(&self, state: &ImageState) -> Result<()> {
        let mut current = self.state.lock().map_err(|e| {
            ReleaseScribeError::InvariantViolation(format!(
                "image state poisoned: {e}"
            ))
        })?;
        *current = state.clone();
        Ok(())
    }
}
