//! Rotation of release illustrations.
//!
//! Each release gets the next illustration index exactly once. Re-runs for
//! the same release and document return the same index, and the state snaps
//! forward to the document when the document was updated without the state
//! being committed (or the other way round).
use chrono::Utc;
use log::*;

use crate::{
    Result,
    error::ReleaseScribeError,
    markdown::extract::latest_section,
    release::tag::ReleaseTag,
};

/// Persisted rotation state and its stores.
pub mod state;

use state::{ImageState, ImageStateStore};

/// Default number of illustrations in the rotation.
pub const DEFAULT_MAX_IMAGE_INDEX: u32 = 49;

pub struct ImageRotator<'a> {
    store: &'a dyn ImageStateStore,
    max_index: u32,
}

impl<'a> ImageRotator<'a> {
    pub fn new(store: &'a dyn ImageStateStore, max_index: u32) -> Result<Self> {
        if max_index == 0 {
            return Err(ReleaseScribeError::invalid_config(
                "image max_index must be at least 1",
            ));
        }
        Ok(Self { store, max_index })
    }

    /// Illustration index for release `tag` in document `file`, whose current
    /// content is `document`.
    pub fn next_image_index(
        &self,
        tag: &ReleaseTag,
        file: &str,
        document: &str,
    ) -> Result<u32> {
        let mut state = self.store.load()?;

        if let Some(snapped) = snap_to_document(&state, file, document) {
            info!(
                "image state snapped to document: index {} for {}",
                snapped.last_index,
                snapped
                    .last_tag
                    .as_ref()
                    .map(|t| t.to_string())
                    .unwrap_or_default()
            );
            state = snapped;
        }

        if state.last_tag.as_ref() == Some(tag)
            && state.last_file.as_deref() == Some(file)
        {
            info!(
                "image index {} already allocated for {tag} in {file}",
                state.last_index
            );
            return Ok(state.last_index);
        }

        let next = (state.last_index % self.max_index) + 1;

        self.store.save(&ImageState {
            last_index: next,
            last_tag: Some(tag.clone()),
            last_file: Some(file.to_string()),
            updated_at: Some(Utc::now()),
        })?;

        info!("allocated image index {next} for {tag} in {file}");

        Ok(next)
    }
}

/// State inferred from the document when the document's latest release is
/// newer than the persisted tag, or when no tag has been persisted.
fn snap_to_document(
    state: &ImageState,
    file: &str,
    document: &str,
) -> Option<ImageState> {
    let latest = latest_section(document)?;
    let index = latest.image_index?;

    let should_snap = match &state.last_tag {
        None => true,
        Some(last) => latest.tag.is_newer_than(last),
    };

    if !should_snap {
        return None;
    }

    Some(ImageState {
        last_index: index,
        last_tag: Some(latest.tag),
        last_file: Some(file.to_string()),
        updated_at: state.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::state::MemoryImageStateStore;

    const FILE: &str = "notes/oss.md";

    fn document(tag: &str, index: u32) -> String {
        format!(
            "---\ntitle: notes\n---\n\n## {tag} (2024-01-01)\n\n<img src=\"https://cdn/projects/{index}.jpg\">\n\nNotes\n\n***\n"
        )
    }

    fn store_with(last_index: u32, last_tag: Option<&str>) -> MemoryImageStateStore {
        MemoryImageStateStore::new(ImageState {
            last_index,
            last_tag: last_tag.map(ReleaseTag::new),
            last_file: Some(FILE.into()),
            updated_at: None,
        })
    }

    #[test]
    fn clean_state_starts_at_one() {
        let store = MemoryImageStateStore::default();
        let rotator = ImageRotator::new(&store, 49).unwrap();

        let index = rotator
            .next_image_index(&ReleaseTag::new("0.91.0"), FILE, "")
            .unwrap();

        assert_eq!(index, 1);
        let saved = store.load().unwrap();
        assert_eq!(saved.last_index, 1);
        assert_eq!(saved.last_tag, Some(ReleaseTag::new("0.91.0")));
        assert_eq!(saved.last_file.as_deref(), Some(FILE));
        assert!(saved.updated_at.is_some());
    }

    #[test]
    fn wraps_after_max() {
        let store = store_with(49, Some("1.0.0"));
        let rotator = ImageRotator::new(&store, 49).unwrap();

        let index = rotator
            .next_image_index(&ReleaseTag::new("1.1.0"), FILE, &document("1.0.0", 49))
            .unwrap();

        assert_eq!(index, 1);
    }

    #[test]
    fn repeated_calls_are_idempotent() {
        let store = store_with(4, Some("1.0.0"));
        let rotator = ImageRotator::new(&store, 49).unwrap();
        let tag = ReleaseTag::new("1.1.0");

        let first = rotator.next_image_index(&tag, FILE, &document("1.0.0", 4)).unwrap();
        let second = rotator.next_image_index(&tag, FILE, &document("1.0.0", 4)).unwrap();

        assert_eq!(first, 5);
        assert_eq!(second, 5);
    }

    #[test]
    fn different_file_advances() {
        let store = store_with(4, Some("1.1.0"));
        let rotator = ImageRotator::new(&store, 49).unwrap();

        let index = rotator
            .next_image_index(&ReleaseTag::new("1.1.0"), "notes/pro.md", "")
            .unwrap();

        assert_eq!(index, 5);
    }

    #[test]
    fn snaps_to_newer_document() {
        // the document already shows 1.2.0 with image 9 but state lags at 1.1.0
        let store = store_with(5, Some("1.1.0"));
        let rotator = ImageRotator::new(&store, 49).unwrap();
        let doc = document("1.2.0", 9);

        let rerun = rotator
            .next_image_index(&ReleaseTag::new("1.2.0"), FILE, &doc)
            .unwrap();
        assert_eq!(rerun, 9);

        let next = rotator
            .next_image_index(&ReleaseTag::new("1.3.0"), FILE, &doc)
            .unwrap();
        assert_eq!(next, 10);
    }

    #[test]
    fn does_not_snap_to_older_document() {
        let store = store_with(20, Some("2.0.0"));
        let rotator = ImageRotator::new(&store, 49).unwrap();

        let index = rotator
            .next_image_index(&ReleaseTag::new("2.1.0"), FILE, &document("1.9.0", 3))
            .unwrap();

        assert_eq!(index, 21);
    }

    #[test]
    fn snaps_when_no_tag_persisted() {
        let store = MemoryImageStateStore::new(ImageState {
            last_index: 2,
            ..ImageState::default()
        });
        let rotator = ImageRotator::new(&store, 49).unwrap();

        let index = rotator
            .next_image_index(&ReleaseTag::new("0.92.0"), FILE, &document("0.91.0", 30))
            .unwrap();

        assert_eq!(index, 31);
    }

    #[test]
    fn rejects_zero_max() {
        let store = MemoryImageStateStore::default();
        assert!(ImageRotator::new(&store, 0).is_err());
    }
}
