//! Persistence of the structured changelog.
use log::*;
use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::{
    Result,
    changelog::entry::ChangelogEntry,
    config::stream::Audience,
    error::ReleaseScribeError,
    file_loader::{load_file, write_atomic},
};

/// Read/write access to the ordered list of changelog entries. Entries are
/// kept newest first.
pub trait ChangelogStore: Send + Sync {
    fn load_all(&self) -> Result<Vec<ChangelogEntry>>;

    /// Replace the whole changelog atomically.
    fn write_all(&self, entries: &[ChangelogEntry]) -> Result<()>;

    /// Highest id ever persisted, or 0 for an empty changelog.
    fn max_id(&self) -> Result<u64> {
        Ok(self.load_all()?.iter().map(|e| e.id).max().unwrap_or(0))
    }

    /// Whether entries for the release published at `published_at` have
    /// already been committed for `audience`.
    fn contains_release(
        &self,
        published_at: &str,
        audience: Audience,
    ) -> Result<bool> {
        Ok(self
            .load_all()?
            .iter()
            .any(|e| e.published_at == published_at && e.audience == audience))
    }
}

/// Sort `new_entries` by id descending and place them ahead of `existing`.
pub fn prepend_entries(
    new_entries: &[ChangelogEntry],
    existing: &[ChangelogEntry],
) -> Vec<ChangelogEntry> {
    let mut sorted = new_entries.to_vec();
    sorted.sort_by(|a, b| b.id.cmp(&a.id));
    sorted.extend(existing.iter().cloned());
    sorted
}

/// Changelog stored as a pretty-printed JSON array.
pub struct FileChangelogStore {
    path: PathBuf,
}

impl FileChangelogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChangelogStore for FileChangelogStore {
    fn load_all(&self) -> Result<Vec<ChangelogEntry>> {
        let Some(content) = load_file(&self.path)? else {
            info!(
                "changelog {} does not exist yet: starting empty",
                self.path.display()
            );
            return Ok(vec![]);
        };

        if content.trim().is_empty() {
            return Ok(vec![]);
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, entries: &[ChangelogEntry]) -> Result<()> {
        let mut content = serde_json::to_string_pretty(entries)?;
        content.push('\n');
        write_atomic(&self.path, &content)?;
        debug!(
            "wrote {} changelog entries to {}",
            entries.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Changelog held in memory, for dry runs and tests.
#[derive(Default)]
pub struct MemoryChangelogStore {
    entries: Mutex<Vec<ChangelogEntry>>,
}

impl MemoryChangelogStore {
    pub fn new(entries: Vec<ChangelogEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl ChangelogStore for MemoryChangelogStore {
    fn load_all(&self) -> Result<Vec<ChangelogEntry>> {
        let entries = self.entries.lock().map_err(|e| {
            ReleaseScribeError::InvariantViolation(format!(
                "changelog store poisoned: {e}"
            ))
        })?;
        Ok(entries.clone())
    }

    fn write_all(&self, new_entries: &[ChangelogEntry]) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|e| {
            ReleaseScribeError::InvariantViolation(format!(
                "changelog store poisoned: {e}"
            ))
        })?;
        *entries = new_entries.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::test_helpers::changelog_entry;

    #[test]
    fn prepends_new_entries_newest_first() {
        let existing = vec![changelog_entry(2), changelog_entry(1)];
        let new_entries = vec![changelog_entry(3), changelog_entry(5), changelog_entry(4)];

        let ids: Vec<u64> = prepend_entries(&new_entries, &existing)
            .iter()
            .map(|e| e.id)
            .collect();

        assert_eq!(ids, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileChangelogStore::new(dir.path().join("changelog.json"));
        assert!(store.load_all().unwrap().is_empty());
        assert_eq!(store.max_id().unwrap(), 0);
    }

    #[test]
    fn writes_pretty_json_with_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("changelog.json");
        let store = FileChangelogStore::new(&path);

        store
            .write_all(&[changelog_entry(7), changelog_entry(6)])
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("[\n  {"));
        assert!(content.ends_with("]\n"));
        assert!(!dir.path().join("nested").join(".changelog.json.tmp").exists());

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(store.max_id().unwrap(), 7);
    }

    #[test]
    fn detects_already_committed_release() {
        let store = MemoryChangelogStore::new(vec![changelog_entry(1)]);
        let entry = changelog_entry(1);

        assert!(
            store
                .contains_release(&entry.published_at, entry.audience)
                .unwrap()
        );
        assert!(
            !store
                .contains_release(&entry.published_at, Audience::Pro)
                .unwrap()
        );
        assert!(
            !store
                .contains_release("2030-01-01T00:00:00Z", entry.audience)
                .unwrap()
        );
    }

    #[test]
    fn rejects_malformed_changelog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changelog.json");
        fs::write(&path, "{not json").unwrap();

        let result = FileChangelogStore::new(&path).load_all();

        assert!(matches!(result, Err(ReleaseScribeError::JsonParseError(_))));
    }
}
