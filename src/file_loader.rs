//! Local file loading and atomic replacement for the flat-file artifacts
//! (changelog, image state, markdown documents).
use std::{
    fs,
    io::{ErrorKind, Write},
    path::Path,
};
use tempfile::NamedTempFile;

use crate::{Result, error::ReleaseScribeError};

/// Load the content of a file.
///
/// # Returns
///
/// * `Ok(Some(String))` - File was found and content loaded successfully
/// * `Ok(None)` - File does not exist at the specified path
/// * `Err(_)` - An error occurred while attempting to read the file
pub fn load_file(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Write `content` to a temporary file next to `path` and persist it over
/// `path`, creating missing parent directories. The temporary file is
/// removed when any step fails.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if path.file_name().is_none() {
        return Err(ReleaseScribeError::InvalidArgs(format!(
            "not a file path: {}",
            path.display()
        )));
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path).map_err(|err| err.error)?;

    Ok(())
}
