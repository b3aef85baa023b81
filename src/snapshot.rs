//! Local snapshot of the note store.
//!
//! The bytes come from [`NoteStore::serialize_state`] and are not
//! interpreted here. The file is overwritten in place; a torn write only
//! costs a full fetch on the next start.
//!
//! [`NoteStore::serialize_state`]: crate::store::NoteStore::serialize_state

use std::io::ErrorKind;
use std::path::Path;

use crate::error::MoverError;

/// Read the snapshot at `path`, or `None` if there is none.
///
/// # Errors
///
/// Returns `MoverError::Io` if the file exists but cannot be read.
pub fn read(path: &Path) -> Result<Option<Vec<u8>>, MoverError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Replace the snapshot at `path` with `bytes`.
///
/// # Errors
///
/// Returns `MoverError::Io` if the file cannot be written.
pub fn write(path: &Path, bytes: &[u8]) -> Result<(), MoverError> {
    std::fs::write(path, bytes)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "snapshot written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_snapshot_is_none() {
        let temp_dir = TempDir::new().unwrap();
        assert!(read(&temp_dir.path().join("keep_notes.json")).unwrap().is_none());
    }

    #[test]
    fn test_write_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("keep_notes.json");

        write(&path, b"first, and longer").unwrap();
        write(&path, b"second").unwrap();

        assert_eq!(read(&path).unwrap().unwrap(), b"second");
    }
}
