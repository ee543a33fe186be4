use ferrous_forwarder_domain::DomainError;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A list file whose modification time decides when it is reloaded.
#[derive(Debug)]
pub struct WatchedFile {
    path: PathBuf,
    loaded_stamp: Mutex<Option<SystemTime>>,
}

impl WatchedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded_stamp: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current modification time if it differs from the one last marked.
    pub fn changed_since_load(&self) -> Result<Option<SystemTime>, DomainError> {
        let modified = std::fs::metadata(&self.path)?.modified()?;
        if *self.loaded_stamp.lock() == Some(modified) {
            Ok(None)
        } else {
            Ok(Some(modified))
        }
    }

    pub fn mark_loaded(&self, stamp: SystemTime) {
        *self.loaded_stamp.lock() = Some(stamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_after_mark() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.txt");
        std::fs::write(&path, "a.example\n").unwrap();

        let watched = WatchedFile::new(&path);
        let stamp = watched.changed_since_load().unwrap().unwrap();
        watched.mark_loaded(stamp);
        assert!(watched.changed_since_load().unwrap().is_none());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let watched = WatchedFile::new("/nonexistent/forwarder/list.txt");
        assert!(watched.changed_since_load().is_err());
    }
}
