use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::fs;

use super::{StoredTokens, TokenStorage};
use crate::{Error, Result, TRACING_TARGET_STORAGE};

/// Token storage backed by a JSON file.
///
/// Writes go to a sibling temporary file that is renamed over the target, so
/// a crash never leaves a half-written pair behind.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_error(&self, message: &'static str, source: std::io::Error) -> Error {
        Error::storage(message)
            .with_context(self.path.display().to_string())
            .with_source(source)
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<StoredTokens> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(StoredTokens::default()),
            Err(e) => return Err(self.storage_error("failed to read token file", e)),
        };

        serde_json::from_str(&contents).map_err(|e| {
            Error::storage("token file is not valid JSON")
                .with_context(self.path.display().to_string())
                .with_source(e)
        })
    }

    fn save(&self, tokens: &StoredTokens) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| self.storage_error("failed to create token directory", e))?;
        }

        let contents = serde_json::to_vec_pretty(tokens)
            .map_err(|e| Error::internal("failed to serialize tokens").with_source(e))?;

        let temporary = self.path.with_extension("tmp");
        fs::write(&temporary, contents)
            .map_err(|e| self.storage_error("failed to write token file", e))?;
        fs::rename(&temporary, &self.path)
            .map_err(|e| self.storage_error("failed to replace token file", e))?;

        tracing::debug!(
            target: TRACING_TARGET_STORAGE,
            path = %self.path.display(),
            "tokens persisted"
        );

        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(
                    target: TRACING_TARGET_STORAGE,
                    path = %self.path.display(),
                    "tokens cleared"
                );
                Ok(())
            }
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.storage_error("failed to remove token file", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileTokenStorage::new(dir.path().join("tokens.json"));
        assert!(storage.load().unwrap().is_empty());
        storage.clear().unwrap();
    }

    #[test]
    fn test_save_creates_parent_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileTokenStorage::new(dir.path().join("nested/tokens.json"));
        let tokens = StoredTokens::new("id".into(), "perm".into());

        storage.save(&tokens).unwrap();
        let reopened = FileTokenStorage::new(storage.path());
        assert_eq!(reopened.load().unwrap(), tokens);

        let raw = fs::read_to_string(storage.path()).unwrap();
        assert!(raw.contains("\"permissionToken\""));

        storage.clear().unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        fs::write(&path, "not json").unwrap();

        let error = FileTokenStorage::new(path).load().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Storage);
        assert!(error.context().is_some());
    }
}
