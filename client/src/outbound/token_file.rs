//! File-backed token persistence using capability-scoped directory handles.

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::AccessToken;
use crate::domain::ports::{TokenStore, TokenStoreError};

/// [`TokenStore`] that keeps the bearer token in a single text file.
///
/// The parent directory is created on first save.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    directory: PathBuf,
    file_name: PathBuf,
}

impl FileTokenStore {
    /// Store the token at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when `path` does not name a file.
    pub fn new(path: &Path) -> Result<Self, TokenStoreError> {
        let file_name = path
            .file_name()
            .ok_or_else(|| TokenStoreError::io(format!("{} does not name a file", path.display())))?;
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(Self {
            directory,
            file_name: PathBuf::from(file_name),
        })
    }

    fn io_error(&self, error: &io::Error) -> TokenStoreError {
        TokenStoreError::io(format!(
            "{}: {error}",
            self.directory.join(&self.file_name).display()
        ))
    }

    fn open_existing(&self) -> Result<Option<Dir>, TokenStoreError> {
        match Dir::open_ambient_dir(&self.directory, ambient_authority()) {
            Ok(dir) => Ok(Some(dir)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(self.io_error(&error)),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<AccessToken>, TokenStoreError> {
        let Some(dir) = self.open_existing()? else {
            return Ok(None);
        };
        match dir.read_to_string(&self.file_name) {
            Ok(raw) => Ok(AccessToken::new(Zeroizing::new(raw).as_str())),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(self.io_error(&error)),
        }
    }

    fn save(&self, token: &AccessToken) -> Result<(), TokenStoreError> {
        Dir::create_ambient_dir_all(&self.directory, ambient_authority())
            .map_err(|error| self.io_error(&error))?;
        let dir = Dir::open_ambient_dir(&self.directory, ambient_authority())
            .map_err(|error| self.io_error(&error))?;
        dir.write(&self.file_name, token.expose().as_bytes())
            .map_err(|error| self.io_error(&error))?;
        debug!(directory = %self.directory.display(), "token persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        let Some(dir) = self.open_existing()? else {
            return Ok(());
        };
        match dir.remove_file(&self.file_name) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(self.io_error(&error)),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for file-backed token storage.
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn workspace() -> TempDir {
        tempfile::tempdir().expect("temp dir")
    }

    #[rstest]
    fn save_creates_directory_and_load_reads_back(workspace: TempDir) {
        let store = FileTokenStore::new(&workspace.path().join("nested/state/token")).expect("store");
        assert!(store.load().expect("load").is_none());

        store
            .save(&AccessToken::new("abc").expect("token"))
            .expect("save");

        let loaded = store.load().expect("load").expect("token present");
        assert_eq!(loaded.expose(), "abc");
    }

    #[rstest]
    fn clear_is_idempotent(workspace: TempDir) {
        let store = FileTokenStore::new(&workspace.path().join("token")).expect("store");
        store
            .save(&AccessToken::new("abc").expect("token"))
            .expect("save");

        store.clear().expect("first clear");
        store.clear().expect("second clear");

        assert!(store.load().expect("load").is_none());
    }

    #[rstest]
    fn whitespace_only_file_holds_no_token(workspace: TempDir) {
        Dir::open_ambient_dir(workspace.path(), ambient_authority())
            .and_then(|dir| dir.write("token", "  \n"))
            .expect("seed file");
        let store = FileTokenStore::new(&workspace.path().join("token")).expect("store");
        assert!(store.load().expect("load").is_none());
    }

    #[rstest]
    fn rejects_paths_without_file_name() {
        assert!(FileTokenStore::new(Path::new("/")).is_err());
    }
}
