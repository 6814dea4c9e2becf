//! Token persistence in a single file, accessed through `cap_std`.
//!
//! The parent directory is opened per operation so the store tolerates the
//! directory appearing or disappearing between runs. Writes go to a hidden
//! temporary file first and are renamed over the target, so a crash never
//! leaves a half-written token behind.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use cap_std::fs::{Dir, OpenOptions};
use cap_std::ambient_authority;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::AuthToken;
use crate::domain::ports::{CredentialStore, CredentialStoreError};

/// Credential store backed by one file on disk.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    directory: PathBuf,
    file_name: String,
}

impl FileCredentialStore {
    /// Store the token at `path`. The parent directory is created on first
    /// save.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialStoreError::Write`] when `path` has no file name.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, CredentialStoreError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                CredentialStoreError::write(format!(
                    "token path {} must end in a UTF-8 file name",
                    path.display()
                ))
            })?
            .to_owned();
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(Self {
            directory,
            file_name,
        })
    }

    /// Full path of the token file.
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    fn open_existing_dir(&self) -> io::Result<Option<Dir>> {
        match Dir::open_ambient_dir(&self.directory, ambient_authority()) {
            Ok(dir) => Ok(Some(dir)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error),
        }
    }

    fn write_atomically(&self, dir: &Dir, contents: &[u8]) -> io::Result<()> {
        let tmp_name = format!(".{}.tmp.{}", self.file_name, std::process::id());
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        let written = dir.open_with(&tmp_name, &options).and_then(|mut file| {
            file.write_all(contents)?;
            file.sync_all()
        });
        if let Err(error) = written {
            drop(dir.remove_file(&tmp_name));
            return Err(error);
        }
        dir.rename(&tmp_name, dir, &self.file_name)
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<AuthToken>, CredentialStoreError> {
        let read_error = |error: io::Error| {
            CredentialStoreError::read(format!("{}: {error}", self.path().display()))
        };
        let Some(dir) = self.open_existing_dir().map_err(read_error)? else {
            return Ok(None);
        };
        match dir.read_to_string(&self.file_name) {
            Ok(contents) => Ok(AuthToken::new(Zeroizing::new(contents).as_str())),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(read_error(error)),
        }
    }

    fn save(&self, token: &AuthToken) -> Result<(), CredentialStoreError> {
        let write_error = |error: io::Error| {
            CredentialStoreError::write(format!("{}: {error}", self.path().display()))
        };
        Dir::create_ambient_dir_all(&self.directory, ambient_authority()).map_err(write_error)?;
        let dir = Dir::open_ambient_dir(&self.directory, ambient_authority()).map_err(write_error)?;
        self.write_atomically(&dir, token.expose().as_bytes())
            .map_err(write_error)?;
        debug!(path = %self.path().display(), "credential persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialStoreError> {
        let write_error = |error: io::Error| {
            CredentialStoreError::write(format!("{}: {error}", self.path().display()))
        };
        let Some(dir) = self.open_existing_dir().map_err(write_error)? else {
            return Ok(());
        };
        match dir.remove_file(&self.file_name) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(write_error(error)),
        }
    }
}
