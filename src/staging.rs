//! Local staging area for one site build.
//!
//! A build downloads photos and writes pages into a flat directory before
//! uploading them. Two builds sharing that directory would overwrite each
//! other's files, so a staging area is always exclusive to one run:
//!
//! - [`Staging::temporary`] creates a fresh directory that is removed on drop.
//! - [`Staging::locked`] uses a caller-chosen directory and holds an advisory
//!   lock file (`.album-site.lock`) in it until dropped. A second run against
//!   the same directory fails with [`StagingError::Locked`].
//!
//! The lock is created with create-new semantics, so the check and the claim
//! are one filesystem operation. A crashed run leaves the lock behind; remove
//! it by hand once no build is running.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;

pub const LOCK_FILENAME: &str = ".album-site.lock";

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("staging directory {0} is in use by another build (remove .album-site.lock if stale)")]
    Locked(PathBuf),
}

enum Guard {
    Lock(PathBuf),
    Temp(TempDir),
}

/// Exclusive handle on a staging directory.
pub struct Staging {
    dir: PathBuf,
    guard: Guard,
}

impl Staging {
    /// Claim `dir`, creating it if absent.
    pub fn locked(dir: &Path) -> Result<Self, StagingError> {
        Self::claim(dir, |lock| writeln!(lock, "{}", std::process::id()))
    }

    fn claim(
        dir: &Path,
        write_owner: impl FnOnce(&mut File) -> io::Result<()>,
    ) -> Result<Self, StagingError> {
        fs::create_dir_all(dir)?;
        let lock_path = dir.join(LOCK_FILENAME);
        let mut lock = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(StagingError::Locked(dir.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        // From here on, dropping `staging` releases the lock.
        let staging = Self {
            dir: dir.to_path_buf(),
            guard: Guard::Lock(lock_path),
        };
        let written = write_owner(&mut lock);
        drop(lock);
        written?;
        tracing::debug!(dir = %dir.display(), "staging directory locked");
        Ok(staging)
    }

    /// A fresh directory unique to this run.
    pub fn temporary() -> Result<Self, StagingError> {
        let tmp = tempfile::Builder::new().prefix("album-site-").tempdir()?;
        Ok(Self {
            dir: tmp.path().to_path_buf(),
            guard: Guard::Temp(tmp),
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}

impl Drop for Staging {
    fn drop(&mut self) {
        match &self.guard {
            Guard::Lock(lock_path) => {
                if let Err(e) = fs::remove_file(lock_path) {
                    tracing::warn!(lock = %lock_path.display(), error = %e, "failed to release staging lock");
                }
            }
            // TempDir removes itself
            Guard::Temp(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_creates_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested/staging");
        let staging = Staging::locked(&dir).unwrap();
        assert!(staging.path().is_dir());
        assert!(dir.join(LOCK_FILENAME).exists());
    }

    #[test]
    fn second_lock_on_same_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let _first = Staging::locked(tmp.path()).unwrap();
        let second = Staging::locked(tmp.path());
        assert!(matches!(second, Err(StagingError::Locked(p)) if p == tmp.path()));
    }

    #[test]
    fn lock_is_released_on_drop() {
        let tmp = TempDir::new().unwrap();
        drop(Staging::locked(tmp.path()).unwrap());
        assert!(!tmp.path().join(LOCK_FILENAME).exists());
        assert!(Staging::locked(tmp.path()).is_ok());
    }

    #[test]
    fn failed_owner_write_releases_lock() {
        let tmp = TempDir::new().unwrap();
        let result = Staging::claim(tmp.path(), |_| Err(io::Error::other("disk full")));

        assert!(matches!(result, Err(StagingError::Io(_))));
        assert!(!tmp.path().join(LOCK_FILENAME).exists());
        assert!(Staging::locked(tmp.path()).is_ok());
    }

    #[test]
    fn temporary_directories_are_distinct_and_removed() {
        let a = Staging::temporary().unwrap();
        let b = Staging::temporary().unwrap();
        assert_ne!(a.path(), b.path());

        let path = a.path().to_path_buf();
        assert!(path.is_dir());
        drop(a);
        assert!(!path.exists());
    }
}
