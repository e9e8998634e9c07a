use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Result, ShipError};

/// Advisory marker that a release is in progress.
///
/// The sentinel is created with create-new semantics, so a second run fails
/// with [`ShipError::LockHeld`] instead of racing the first one. It is removed
/// explicitly; an interrupted run leaves it behind.
#[derive(Debug)]
pub struct ReleaseLock {
    path: PathBuf,
}

impl ReleaseLock {
    /// Default sentinel location for a project: `<temp>/<name>_releasing`
    pub fn default_path(project: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{project}_releasing"))
    }

    pub fn acquire(path: &Path) -> Result<Self> {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(_) => {
                tracing::info!("Acquired release lock: {}", path.display());
                Ok(Self {
                    path: path.to_path_buf(),
                })
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(ShipError::LockHeld {
                path: path.to_path_buf(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn release(self) -> Result<()> {
        remove_sentinel(&self.path)?;
        tracing::info!("Released release lock: {}", self.path.display());
        Ok(())
    }
}

/// Remove a sentinel left behind by an interrupted run. Returns whether one
/// existed.
pub fn remove_sentinel(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_acquire_and_release() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("urh_releasing");

        let lock = ReleaseLock::acquire(&path).unwrap();
        assert!(path.exists());
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);

        lock.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_second_acquire_is_refused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("urh_releasing");

        let _held = ReleaseLock::acquire(&path).unwrap();
        let err = ReleaseLock::acquire(&path).unwrap_err();
        assert!(matches!(err, ShipError::LockHeld { .. }));
    }

    #[test]
    fn test_remove_stale_sentinel() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("urh_releasing");
        fs::write(&path, b"").unwrap();

        assert!(remove_sentinel(&path).unwrap());
        assert!(!remove_sentinel(&path).unwrap());
    }

    #[test]
    fn test_default_path_is_in_temp_dir() {
        let path = ReleaseLock::default_path("urh");
        assert_eq!(path.file_name().unwrap(), "urh_releasing");
        assert!(path.starts_with(std::env::temp_dir()));
    }
}
