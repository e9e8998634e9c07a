use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Resolve the project root from an entry path.
///
/// A symbolic link is followed one level (relative targets are taken
/// relative to the link's directory), then the result is canonicalized.
pub fn resolve_project_root(entry: &Path) -> Result<PathBuf> {
    let is_link = fs::symlink_metadata(entry)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false);

    let target = if is_link {
        let link = fs::read_link(entry)?;
        if link.is_absolute() {
            link
        } else {
            entry.parent().unwrap_or_else(|| Path::new(".")).join(link)
        }
    } else {
        entry.to_path_buf()
    };

    Ok(fs::canonicalize(target)?)
}

/// Removes generated build and cache directories below a project root
#[derive(Debug, Clone)]
pub struct WorkspaceCleaner {
    root: PathBuf,
    dirs: Vec<PathBuf>,
}

impl WorkspaceCleaner {
    pub fn new<I, P>(root: &Path, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            root: root.to_path_buf(),
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Delete every configured directory. Missing directories are skipped and
    /// a failure on one directory does not stop the others.
    pub fn clean(&self) {
        for dir in &self.dirs {
            let path = self.root.join(dir);
            match fs::remove_dir_all(&path) {
                Ok(()) => tracing::info!("Removed {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    tracing::debug!("Nothing to remove at {}", path.display());
                }
                Err(e) => tracing::warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn populate(root: &Path) {
        fs::create_dir_all(root.join("dist")).unwrap();
        fs::write(root.join("dist/urh-2.9.3.tar.gz"), b"sdist").unwrap();
        fs::create_dir_all(root.join("src/urh/tmp/nested")).unwrap();
        fs::create_dir_all(root.join("src/urh.egg-info")).unwrap();
        fs::write(root.join("src/urh/version.py"), "VERSION = \"2.9.3\"\n").unwrap();
    }

    fn cleaner(root: &Path) -> WorkspaceCleaner {
        WorkspaceCleaner::new(
            root,
            ["dist", "tmp", "urh.egg-info", "src/urh.egg-info", "src/urh/tmp"],
        )
    }

    #[test]
    fn test_removes_known_dirs_only() {
        let dir = tempdir().unwrap();
        populate(dir.path());

        cleaner(dir.path()).clean();

        assert!(!dir.path().join("dist").exists());
        assert!(!dir.path().join("src/urh/tmp").exists());
        assert!(!dir.path().join("src/urh.egg-info").exists());
        assert!(dir.path().join("src/urh/version.py").exists());
    }

    #[test]
    fn test_clean_is_idempotent() {
        let dir = tempdir().unwrap();
        populate(dir.path());

        let cleaner = cleaner(dir.path());
        cleaner.clean();
        cleaner.clean();

        assert!(!dir.path().join("dist").exists());
        assert!(dir.path().join("src/urh").exists());
    }

    #[test]
    fn test_resolve_plain_dir() {
        let dir = tempdir().unwrap();
        let resolved = resolve_project_root(dir.path()).unwrap();
        assert_eq!(resolved, fs::canonicalize(dir.path()).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_follows_symlink() {
        let dir = tempdir().unwrap();
        let project = dir.path().join("project");
        fs::create_dir(&project).unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink("project", &link).unwrap();

        let resolved = resolve_project_root(&link).unwrap();
        assert_eq!(resolved, fs::canonicalize(&project).unwrap());
    }
}
