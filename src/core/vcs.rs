//! Version control backends.
//!
//! Backends shell out to the VCS binaries through `utils::command`; the
//! registry maps `--vcs` ids to backends and lets tests inject fakes.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::utils::command;
use crate::validation;

pub const LOCK_FILE: &str = ".polyglot.lock";

/// A working copy on disk.
pub trait Repository {
    fn path(&self) -> &Path;

    /// Check out `branch` so the working copy tracks it.
    fn configure_branch(&self, branch: &str) -> Result<()>;

    fn lock(&self) -> Result<RepositoryLock> {
        RepositoryLock::acquire(self.path())
    }
}

pub trait VcsBackend {
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    /// Clone `source` into `target`, which may exist but must be empty.
    fn clone_repo(&self, source: &str, target: &Path) -> Result<Box<dyn Repository>>;
}

/// Exclusive lock on a working copy, released on drop.
#[derive(Debug)]
pub struct RepositoryLock {
    path: PathBuf,
}

impl RepositoryLock {
    pub fn acquire(working_copy: &Path) -> Result<Self> {
        let path = working_copy.join(LOCK_FILE);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(Self { path }),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(Error::vcs_locked(working_copy.display().to_string()))
            }
            Err(e) => Err(Error::internal_io(
                e.to_string(),
                Some(format!("lock {}", path.display())),
            )),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RepositoryLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

// Git

pub struct GitBackend;

pub struct GitRepository {
    path: PathBuf,
}

impl GitRepository {
    fn current_branch(&self) -> Option<String> {
        command::run_in_optional(&self.path, "git", &["rev-parse", "--abbrev-ref", "HEAD"])
    }
}

impl Repository for GitRepository {
    fn path(&self) -> &Path {
        &self.path
    }

    fn configure_branch(&self, branch: &str) -> Result<()> {
        if self.current_branch().as_deref() == Some(branch) {
            return Ok(());
        }
        let upstream = format!("origin/{}", branch);
        command::run_in(
            &self.path,
            "git",
            "git",
            &["checkout", "-B", branch, &upstream, "--"],
        )?;
        Ok(())
    }
}

impl VcsBackend for GitBackend {
    fn id(&self) -> &'static str {
        "git"
    }

    fn name(&self) -> &'static str {
        "Git"
    }

    fn clone_repo(&self, source: &str, target: &Path) -> Result<Box<dyn Repository>> {
        command::run("git", "git", &["clone", "--", source, &path_arg(target)])?;
        Ok(Box::new(GitRepository {
            path: target.to_path_buf(),
        }))
    }
}

// Mercurial

pub struct MercurialBackend;

pub struct MercurialRepository {
    path: PathBuf,
}

impl Repository for MercurialRepository {
    fn path(&self) -> &Path {
        &self.path
    }

    fn configure_branch(&self, branch: &str) -> Result<()> {
        command::run_in(&self.path, "mercurial", "hg", &["update", "--", branch])?;
        Ok(())
    }
}

impl VcsBackend for MercurialBackend {
    fn id(&self) -> &'static str {
        "mercurial"
    }

    fn name(&self) -> &'static str {
        "Mercurial"
    }

    fn clone_repo(&self, source: &str, target: &Path) -> Result<Box<dyn Repository>> {
        command::run(
            "mercurial",
            "hg",
            &["clone", "--noupdate", "--", source, &path_arg(target)],
        )?;
        Ok(Box::new(MercurialRepository {
            path: target.to_path_buf(),
        }))
    }
}

/// Backends by id.
pub struct VcsRegistry {
    backends: BTreeMap<&'static str, Box<dyn VcsBackend>>,
}

impl VcsRegistry {
    pub fn empty() -> Self {
        Self {
            backends: BTreeMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(GitBackend));
        registry.register(Box::new(MercurialBackend));
        registry
    }

    /// Registering an id twice replaces the earlier backend.
    pub fn register(&mut self, backend: Box<dyn VcsBackend>) {
        self.backends.insert(backend.id(), backend);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.backends.contains_key(id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.backends.keys().map(|id| id.to_string()).collect()
    }

    pub fn get(&self, id: &str) -> Result<&dyn VcsBackend> {
        validation::require_one_of(
            self.backends.get(id).map(|b| b.as_ref()),
            "vcs",
            &format!("Invalid vcs: {}", id),
            self.ids(),
        )
    }
}

impl Default for VcsRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn defaults_include_git_and_mercurial() {
        let registry = VcsRegistry::with_defaults();
        assert_eq!(registry.ids(), vec!["git", "mercurial"]);
        assert_eq!(registry.get("git").unwrap().name(), "Git");
    }

    #[test]
    fn unknown_vcs_is_invalid_argument() {
        let err = VcsRegistry::with_defaults().get("cvs").err().unwrap();
        assert_eq!(err.code, ErrorCode::ValidationInvalidArgument);
        assert_eq!(err.message, "Invalid vcs: cvs");
        assert_eq!(err.details["tried"][1], "mercurial");
    }

    #[test]
    fn lock_is_exclusive_and_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let lock = RepositoryLock::acquire(dir.path()).unwrap();
        assert!(lock.path().exists());

        let err = RepositoryLock::acquire(dir.path()).unwrap_err();
        assert_eq!(err.code, ErrorCode::VcsLocked);

        drop(lock);
        assert!(!dir.path().join(LOCK_FILE).exists());
        assert!(RepositoryLock::acquire(dir.path()).is_ok());
    }

    #[test]
    fn clone_failure_is_vcs_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-repo");
        let err = GitBackend
            .clone_repo(&missing.to_string_lossy(), &dir.path().join("out"))
            .err()
            .unwrap();
        assert_eq!(err.code, ErrorCode::VcsCommandFailed);
    }
}
