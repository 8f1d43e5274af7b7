//! Git operations using git2-rs.

pub mod commit;
pub mod diff;

use std::path::Path;

use git2::Repository;
use tracing::debug;

use crate::error::GitError;

pub use diff::{collect_diff, select_diff};

/// Access to the working tree the commit is made in.
///
/// This abstraction allows the approval loop to run against a fake repository
/// in tests.
#[cfg_attr(test, mockall::automock)]
pub trait Gateway {
    /// Staged diff if non-empty, else the unstaged diff.
    fn diff(&self) -> Result<String, GitError>;

    /// Commit `message`, staging everything first if nothing is staged.
    /// Returns the new commit id.
    fn commit(&self, message: &str) -> Result<String, GitError>;
}

/// A git2-backed [`Gateway`] over a non-bare repository.
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Find the repository containing `path`, searching parent directories.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let repo = Repository::discover(path.as_ref())
            .map_err(|e| GitError::NotARepository(Some(e)))?;

        if repo.is_bare() {
            return Err(GitError::NotARepository(None));
        }

        debug!("Using repository at {}", repo.path().display());
        Ok(Self { repo })
    }

    /// The repository for the current directory.
    pub fn open_current() -> Result<Self, GitError> {
        Self::discover(".")
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }
}

impl Gateway for GitRepository {
    fn diff(&self) -> Result<String, GitError> {
        collect_diff(&self.repo)
    }

    fn commit(&self, message: &str) -> Result<String, GitError> {
        commit::commit(&self.repo, message).map(|oid| oid.to_string())
    }
}
