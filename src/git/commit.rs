//! Staging and commit creation.

use git2::{IndexAddOption, Oid, Repository};
use tracing::debug;

use crate::error::GitError;

use super::diff::{resolve_head_tree, staged};

/// Whether the index differs from HEAD.
pub fn has_staged_changes(repo: &Repository) -> Result<bool, GitError> {
    Ok(staged(repo)?.deltas().len() > 0)
}

/// Stage everything in the working tree, like `git add -A`.
///
/// `add_all` picks up new and modified files (honouring `.gitignore`);
/// `update_all` records deletions of tracked files.
pub fn stage_all(repo: &Repository) -> Result<(), GitError> {
    let mut index = repo.index().map_err(GitError::StagingFailed)?;
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .map_err(GitError::StagingFailed)?;
    index
        .update_all(["*"].iter(), None)
        .map_err(GitError::StagingFailed)?;
    index.write().map_err(GitError::StagingFailed)?;
    Ok(())
}

/// Create a commit on HEAD with `message`, verbatim.
///
/// If nothing is staged, everything in the working tree is staged first.
/// Fails with [`GitError::NothingToCommit`] if the index still matches HEAD
/// after that.
pub fn commit(repo: &Repository, message: &str) -> Result<Oid, GitError> {
    if message.trim().is_empty() {
        return Err(GitError::EmptyMessage);
    }

    if !has_staged_changes(repo)? {
        debug!("Nothing staged, staging all changes");
        stage_all(repo)?;

        if !has_staged_changes(repo)? {
            return Err(GitError::NothingToCommit);
        }
    }

    let mut index = repo.index().map_err(GitError::StagingFailed)?;
    let tree_id = index.write_tree().map_err(GitError::StagingFailed)?;
    let tree = repo.find_tree(tree_id).map_err(GitError::CommitFailed)?;

    let sig = repo.signature().map_err(GitError::SignatureMissing)?;

    // An unborn branch has no parent.
    let parent = match resolve_head_tree(repo)? {
        Some(_) => Some(
            repo.head()
                .and_then(|h| h.peel_to_commit())
                .map_err(GitError::CommitFailed)?,
        ),
        None => None,
    };
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    let oid = repo
        .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .map_err(GitError::CommitFailed)?;

    debug!("Created commit {}", oid);
    Ok(oid)
}
