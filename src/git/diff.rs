//! Diff collection from the index and working tree using git2.

use git2::{Delta, Diff, DiffFormat, DiffOptions, ErrorCode, Patch, Repository, Tree};
use tracing::debug;

use crate::error::GitError;

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found),
/// `Ok(Some(tree))` for repos with a valid HEAD, or `Err(GitError::DiffFailed)`
/// for real errors (corrupt HEAD, permission issues, missing objects).
pub(crate) fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(GitError::DiffFailed)?;
    Ok(Some(tree))
}

fn text_options() -> DiffOptions {
    let mut opts = DiffOptions::new();
    opts.show_binary(false);
    opts
}

/// Diff between HEAD and the index (`git diff --cached`).
pub(crate) fn staged(repo: &Repository) -> Result<Diff<'_>, GitError> {
    let head_tree = resolve_head_tree(repo)?;
    repo.diff_tree_to_index(head_tree.as_ref(), None, Some(&mut text_options()))
        .map_err(GitError::DiffFailed)
}

/// Diff between the index and the working tree (`git diff`).
///
/// Untracked files are not part of this diff, matching `git diff`.
pub(crate) fn unstaged(repo: &Repository) -> Result<Diff<'_>, GitError> {
    repo.diff_index_to_workdir(None, Some(&mut text_options()))
        .map_err(GitError::DiffFailed)
}

/// Staged diff text.
pub fn staged_diff(repo: &Repository) -> Result<String, GitError> {
    patch_text(&staged(repo)?)
}

/// Unstaged diff text.
pub fn unstaged_diff(repo: &Repository) -> Result<String, GitError> {
    patch_text(&unstaged(repo)?)
}

/// The diff to describe: staged changes if any, else unstaged changes.
pub fn collect_diff(repo: &Repository) -> Result<String, GitError> {
    select_diff(staged_diff(repo)?, || unstaged_diff(repo))
}

/// Pick the staged diff when non-empty, else fall back to `unstaged`.
///
/// `unstaged` is only evaluated when the staged diff is empty.
pub fn select_diff<F>(staged: String, unstaged: F) -> Result<String, GitError>
where
    F: FnOnce() -> Result<String, GitError>,
{
    if !staged.is_empty() {
        debug!("Using staged diff ({} bytes)", staged.len());
        return Ok(staged);
    }

    let unstaged = unstaged()?;
    if unstaged.is_empty() {
        return Err(GitError::NoChanges);
    }

    debug!("Nothing staged, using unstaged diff ({} bytes)", unstaged.len());
    Ok(unstaged)
}

/// Render a diff as unified patch text.
///
/// Fails with [`GitError::BinaryContent`] when any changed file is binary.
fn patch_text(diff: &Diff<'_>) -> Result<String, GitError> {
    let binaries = binary_paths(diff)?;
    if !binaries.is_empty() {
        return Err(GitError::BinaryContent(binaries));
    }

    let mut text = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        if origin == '+' || origin == '-' || origin == ' ' {
            text.push(origin);
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        true
    })
    .map_err(GitError::DiffFailed)?;

    Ok(text)
}

/// Paths of changed files that git considers binary.
fn binary_paths(diff: &Diff<'_>) -> Result<Vec<String>, GitError> {
    let mut paths = Vec::new();

    for idx in 0..diff.deltas().len() {
        // Patch::from_diff loads the content, which is what sets the binary flag.
        let is_binary = match Patch::from_diff(diff, idx).map_err(GitError::DiffFailed)? {
            Some(patch) => patch.delta().flags().is_binary(),
            None => diff
                .get_delta(idx)
                .is_some_and(|delta| delta.status() != Delta::Unmodified),
        };

        if is_binary && let Some(delta) = diff.get_delta(idx) {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default();
            paths.push(path);
        }
    }

    Ok(paths)
}
