//! Repository checks and description
//!
//! Guards against running outside a git repository and gathers the
//! details shown in the startup banner.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use git2::Repository;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("❌ Not a git repository: {}", path.display())]
    NotARepository { path: PathBuf },
}

/// Basic facts about the monitored repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    /// Working directory being monitored
    pub workdir: PathBuf,
    /// Branch name (if not detached or unborn)
    pub branch: Option<String>,
}

impl RepoInfo {
    /// Fallback used when the repository cannot be opened for details
    pub fn unknown(path: &Path) -> Self {
        Self {
            workdir: path.to_path_buf(),
            branch: None,
        }
    }
}

/// Check that `path` holds git metadata
///
/// Only `path` itself is checked, not its parents. `.git` may be a
/// directory or, for linked worktrees, a file.
pub fn ensure_repository(path: &Path) -> Result<(), RepoError> {
    if path.join(".git").exists() {
        Ok(())
    } else {
        Err(RepoError::NotARepository {
            path: path.to_path_buf(),
        })
    }
}

/// Describe the repository at `path` for display
pub fn describe(path: &Path) -> Result<RepoInfo> {
    let repo = Repository::open(path).context("Failed to open git repository")?;

    let workdir = repo
        .workdir()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| path.to_path_buf());

    Ok(RepoInfo {
        workdir,
        branch: get_current_branch(&repo),
    })
}

/// Get the current branch name from a repository
fn get_current_branch(repo: &Repository) -> Option<String> {
    repo.head().ok().and_then(|head| {
        if head.is_branch() {
            head.shorthand().map(|s| s.to_string())
        } else {
            // Detached HEAD
            None
        }
    })
}
