//! Working tree change detection
//!
//! Asks the git CLI for the staged, unstaged and untracked file lists
//! and bundles them into a single snapshot.

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Files differing between the index and HEAD
const STAGED_ARGS: &[&str] = &["diff", "--cached", "--name-only"];
/// Files differing between the working tree and the index
const UNSTAGED_ARGS: &[&str] = &["diff", "--name-only"];
/// Files git does not track, minus anything matched by ignore rules
const UNTRACKED_ARGS: &[&str] = &["ls-files", "--others", "--exclude-standard"];

/// Reasons a change read can fail
#[derive(Debug, Error)]
pub enum ChangeError {
    #[error("Failed to run `git {command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`git {command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// One complete poll of the working tree
///
/// All three lists come from the same read. A snapshot is never built
/// from a partial read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSnapshot {
    staged: Vec<String>,
    unstaged: Vec<String>,
    untracked: Vec<String>,
}

impl ChangeSnapshot {
    pub fn new(staged: Vec<String>, unstaged: Vec<String>, untracked: Vec<String>) -> Self {
        Self {
            staged,
            unstaged,
            untracked,
        }
    }

    /// Paths with changes recorded in the index
    pub fn staged(&self) -> &[String] {
        &self.staged
    }

    /// Paths with working tree edits not yet added to the index
    pub fn unstaged(&self) -> &[String] {
        &self.unstaged
    }

    /// Paths git has never tracked, excluding ignored ones
    pub fn untracked(&self) -> &[String] {
        &self.untracked
    }

    /// Combined length of the three lists
    ///
    /// A file with both staged and unstaged edits counts twice.
    pub fn total(&self) -> usize {
        self.staged.len() + self.unstaged.len() + self.untracked.len()
    }
}

/// Anything that can produce change snapshots
pub trait ChangeSource {
    fn read_changes(&self) -> impl Future<Output = Result<ChangeSnapshot, ChangeError>>;
}

/// Reads changes by shelling out to the `git` binary
#[derive(Debug, Clone)]
pub struct GitCli {
    dir: PathBuf,
}

impl GitCli {
    /// Create a reader for the working tree at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Run one git command and parse its stdout as a path list
    async fn list(&self, args: &[&str]) -> Result<Vec<String>, ChangeError> {
        let command = args.join(" ");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ChangeError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(
                event = "git.changes.command_failed",
                command = %command,
                status = %output.status,
                stderr = %stderr
            );
            return Err(ChangeError::Failed {
                command,
                status: output.status,
                stderr,
            });
        }

        // Non-UTF-8 names still count as one path each
        let stdout = String::from_utf8_lossy(&output.stdout);

        let paths = parse_paths(&stdout);
        debug!(
            event = "git.changes.command_completed",
            command = %command,
            count = paths.len()
        );
        Ok(paths)
    }
}

impl ChangeSource for GitCli {
    async fn read_changes(&self) -> Result<ChangeSnapshot, ChangeError> {
        let staged = self.list(STAGED_ARGS).await?;
        let unstaged = self.list(UNSTAGED_ARGS).await?;
        let untracked = self.list(UNTRACKED_ARGS).await?;

        Ok(ChangeSnapshot::new(staged, unstaged, untracked))
    }
}

/// Split newline-separated git output into paths
///
/// Blank lines are dropped, so empty output or a lone trailing newline
/// yields an empty list.
pub fn parse_paths(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    use git2::{Repository, Signature};
    use tempfile::TempDir;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn require_git() {
        let available = std::process::Command::new("git")
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false);
        assert!(available, "these tests need the git binary on PATH");
    }

    fn commit_all(repo: &Repository, files: &[&str], message: &str) {
        let mut index = repo.index().unwrap();
        for file in files {
            index.add_path(Path::new(file)).unwrap();
        }
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("Test", "test@example.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<_> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap();
    }

    #[test]
    fn test_parse_paths_drops_blank_lines() {
        assert!(parse_paths("").is_empty());
        assert!(parse_paths("\n").is_empty());
        assert_eq!(parse_paths("a.txt\n"), paths(&["a.txt"]));
        assert_eq!(
            parse_paths("src/main.rs\nREADME.md\n"),
            paths(&["src/main.rs", "README.md"])
        );
    }

    #[test]
    fn test_parse_paths_handles_crlf() {
        assert_eq!(parse_paths("a.txt\r\nb.txt\r\n"), paths(&["a.txt", "b.txt"]));
    }

    #[test]
    fn test_snapshot_total() {
        let snapshot = ChangeSnapshot::new(
            paths(&["a.txt", "b.txt"]),
            paths(&["a.txt"]),
            paths(&["c.txt", "d.txt", "e.txt"]),
        );
        assert_eq!(snapshot.total(), 6);
        assert_eq!(
            snapshot.total(),
            snapshot.staged().len() + snapshot.unstaged().len() + snapshot.untracked().len()
        );
        assert_eq!(ChangeSnapshot::default().total(), 0);
    }

    #[tokio::test]
    async fn test_git_cli_reads_all_three_lists() {
        require_git();

        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let repo = Repository::init(root).unwrap();

        fs::write(root.join("tracked.txt"), "one\n").unwrap();
        fs::write(root.join(".gitignore"), "ignored.log\n").unwrap();
        commit_all(&repo, &["tracked.txt", ".gitignore"], "Initial commit");

        // unstaged edit
        fs::write(root.join("tracked.txt"), "one\ntwo\n").unwrap();

        // staged new file
        fs::write(root.join("staged.txt"), "new\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("staged.txt")).unwrap();
        index.write().unwrap();

        fs::write(root.join("untracked.txt"), "loose\n").unwrap();
        fs::write(root.join("ignored.log"), "noise\n").unwrap();

        let snapshot = GitCli::new(root).read_changes().await.unwrap();

        assert_eq!(snapshot.staged(), paths(&["staged.txt"]).as_slice());
        assert_eq!(snapshot.unstaged(), paths(&["tracked.txt"]).as_slice());
        assert_eq!(snapshot.untracked(), paths(&["untracked.txt"]).as_slice());
        assert_eq!(snapshot.total(), 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_git_cli_counts_non_utf8_paths() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        require_git();

        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let repo = Repository::init(root).unwrap();
        repo.config()
            .unwrap()
            .set_bool("core.quotepath", false)
            .unwrap();

        // Latin-1 "café.txt"
        fs::write(root.join(OsStr::from_bytes(b"caf\xe9.txt")), "bytes\n").unwrap();
        fs::write(root.join("plain.txt"), "text\n").unwrap();

        let snapshot = GitCli::new(root).read_changes().await.unwrap();

        assert_eq!(snapshot.total(), 2);
        assert_eq!(snapshot.untracked().len(), 2);
        assert!(snapshot.untracked().contains(&"plain.txt".to_string()));
    }

    #[tokio::test]
    async fn test_git_cli_outside_repository_fails() {
        require_git();

        let dir = TempDir::new().unwrap();

        let result = GitCli::new(dir.path()).read_changes().await;
        assert!(matches!(result, Err(ChangeError::Failed { .. })));
    }

    #[tokio::test]
    async fn test_git_cli_clean_repository() {
        require_git();

        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("file.txt"), "content\n").unwrap();
        commit_all(&repo, &["file.txt"], "Initial commit");

        let snapshot = GitCli::new(dir.path()).read_changes().await.unwrap();
        assert_eq!(snapshot, ChangeSnapshot::default());
    }

    #[tokio::test]
    async fn test_git_cli_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");

        let result = GitCli::new(&missing).read_changes().await;
        assert!(matches!(result, Err(ChangeError::Spawn { .. })));
    }
}
