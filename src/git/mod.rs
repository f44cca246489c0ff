//! Git operations module
//!
//! Provides functionality for interacting with git repositories:
//! - Reading staged, unstaged and untracked file lists via the git CLI
//! - Pre-flight repository checks and banner details

mod changes;
mod repo;

pub use changes::{ChangeError, ChangeSnapshot, ChangeSource, GitCli};
pub use repo::{RepoInfo, describe, ensure_repository};
