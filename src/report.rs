//! Console output
//!
//! Renders the change report block along with the startup banner
//! and shutdown line.

use std::fmt;
use std::io::{self, Write};

use chrono::NaiveTime;

use crate::git::{ChangeSnapshot, RepoInfo};

/// Width of the separator printed under each report
const RULE_WIDTH: usize = 40;

/// Counts printed when the total number of changes moves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub total: usize,
    pub staged: usize,
    pub unstaged: usize,
    pub untracked: usize,
    /// Local wall-clock time of the poll
    pub at: NaiveTime,
}

impl Report {
    pub fn from_snapshot(snapshot: &ChangeSnapshot, at: NaiveTime) -> Self {
        Self {
            total: snapshot.total(),
            staged: snapshot.staged().len(),
            unstaged: snapshot.unstaged().len(),
            untracked: snapshot.untracked().len(),
            at,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📊 Real file changes: {}", self.total)?;
        writeln!(f, "   📁 Staged: {}", self.staged)?;
        writeln!(f, "   📝 Unstaged: {}", self.unstaged)?;
        writeln!(f, "   ❓ Untracked: {}", self.untracked)?;
        writeln!(f, "   🕐 {}", self.at.format("%H:%M:%S"))?;
        writeln!(f, "{}", "-".repeat(RULE_WIDTH))
    }
}

pub fn write_banner(out: &mut impl Write, repo: &RepoInfo) -> io::Result<()> {
    writeln!(out, "🔍 Monitoring workspace changes...")?;
    match &repo.branch {
        Some(branch) => writeln!(out, "   {} (on {})", repo.workdir.display(), branch)?,
        None => writeln!(out, "   {} (no branch)", repo.workdir.display())?,
    }
    writeln!(out, "Press Ctrl+C to stop")?;
    writeln!(out)?;
    out.flush()
}

pub fn write_shutdown(out: &mut impl Write) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "👋 Monitoring stopped.")?;
    out.flush()
}
