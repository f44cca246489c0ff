//! Main monitor struct and polling loop
//!
//! Contains the Monitor with the last observed change count,
//! and the loop that polls a change source until shutdown.

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveTime};
use tracing::debug;

use crate::git::{ChangeError, ChangeSnapshot, ChangeSource, RepoInfo};
use crate::report::{self, Report};

/// Delay between the end of one poll and the start of the next
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Polls for changes and reports when the total moves
pub struct Monitor<W: Write> {
    interval: Duration,
    /// Total from the most recent successful poll
    last_count: usize,
    out: W,
}

impl<W: Write> Monitor<W> {
    /// Create a monitor writing reports to `out`
    pub fn new(interval: Duration, out: W) -> Self {
        Self {
            interval,
            last_count: 0,
            out,
        }
    }

    pub fn last_count(&self) -> usize {
        self.last_count
    }

    /// Fold one poll result into the monitor state
    ///
    /// Returns a report only when a successful read changes the total.
    /// A failed read leaves the state untouched. Changes in composition
    /// that keep the same total are not reported.
    pub fn observe(
        &mut self,
        result: Result<ChangeSnapshot, ChangeError>,
        now: NaiveTime,
    ) -> Option<Report> {
        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(err) => {
                debug!(event = "monitor.tick_failed", error = %err);
                return None;
            }
        };

        let current = snapshot.total();
        let report = (current != self.last_count).then(|| Report::from_snapshot(&snapshot, now));
        self.last_count = current;
        report
    }

    /// Print the startup banner
    pub fn announce(&mut self, repo: &RepoInfo) -> Result<()> {
        report::write_banner(&mut self.out, repo).context("Failed to write banner")
    }

    /// Poll until `shutdown` resolves
    ///
    /// `shutdown` is raced against both the read and the sleep, so the
    /// loop stops within one interval of it firing.
    pub async fn run<S, F>(&mut self, source: &S, shutdown: F) -> Result<()>
    where
        S: ChangeSource,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                result = self.tick(source) => result?,
            }
        }

        debug!(event = "monitor.stopped", last_count = self.last_count());
        report::write_shutdown(&mut self.out).context("Failed to write shutdown message")
    }

    /// One poll followed by the fixed sleep
    async fn tick<S: ChangeSource>(&mut self, source: &S) -> Result<()> {
        let result = source.read_changes().await;

        if let Some(report) = self.observe(result, Local::now().time()) {
            write!(self.out, "{report}").context("Failed to write report")?;
            self.out.flush().context("Failed to flush report")?;
        }

        tokio::time::sleep(self.interval).await;
        Ok(())
    }
}
