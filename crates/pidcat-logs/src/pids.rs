use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::PipelineError;
use pidcat_adb::{AdbError, PidResolver};

/// How often the watchdog re-resolves package pids
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Grow-only set of pids whose lines are shown
///
/// Written by the watchdog, read by the render stage. Writers publish a
/// fresh immutable snapshot; readers never see a set mid-update.
#[derive(Clone, Default)]
pub struct WatchedPids {
    current: Arc<RwLock<Arc<HashSet<String>>>>,
}

impl WatchedPids {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pid; returns false if it was already watched
    pub fn insert(&self, pid: &str) -> bool {
        let mut current = self.current.write();
        if current.contains(pid) {
            return false;
        }
        let mut next = HashSet::clone(&current);
        next.insert(pid.to_string());
        *current = Arc::new(next);
        true
    }

    /// The set as of now
    pub fn snapshot(&self) -> Arc<HashSet<String>> {
        Arc::clone(&self.current.read())
    }

    /// Whether `pid` passes: always true while nothing is watched yet
    pub fn admits(&self, pid: &str) -> bool {
        let pids = self.snapshot();
        pids.is_empty() || pids.contains(pid)
    }
}

impl std::fmt::Debug for WatchedPids {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.snapshot().iter()).finish()
    }
}

/// Polls the device for the pids of the watched packages
pub struct PidWatchdog<R> {
    resolver: Arc<R>,
    packages: Vec<String>,
    pids: WatchedPids,
    interval: Duration,
}

impl<R: PidResolver> PidWatchdog<R> {
    pub fn new(resolver: Arc<R>, packages: Vec<String>, pids: WatchedPids) -> Self {
        Self {
            resolver,
            packages,
            pids,
            interval: POLL_INTERVAL,
        }
    }

    /// Override the poll interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// One resolution pass over every package
    ///
    /// Returns how many pids were new. A package with no running process is
    /// an error, same as a failure to query the device.
    pub async fn tick(&self) -> Result<usize, PipelineError> {
        let mut added = 0;
        for package in &self.packages {
            let pid = self
                .resolver
                .resolve_pid(package)
                .await?
                .ok_or_else(|| AdbError::NoPid(package.clone()))?;

            if self.pids.insert(&pid) {
                info!(package = %package, pid = %pid, "Watching new pid");
                added += 1;
            }
        }
        Ok(added)
    }

    /// Poll until `cancel` fires or a resolution fails
    ///
    /// The first pass runs immediately. A pass in flight when `cancel` fires
    /// is abandoned.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), PipelineError> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,

                _ = ticker.tick() => {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        result = self.tick() => {
                            result?;
                        }
                    }
                }
            }
        }

        debug!(watched = self.pids.snapshot().len(), "Pid watchdog stopped");
        Ok(())
    }
}
