use std::collections::HashSet;

use crate::pids::WatchedPids;
use pidcat_types::{LogEntry, Severity};

/// Why an entry was dropped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// Pid is not one of the watched processes
    Pid,
    /// Below the minimum level
    Level,
    /// Tag is on the ignore list
    IgnoredTag,
    /// A tag allow-list is set and the tag isn't on it
    UnmatchedTag,
}

/// Filter chain applied to every parsed entry
#[derive(Clone)]
pub struct EntryFilter {
    /// Pids of the watched packages (empty = all)
    pids: WatchedPids,

    /// Minimum level to show
    min_level: Severity,

    /// Tags to include (empty = all)
    tags: HashSet<String>,

    /// Tags to drop
    ignore_tags: HashSet<String>,
}

impl EntryFilter {
    pub fn new(pids: WatchedPids) -> Self {
        Self {
            pids,
            min_level: Severity::Verbose,
            tags: HashSet::new(),
            ignore_tags: HashSet::new(),
        }
    }

    /// Set the minimum level
    pub fn with_min_level(mut self, min_level: Severity) -> Self {
        self.min_level = min_level;
        self
    }

    /// Only show these tags
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Never show these tags
    pub fn with_ignored_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Run the chain: pid, level, ignored tags, then the tag allow-list
    pub fn check(&self, entry: &LogEntry) -> Result<(), Rejection> {
        if !self.pids.admits(&entry.pid) {
            return Err(Rejection::Pid);
        }

        if !entry.severity().is_in_scope(self.min_level) {
            return Err(Rejection::Level);
        }

        if self.ignore_tags.contains(&entry.tag) {
            return Err(Rejection::IgnoredTag);
        }

        if !self.tags.is_empty() && !self.tags.contains(&entry.tag) {
            return Err(Rejection::UnmatchedTag);
        }

        Ok(())
    }

    /// Check if a log entry passes every filter
    pub fn matches(&self, entry: &LogEntry) -> bool {
        self.check(entry).is_ok()
    }
}

impl std::fmt::Debug for EntryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryFilter")
            .field("pids", &self.pids)
            .field("min_level", &self.min_level)
            .field("tags", &self.tags)
            .field("ignore_tags", &self.ignore_tags)
            .finish()
    }
}
