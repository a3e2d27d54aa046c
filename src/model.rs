use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// One historical commit as handed to the aggregator by a [`crate::source::CommitSource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    pub message: String,
    pub author_name: String,
    /// Committer time.
    pub timestamp: DateTime<Utc>,
    pub changes: Vec<FileChange>,
}

/// A path touched by a commit. `new_path` is `None` when the file was deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub old_path: Option<String>,
    pub new_path: Option<String>,
}

impl FileChange {
    pub fn added(path: impl Into<String>) -> Self {
        Self { old_path: None, new_path: Some(path.into()) }
    }

    pub fn modified(path: impl Into<String>) -> Self {
        let path = path.into();
        Self { old_path: Some(path.clone()), new_path: Some(path) }
    }

    pub fn deleted(path: impl Into<String>) -> Self {
        Self { old_path: Some(path.into()), new_path: None }
    }

    pub fn renamed(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self { old_path: Some(from.into()), new_path: Some(to.into()) }
    }
}

/// Per-file counters. `bugfixes <= modifications` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    pub path: String,
    pub modifications: u64,
    pub bugfixes: u64,
}

impl FileStat {
    pub fn new(path: String) -> Self {
        Self { path, modifications: 0, bugfixes: 0 }
    }

    pub fn record(&mut self, bugfix: bool) {
        self.modifications += 1;
        if bugfix {
            self.bugfixes += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthBucket {
    /// `YYYY-MM`, UTC.
    pub month: String,
    pub events: u64,
    pub bugfix_events: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionStats {
    pub extension: String,
    pub files: u64,
    pub modifications: u64,
    pub bugfixes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotspotOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository_path: String,
    pub since: Option<String>,
    pub until: Option<String>,
    pub extension: Option<String>,
    pub keywords: Vec<String>,
    pub total_files: usize,
    pub entries: Vec<FileStat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository_path: String,
    pub since: Option<String>,
    pub until: Option<String>,
    pub buckets: Vec<MonthBucket>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository_path: String,
    pub since: Option<String>,
    pub until: Option<String>,
    pub extensions: Vec<ExtensionStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new() -> Self {
        Self { since: None, until: None }
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        if let Some(since) = self.since {
            if timestamp < &since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if timestamp > &until {
                return false;
            }
        }
        true
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::new()
    }
}
