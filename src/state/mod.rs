use crate::shared::{atomic_write_file, now_rfc3339};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to encode processing state for {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write processing state {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A directory the scheduler drains. Each keeps its own dedup record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchedFolder {
    NeedsAction,
    Approved,
}

impl WatchedFolder {
    pub const ALL: [WatchedFolder; 2] = [WatchedFolder::NeedsAction, WatchedFolder::Approved];

    pub fn dir_name(self) -> &'static str {
        match self {
            WatchedFolder::NeedsAction => crate::config::NEEDS_ACTION_DIR,
            WatchedFolder::Approved => crate::config::APPROVED_DIR,
        }
    }

    pub fn success_stat(self) -> Stat {
        match self {
            WatchedFolder::NeedsAction => Stat::NeedsActionProcessed,
            WatchedFolder::Approved => Stat::ApprovedExecuted,
        }
    }
}

impl std::fmt::Display for WatchedFolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    NeedsActionProcessed,
    ApprovedExecuted,
    Errors,
}

impl Stat {
    pub fn as_str(self) -> &'static str {
        match self {
            Stat::NeedsActionProcessed => "needs_action_processed",
            Stat::ApprovedExecuted => "approved_executed",
            Stat::Errors => "errors",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "needs_action_processed" => Some(Stat::NeedsActionProcessed),
            "approved_executed" => Some(Stat::ApprovedExecuted),
            "errors" => Some(Stat::Errors),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingStats {
    pub needs_action_processed: u64,
    pub approved_executed: u64,
    pub errors: u64,
}

impl ProcessingStats {
    pub fn get(&self, stat: Stat) -> u64 {
        match stat {
            Stat::NeedsActionProcessed => self.needs_action_processed,
            Stat::ApprovedExecuted => self.approved_executed,
            Stat::Errors => self.errors,
        }
    }

    fn slot(&mut self, stat: Stat) -> &mut u64 {
        match stat {
            Stat::NeedsActionProcessed => &mut self.needs_action_processed,
            Stat::ApprovedExecuted => &mut self.approved_executed,
            Stat::Errors => &mut self.errors,
        }
    }
}

impl std::fmt::Display for ProcessingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "needs_action_processed={} approved_executed={} errors={}",
            self.needs_action_processed, self.approved_executed, self.errors
        )
    }
}

/// On-disk record. Oldest names come first in each processed list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingState {
    pub processed_needs_action: Vec<String>,
    pub processed_approved: Vec<String>,
    pub last_run: Option<String>,
    pub stats: ProcessingStats,
}

impl ProcessingState {
    pub fn processed(&self, folder: WatchedFolder) -> &[String] {
        match folder {
            WatchedFolder::NeedsAction => &self.processed_needs_action,
            WatchedFolder::Approved => &self.processed_approved,
        }
    }

    fn processed_mut(&mut self, folder: WatchedFolder) -> &mut Vec<String> {
        match folder {
            WatchedFolder::NeedsAction => &mut self.processed_needs_action,
            WatchedFolder::Approved => &mut self.processed_approved,
        }
    }
}

/// How [`StateStore::load`] arrived at its starting state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Fresh,
    Loaded,
    Recovered { reason: String },
}

#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    retention: usize,
    state: ProcessingState,
    outcome: LoadOutcome,
}

impl StateStore {
    /// Never fails: an absent, unreadable or malformed file starts from an
    /// empty state, and the reason is kept in [`StateStore::load_outcome`].
    pub fn load(path: &Path, retention: usize) -> Self {
        let retention = retention.max(1);
        let (mut state, outcome) = match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<ProcessingState>(&raw) {
                Ok(state) => (state, LoadOutcome::Loaded),
                Err(err) => (
                    ProcessingState::default(),
                    LoadOutcome::Recovered {
                        reason: format!("malformed state file: {err}"),
                    },
                ),
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                (ProcessingState::default(), LoadOutcome::Fresh)
            }
            Err(err) => (
                ProcessingState::default(),
                LoadOutcome::Recovered {
                    reason: format!("unreadable state file: {err}"),
                },
            ),
        };

        for folder in WatchedFolder::ALL {
            enforce_retention(state.processed_mut(folder), retention);
        }

        Self {
            path: path.to_path_buf(),
            retention,
            state,
            outcome,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &ProcessingState {
        &self.state
    }

    pub fn stats(&self) -> &ProcessingStats {
        &self.state.stats
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.outcome
    }

    pub fn is_processed(&self, folder: WatchedFolder, name: &str) -> bool {
        self.state.processed(folder).iter().any(|entry| entry == name)
    }

    /// Idempotent. Drops the oldest names once the retention window is full.
    pub fn mark_processed(&mut self, folder: WatchedFolder, name: &str) {
        if self.is_processed(folder, name) {
            return;
        }
        let entries = self.state.processed_mut(folder);
        entries.push(name.to_string());
        enforce_retention(entries, self.retention);
    }

    pub fn increment(&mut self, stat: Stat) {
        *self.state.stats.slot(stat) += 1;
    }

    /// Name-based variant; unknown names are ignored and return `false`.
    pub fn increment_named(&mut self, name: &str) -> bool {
        match Stat::from_name(name) {
            Some(stat) => {
                self.increment(stat);
                true
            }
            None => false,
        }
    }

    /// Stamps `last_run` and writes the whole record back atomically.
    pub fn save(&mut self) -> Result<(), StateError> {
        self.state.last_run = Some(now_rfc3339());
        let encoded =
            serde_json::to_vec_pretty(&self.state).map_err(|source| StateError::Encode {
                path: self.path.display().to_string(),
                source,
            })?;
        atomic_write_file(&self.path, &encoded).map_err(|source| StateError::Write {
            path: self.path.display().to_string(),
            source,
        })
    }
}

fn enforce_retention(entries: &mut Vec<String>, retention: usize) {
    if entries.len() > retention {
        let excess = entries.len() - retention;
        entries.drain(..excess);
    }
}
