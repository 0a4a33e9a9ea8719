use crate::runtime::{sleep_with_stop, StopSignal};
use crate::shared::EventLog;
use std::path::PathBuf;
use std::time::Duration;

pub mod drop_folder;

pub use drop_folder::DropFolderWatcher;

#[derive(Debug, thiserror::Error)]
pub enum WatcherError {
    #[error("watcher io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode watcher record {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A long-running producer of work documents. Implementors only say how to
/// find new items and how to write one into `Needs_Action`; the loop lives in
/// [`run_watcher`].
pub trait Watcher {
    type Item;

    fn name(&self) -> &str;

    /// New items since the last call. "Nothing new" is `Ok(vec![])`.
    fn check(&mut self) -> Result<Vec<Self::Item>, WatcherError>;

    /// Writes the document for `item` and returns its path.
    fn materialize(&mut self, item: Self::Item) -> Result<PathBuf, WatcherError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherTiming {
    pub poll_interval: Duration,
    pub error_backoff: Duration,
}

impl Default for WatcherTiming {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            error_backoff: Duration::from_secs(5),
        }
    }
}

/// One `check`, then `materialize` for each item in order. Stops at the
/// first error; items after it are picked up again by a later `check`.
pub fn watch_once<W: Watcher>(watcher: &mut W) -> Result<Vec<PathBuf>, WatcherError> {
    let mut written = Vec::new();
    for item in watcher.check()? {
        written.push(watcher.materialize(item)?);
    }
    Ok(written)
}

/// Drives `watcher` until `stop` is requested. Errors are logged and followed
/// by the longer backoff pause; they never end the loop.
pub fn run_watcher<W: Watcher>(
    watcher: &mut W,
    timing: WatcherTiming,
    stop: &StopSignal,
    log: &EventLog,
) {
    log.info("watcher.started", &format!("[{}] starting", watcher.name()));
    while !stop.is_requested() {
        let pause = match watch_once(watcher) {
            Ok(written) => {
                for path in written {
                    log.info(
                        "watcher.materialized",
                        &format!("[{}] created {}", watcher.name(), path.display()),
                    );
                }
                timing.poll_interval
            }
            Err(err) => {
                log.error("watcher.error", &format!("[{}] {err}", watcher.name()));
                timing.error_backoff
            }
        };
        if !sleep_with_stop(stop, pause) {
            break;
        }
    }
    stop.clear_file();
    log.info("watcher.stopped", &format!("[{}] stopped", watcher.name()));
}
