use signal_hook::consts::{SIGINT, SIGTERM};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const SLEEP_SLICE: Duration = Duration::from_millis(200);

/// Stop request shared between the loop, in-process callers and the
/// `vaultflow stop` command, which drops a file next to the state file.
#[derive(Debug, Clone)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
    file: PathBuf,
}

impl StopSignal {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            file: file.into(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn request(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_requested(&self) -> bool {
        if self.flag.load(Ordering::Relaxed) {
            return true;
        }
        if self.file.exists() {
            self.flag.store(true, Ordering::Relaxed);
            return true;
        }
        false
    }

    /// Routes SIGINT and SIGTERM into this signal, so an interrupt ends the
    /// loop through its normal shutdown. A second interrupt while the first
    /// is still being honoured exits immediately with status 1.
    pub fn install_interrupt_handler(&self) -> std::io::Result<()> {
        for signal in [SIGINT, SIGTERM] {
            signal_hook::flag::register_conditional_shutdown(signal, 1, Arc::clone(&self.flag))?;
            signal_hook::flag::register(signal, Arc::clone(&self.flag))?;
        }
        Ok(())
    }

    pub fn clear_file(&self) {
        let _ = fs::remove_file(&self.file);
    }
}

/// Writes the stop file a running orchestrator polls for.
pub fn signal_stop(file: &Path) -> std::io::Result<()> {
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file, b"stop\n")
}

/// Sleeps `total` in short slices. Returns `false` as soon as a stop is
/// requested, `true` if the full duration elapsed.
pub fn sleep_with_stop(stop: &StopSignal, total: Duration) -> bool {
    let mut remaining = total;
    while !remaining.is_zero() {
        if stop.is_requested() {
            return false;
        }
        let step = remaining.min(SLEEP_SLICE);
        thread::sleep(step);
        remaining = remaining.saturating_sub(step);
    }
    !stop.is_requested()
}
