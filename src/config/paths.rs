use super::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

pub const NEEDS_ACTION_DIR: &str = "Needs_Action";
pub const APPROVED_DIR: &str = "Approved";
pub const DONE_DIR: &str = "Done";
pub const MEMORY_DIR: &str = "memory";
pub const LOGS_DIR: &str = "logs";
pub const SETTINGS_FILE_NAME: &str = "vaultflow.yaml";
pub const DEFAULT_DROP_DIR: &str = "AI_Drop";

/// Every location the orchestrator and the watchers touch, derived from the
/// vault root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultPaths {
    pub root: PathBuf,
}

impl VaultPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn needs_action_dir(&self) -> PathBuf {
        self.root.join(NEEDS_ACTION_DIR)
    }

    pub fn approved_dir(&self) -> PathBuf {
        self.root.join(APPROVED_DIR)
    }

    pub fn done_dir(&self) -> PathBuf {
        self.root.join(DONE_DIR)
    }

    pub fn memory_dir(&self) -> PathBuf {
        self.root.join(MEMORY_DIR)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }

    pub fn state_file(&self) -> PathBuf {
        self.memory_dir().join("orchestrator_state.json")
    }

    pub fn drop_watcher_seen_file(&self) -> PathBuf {
        self.memory_dir().join("drop_watcher_seen.json")
    }

    pub fn stop_signal_path(&self) -> PathBuf {
        self.memory_dir().join("orchestrator.stop")
    }

    pub fn drop_watcher_stop_path(&self) -> PathBuf {
        self.memory_dir().join("drop_watcher.stop")
    }

    pub fn orchestrator_log_path(&self) -> PathBuf {
        self.logs_dir().join("orchestrator.log")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE_NAME)
    }

    pub fn required_directories(&self) -> Vec<PathBuf> {
        vec![
            self.needs_action_dir(),
            self.approved_dir(),
            self.done_dir(),
            self.memory_dir(),
            self.logs_dir(),
        ]
    }
}

pub fn ensure_vault_exists(root: &Path) -> Result<(), ConfigError> {
    if root.is_dir() {
        return Ok(());
    }
    Err(ConfigError::VaultMissing {
        path: root.display().to_string(),
    })
}

pub fn bootstrap_vault(paths: &VaultPaths) -> Result<(), ConfigError> {
    for path in paths.required_directories() {
        fs::create_dir_all(&path).map_err(|source| ConfigError::CreateDir {
            path: path.display().to_string(),
            source,
        })?;
    }
    Ok(())
}

/// The vault defaults to the directory holding the running executable.
pub fn default_vault_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn default_drop_path() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home).join(DEFAULT_DROP_DIR))
}
