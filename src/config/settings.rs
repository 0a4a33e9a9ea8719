use super::{ConfigError, VaultPaths};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_AGENT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_DEDUP_RETENTION: usize = 500;
pub const DEFAULT_WATCHER_POLL_SECS: u64 = 1;
pub const DEFAULT_WATCHER_BACKOFF_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub binary: String,
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            binary: "claude".to_string(),
            args: vec!["--print".to_string()],
            timeout_secs: DEFAULT_AGENT_TIMEOUT_SECS,
        }
    }
}

impl AgentSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherSettings {
    pub drop_path: Option<PathBuf>,
    pub poll_interval_secs: u64,
    pub error_backoff_secs: u64,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            drop_path: None,
            poll_interval_secs: DEFAULT_WATCHER_POLL_SECS,
            error_backoff_secs: DEFAULT_WATCHER_BACKOFF_SECS,
        }
    }
}

/// Contents of `vaultflow.yaml`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub poll_interval_secs: u64,
    pub dedup_retention: usize,
    pub agent: AgentSettings,
    pub watcher: WatcherSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            dedup_retention: DEFAULT_DEDUP_RETENTION,
            agent: AgentSettings::default(),
            watcher: WatcherSettings::default(),
        }
    }
}

impl Settings {
    /// A missing file yields defaults; an unreadable or malformed one is an error.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Values given on the command line; `None` keeps the file/default value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub poll_interval_secs: Option<u64>,
    pub dry_run: bool,
    pub once: bool,
    pub agent_binary: Option<String>,
    pub agent_timeout_secs: Option<u64>,
}

/// Built once at startup and handed to every component by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub paths: VaultPaths,
    pub poll_interval: Duration,
    pub dry_run: bool,
    pub once: bool,
    pub agent: AgentSettings,
    pub dedup_retention: usize,
    pub watcher: WatcherSettings,
}

impl OrchestratorConfig {
    pub fn new(paths: VaultPaths, settings: Settings, overrides: ConfigOverrides) -> Self {
        let mut agent = settings.agent;
        if let Some(binary) = overrides.agent_binary {
            agent.binary = binary;
        }
        if let Some(timeout_secs) = overrides.agent_timeout_secs {
            agent.timeout_secs = timeout_secs;
        }
        let poll_interval_secs = overrides
            .poll_interval_secs
            .unwrap_or(settings.poll_interval_secs);

        Self {
            paths,
            poll_interval: Duration::from_secs(poll_interval_secs),
            dry_run: overrides.dry_run,
            once: overrides.once,
            agent,
            dedup_retention: settings.dedup_retention,
            watcher: settings.watcher,
        }
    }

    /// Reads `vaultflow.yaml` from the vault root, applies overrides, validates.
    pub fn load(root: &Path, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let paths = VaultPaths::new(root);
        let settings = Settings::from_path(&paths.settings_file())?;
        let config = Self::new(paths, settings, overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Settings(
                "poll interval must be at least 1 second".to_string(),
            ));
        }
        if self.agent.binary.trim().is_empty() {
            return Err(ConfigError::Settings(
                "agent.binary must be non-empty".to_string(),
            ));
        }
        if self.agent.timeout_secs == 0 {
            return Err(ConfigError::Settings(
                "agent.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.dedup_retention == 0 {
            return Err(ConfigError::Settings(
                "dedup_retention must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
