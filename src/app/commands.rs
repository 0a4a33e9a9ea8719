use super::{Cli, Command};
use crate::config::{
    default_drop_path, default_vault_path, ensure_vault_exists, ConfigError, ConfigOverrides,
    OrchestratorConfig,
};
use crate::runtime::{self, RuntimeError, StopSignal};
use crate::shared::EventLog;
use crate::watcher::{run_watcher, DropFolderWatcher, WatcherError, WatcherTiming};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Watcher(#[from] WatcherError),
}

pub fn run_cli(cli: Cli) -> Result<(), AppError> {
    let vault = resolve_vault(cli.vault_path.clone());
    ensure_vault_exists(&vault)?;

    let overrides = ConfigOverrides {
        poll_interval_secs: cli.interval,
        dry_run: cli.dry_run,
        once: cli.once,
        agent_binary: cli.agent_bin.clone(),
        agent_timeout_secs: cli.timeout_secs,
    };
    let config = OrchestratorConfig::load(&vault, overrides)?;

    match cli.command {
        None => runtime::run_orchestrator(config).map_err(AppError::from),
        Some(Command::Watch { drop_path }) => cmd_watch(&config, drop_path),
        Some(Command::Stop { watcher }) => cmd_stop(&config, watcher),
    }
}

fn resolve_vault(explicit: Option<PathBuf>) -> PathBuf {
    let vault = explicit.unwrap_or_else(default_vault_path);
    std::fs::canonicalize(&vault).unwrap_or(vault)
}

fn cmd_watch(config: &OrchestratorConfig, drop_path: Option<PathBuf>) -> Result<(), AppError> {
    crate::config::bootstrap_vault(&config.paths)?;
    let drop_dir = match drop_path.or_else(|| config.watcher.drop_path.clone()) {
        Some(path) => path,
        None => default_drop_path()?,
    };
    let mut watcher = DropFolderWatcher::new(&drop_dir, &config.paths, config.dry_run)?;
    let timing = WatcherTiming {
        poll_interval: Duration::from_secs(config.watcher.poll_interval_secs),
        error_backoff: Duration::from_secs(config.watcher.error_backoff_secs),
    };

    let stop = StopSignal::new(config.paths.drop_watcher_stop_path());
    stop.clear_file();
    runtime::install_interrupt_handler(&stop)?;
    let log = EventLog::new(config.paths.orchestrator_log_path());
    log.info(
        "watcher.configured",
        &format!(
            "watching {} -> {} (dry_run={})",
            watcher.drop_dir().display(),
            config.paths.needs_action_dir().display(),
            config.dry_run
        ),
    );
    run_watcher(&mut watcher, timing, &stop, &log);
    Ok(())
}

fn cmd_stop(config: &OrchestratorConfig, watcher: bool) -> Result<(), AppError> {
    let path = if watcher {
        config.paths.drop_watcher_stop_path()
    } else {
        config.paths.stop_signal_path()
    };
    runtime::request_stop(&path)?;
    println!("stop requested: {}", path.display());
    Ok(())
}
