use crate::agent::{AgentCommand, SubprocessAgent};
use crate::config::{bootstrap_vault, ConfigError, OrchestratorConfig};
use crate::state::StateError;
use std::path::Path;

pub mod scheduler;
pub mod stop;

pub use scheduler::{FolderSweep, Orchestrator, SweepReport};
pub use stop::{signal_stop, sleep_with_stop, StopSignal};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("failed to write stop request {path}: {source}")]
    StopSignal {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to install interrupt handler: {source}")]
    InterruptHandler {
        #[source]
        source: std::io::Error,
    },
}

/// Creates the vault layout and runs the orchestrator with the subprocess
/// agent until stopped (or for one sweep with `once`). Ctrl-C counts as a
/// stop request.
pub fn run_orchestrator(config: OrchestratorConfig) -> Result<(), RuntimeError> {
    bootstrap_vault(&config.paths)?;
    let agent = SubprocessAgent::new(AgentCommand::from(&config.agent));
    let mut orchestrator = Orchestrator::new(config, agent);
    install_interrupt_handler(orchestrator.stop_signal())?;
    orchestrator.run()
}

pub fn install_interrupt_handler(stop: &StopSignal) -> Result<(), RuntimeError> {
    stop.install_interrupt_handler()
        .map_err(|source| RuntimeError::InterruptHandler { source })
}

/// Drops the stop file a running loop polls for.
pub fn request_stop(path: &Path) -> Result<(), RuntimeError> {
    signal_stop(path).map_err(|source| RuntimeError::StopSignal {
        path: path.display().to_string(),
        source,
    })
}
