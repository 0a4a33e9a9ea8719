use crate::config::AgentSettings;
use std::path::PathBuf;
use std::time::Duration;

pub mod runner;

pub use runner::run_agent;

pub const DRY_RUN_MESSAGE: &str = "Dry run - no action taken";
pub const TIMEOUT_OUTPUT: &str = "timeout";
pub const NOT_INSTALLED_OUTPUT: &str = "agent not installed";
const DRY_RUN_PREVIEW_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("agent binary not installed: {binary}")]
    NotInstalled { binary: String },
    #[error("agent `{binary}` timed out after {timeout_ms}ms")]
    Timeout { binary: String, timeout_ms: u64 },
    #[error("agent `{binary}` exited with code {}: {stderr}", exit_label(.exit_code))]
    NonZeroExit {
        binary: String,
        exit_code: Option<i32>,
        stderr: String,
    },
    #[error("failed to launch agent `{binary}`: {source}")]
    Launch {
        binary: String,
        #[source]
        source: std::io::Error,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

/// Why an invocation failed. Every variant is retried on the next sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentFailure {
    NotInstalled,
    Timeout,
    NonZeroExit { exit_code: Option<i32> },
    Launch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentInvocationResult {
    pub success: bool,
    /// Agent stdout on success; stderr or a failure description otherwise.
    pub output: String,
    pub failure: Option<AgentFailure>,
}

impl AgentInvocationResult {
    pub fn succeeded(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            failure: None,
        }
    }

    pub fn failed(failure: AgentFailure, output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
            failure: Some(failure),
        }
    }

    pub fn dry_run() -> Self {
        Self::succeeded(DRY_RUN_MESSAGE)
    }
}

impl From<AgentError> for AgentInvocationResult {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::NotInstalled { .. } => {
                Self::failed(AgentFailure::NotInstalled, NOT_INSTALLED_OUTPUT)
            }
            AgentError::Timeout { .. } => Self::failed(AgentFailure::Timeout, TIMEOUT_OUTPUT),
            AgentError::NonZeroExit {
                exit_code, stderr, ..
            } => Self::failed(AgentFailure::NonZeroExit { exit_code }, stderr),
            AgentError::Launch { source, .. } => {
                Self::failed(AgentFailure::Launch, source.to_string())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgentRequest {
    pub prompt: String,
    pub working_dir: PathBuf,
    pub dry_run: bool,
    pub timeout: Duration,
}

/// The seam between the scheduler and whatever executes a prompt.
pub trait AgentRunner {
    fn invoke(&self, request: &AgentRequest) -> AgentInvocationResult;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCommand {
    pub binary: String,
    pub args: Vec<String>,
}

impl Default for AgentCommand {
    fn default() -> Self {
        Self::from(&AgentSettings::default())
    }
}

impl From<&AgentSettings> for AgentCommand {
    fn from(settings: &AgentSettings) -> Self {
        Self {
            binary: settings.binary.clone(),
            args: settings.args.clone(),
        }
    }
}

impl AgentCommand {
    pub fn command_form(&self) -> String {
        if self.args.is_empty() {
            return self.binary.clone();
        }
        format!("{} {}", self.binary, self.args.join(" "))
    }
}

/// Runs the reasoning agent as a child process, one prompt per process.
#[derive(Debug, Clone, Default)]
pub struct SubprocessAgent {
    command: AgentCommand,
}

impl SubprocessAgent {
    pub fn new(command: AgentCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &AgentCommand {
        &self.command
    }
}

impl AgentRunner for SubprocessAgent {
    fn invoke(&self, request: &AgentRequest) -> AgentInvocationResult {
        if request.dry_run {
            let preview: String = request.prompt.chars().take(DRY_RUN_PREVIEW_CHARS).collect();
            tracing::info!(
                command = %self.command.command_form(),
                "[DRY RUN] would call agent with prompt:\n{preview}..."
            );
            return AgentInvocationResult::dry_run();
        }

        match run_agent(&self.command, request) {
            Ok(stdout) => AgentInvocationResult::succeeded(stdout),
            Err(err) => {
                tracing::error!("{err}");
                err.into()
            }
        }
    }
}
