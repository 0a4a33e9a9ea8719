use super::{sleep_with_stop, RuntimeError, StopSignal};
use crate::agent::{AgentRequest, AgentRunner};
use crate::config::OrchestratorConfig;
use crate::document::{classify, scan_folder, ScannedDocument};
use crate::prompts::{build_prompt, Stage};
use crate::shared::EventLog;
use crate::state::{LoadOutcome, Stat, StateStore, WatchedFolder};
use std::fs;
use std::path::Path;

/// Counts for one folder in one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSweep {
    pub scanned: usize,
    pub already_processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub vanished: usize,
}

impl FolderSweep {
    pub fn dispatched(&self) -> usize {
        self.succeeded + self.failed
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub needs_action: FolderSweep,
    pub approved: FolderSweep,
    /// A stop request cut the sweep short.
    pub interrupted: bool,
}

impl SweepReport {
    pub fn folder(&self, folder: WatchedFolder) -> &FolderSweep {
        match folder {
            WatchedFolder::NeedsAction => &self.needs_action,
            WatchedFolder::Approved => &self.approved,
        }
    }

    fn folder_mut(&mut self, folder: WatchedFolder) -> &mut FolderSweep {
        match folder {
            WatchedFolder::NeedsAction => &mut self.needs_action,
            WatchedFolder::Approved => &mut self.approved,
        }
    }

    fn summary(&self) -> String {
        let line = |name: &str, f: &FolderSweep| {
            format!(
                "{name}: scanned={} skipped={} ok={} failed={} vanished={}",
                f.scanned, f.already_processed, f.succeeded, f.failed, f.vanished
            )
        };
        format!(
            "{}; {}{}",
            line("needs_action", &self.needs_action),
            line("approved", &self.approved),
            if self.interrupted { " (interrupted)" } else { "" }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dispatch {
    Succeeded,
    Failed,
    Vanished,
}

/// Drains `Needs_Action` and `Approved` one document at a time, persisting
/// the dedup record after every dispatch.
pub struct Orchestrator<A: AgentRunner> {
    config: OrchestratorConfig,
    state: StateStore,
    agent: A,
    log: EventLog,
    stop: StopSignal,
}

impl<A: AgentRunner> Orchestrator<A> {
    pub fn new(config: OrchestratorConfig, agent: A) -> Self {
        let state = StateStore::load(&config.paths.state_file(), config.dedup_retention);
        Self::with_state(config, state, agent)
    }

    pub fn with_state(config: OrchestratorConfig, state: StateStore, agent: A) -> Self {
        let log = EventLog::new(config.paths.orchestrator_log_path());
        let stop = StopSignal::new(config.paths.stop_signal_path());
        if let LoadOutcome::Recovered { reason } = state.load_outcome() {
            log.warn(
                "state.load_recovered",
                &format!("starting from empty state: {reason}"),
            );
        }
        Self {
            config,
            state,
            agent,
            log,
            stop,
        }
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    /// One pass over both folders.
    pub fn sweep(&mut self) -> SweepReport {
        let mut report = SweepReport::default();
        for folder in WatchedFolder::ALL {
            if self.stop.is_requested() {
                report.interrupted = true;
                break;
            }
            let interrupted = self.sweep_folder(folder, report.folder_mut(folder));
            if interrupted {
                report.interrupted = true;
                break;
            }
        }
        self.log.info("sweep.completed", &report.summary());
        report
    }

    /// Returns `true` when a stop request ended the folder early.
    fn sweep_folder(&mut self, folder: WatchedFolder, counts: &mut FolderSweep) -> bool {
        let dir = self.config.paths.root.join(folder.dir_name());
        for document in scan_folder(&dir) {
            counts.scanned += 1;
            if self.state.is_processed(folder, &document.name) {
                counts.already_processed += 1;
                continue;
            }
            if self.stop.is_requested() {
                return true;
            }
            match self.dispatch(folder, &document) {
                Dispatch::Succeeded => counts.succeeded += 1,
                Dispatch::Failed => counts.failed += 1,
                Dispatch::Vanished => counts.vanished += 1,
            }
        }
        false
    }

    fn dispatch(&mut self, folder: WatchedFolder, document: &ScannedDocument) -> Dispatch {
        let name = document.name.as_str();
        self.log.info(
            "dispatch.started",
            &format!("new item in {folder}: {name}"),
        );

        let content = match fs::read_to_string(&document.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                self.log.info(
                    "dispatch.skipped",
                    &format!("{folder}/{name} disappeared before it was read"),
                );
                return Dispatch::Vanished;
            }
            Err(err) => {
                self.log.error(
                    "dispatch.failed",
                    &format!("could not read {folder}/{name}: {err}"),
                );
                self.state.increment(Stat::Errors);
                self.persist();
                return Dispatch::Failed;
            }
        };

        let descriptor = classify(&content);
        let relative = Path::new(folder.dir_name()).join(name);
        let prompt = build_prompt(&descriptor, &relative, Stage::from(folder));
        let request = AgentRequest {
            prompt,
            working_dir: self.config.paths.root.clone(),
            dry_run: self.config.dry_run,
            timeout: self.config.agent.timeout(),
        };
        let result = self.agent.invoke(&request);

        let outcome = if result.success || self.config.dry_run {
            self.state.mark_processed(folder, name);
            self.state.increment(folder.success_stat());
            self.log.info(
                "dispatch.succeeded",
                &format!(
                    "{folder}/{name} ({}, target {})",
                    descriptor.action_label(),
                    descriptor.target()
                ),
            );
            Dispatch::Succeeded
        } else {
            self.state.increment(Stat::Errors);
            self.log.error(
                "dispatch.failed",
                &format!("{folder}/{name}: {}", result.output.trim()),
            );
            Dispatch::Failed
        };
        self.persist();
        outcome
    }

    fn persist(&mut self) {
        if let Err(err) = self.state.save() {
            self.log.error("state.save_failed", &err.to_string());
        }
    }

    /// Sweeps until stopped (or once, in single-pass mode), then saves and
    /// reports the counters.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        self.stop.clear_file();
        self.log.info(
            "orchestrator.started",
            &format!(
                "vault={} interval={}s dry_run={} once={} agent={} state={}",
                self.config.paths.root.display(),
                self.config.poll_interval.as_secs(),
                self.config.dry_run,
                self.config.once,
                self.config.agent.binary,
                self.state.path().display()
            ),
        );

        loop {
            let report = self.sweep();
            if self.config.once || report.interrupted {
                break;
            }
            if !sleep_with_stop(&self.stop, self.config.poll_interval) {
                break;
            }
        }

        self.shutdown()
    }

    pub fn shutdown(&mut self) -> Result<(), RuntimeError> {
        self.stop.clear_file();
        let saved = self.state.save();
        if let Err(err) = &saved {
            self.log.error("state.save_failed", &err.to_string());
        }
        self.log.info(
            "orchestrator.stopped",
            &format!("stats: {}", self.state.stats()),
        );
        saved.map_err(RuntimeError::from)
    }
}
