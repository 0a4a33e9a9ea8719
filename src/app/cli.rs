//! Command-line surface.
//!
//! - `vaultflow` polls `Needs_Action` and `Approved` and dispatches new
//!   documents to the agent.
//! - `vaultflow watch` turns files dropped into a folder into work documents.
//! - `vaultflow stop` asks a running orchestrator (or watcher) to exit.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Folder-based work queue: drop files in, let the agent handle them.
#[derive(Debug, Parser)]
#[command(name = "vaultflow", version)]
pub struct Cli {
    /// Vault directory. Defaults to the directory holding this executable.
    #[arg(long, global = true)]
    pub vault_path: Option<PathBuf>,

    /// Classify and build prompts but never run the agent or write documents.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Seconds between sweeps (default 30, or `poll_interval_secs` in vaultflow.yaml).
    #[arg(long)]
    pub interval: Option<u64>,

    /// Sweep both folders once and exit.
    #[arg(long)]
    pub once: bool,

    /// Agent executable to invoke (default `claude`).
    #[arg(long)]
    pub agent_bin: Option<String>,

    /// Seconds before a running agent is killed (default 300).
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Watch a drop folder and write a Needs_Action document per new file.
    Watch {
        /// Folder to watch (default `~/AI_Drop`, or `watcher.drop_path`).
        #[arg(long)]
        drop_path: Option<PathBuf>,
    },

    /// Ask the orchestrator running against this vault to stop.
    Stop {
        /// Stop the drop-folder watcher instead.
        #[arg(long)]
        watcher: bool,
    },
}
