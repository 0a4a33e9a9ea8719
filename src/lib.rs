pub mod agent;
pub mod app;
pub mod config;
pub mod document;
pub mod prompts;
pub mod runtime;
pub mod shared;
pub mod state;
pub mod watcher;
