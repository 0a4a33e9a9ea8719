pub mod error;
pub mod paths;
pub mod settings;

pub use error::ConfigError;
pub use paths::{
    bootstrap_vault, default_drop_path, default_vault_path, ensure_vault_exists, VaultPaths,
    APPROVED_DIR, DONE_DIR, MEMORY_DIR, NEEDS_ACTION_DIR, SETTINGS_FILE_NAME,
};
pub use settings::{
    AgentSettings, ConfigOverrides, OrchestratorConfig, Settings, WatcherSettings,
    DEFAULT_AGENT_TIMEOUT_SECS, DEFAULT_DEDUP_RETENTION, DEFAULT_POLL_INTERVAL_SECS,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn missing_settings_file_yields_defaults() {
        let dir = tempdir().expect("tempdir");
        let config = OrchestratorConfig::load(dir.path(), ConfigOverrides::default())
            .expect("load config");

        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.agent.binary, "claude");
        assert_eq!(config.agent.args, vec!["--print".to_string()]);
        assert_eq!(config.agent.timeout_secs, 300);
        assert_eq!(config.dedup_retention, 500);
        assert!(!config.dry_run);
        assert!(!config.once);
    }

    #[test]
    fn cli_overrides_win_over_file_values() {
        let dir = tempdir().expect("tempdir");
        fs::write(
            dir.path().join(SETTINGS_FILE_NAME),
            r#"
poll_interval_secs: 60
dedup_retention: 42
agent:
  binary: my-agent
  timeout_secs: 10
"#,
        )
        .expect("write settings");

        let from_file = OrchestratorConfig::load(dir.path(), ConfigOverrides::default())
            .expect("load config");
        assert_eq!(from_file.poll_interval, Duration::from_secs(60));
        assert_eq!(from_file.dedup_retention, 42);
        assert_eq!(from_file.agent.binary, "my-agent");
        assert_eq!(from_file.agent.args, vec!["--print".to_string()]);

        let overridden = OrchestratorConfig::load(
            dir.path(),
            ConfigOverrides {
                poll_interval_secs: Some(5),
                agent_binary: Some("other".to_string()),
                agent_timeout_secs: Some(7),
                dry_run: true,
                once: true,
            },
        )
        .expect("load config");
        assert_eq!(overridden.poll_interval, Duration::from_secs(5));
        assert_eq!(overridden.agent.binary, "other");
        assert_eq!(overridden.agent.timeout_secs, 7);
        assert!(overridden.dry_run);
        assert!(overridden.once);
    }

    #[test]
    fn malformed_settings_file_is_an_error() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join(SETTINGS_FILE_NAME), "agent: [unterminated").expect("write");

        let err = OrchestratorConfig::load(dir.path(), ConfigOverrides::default())
            .expect_err("parse failure");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let dir = tempdir().expect("tempdir");
        let err = OrchestratorConfig::load(
            dir.path(),
            ConfigOverrides {
                poll_interval_secs: Some(0),
                ..ConfigOverrides::default()
            },
        )
        .expect_err("validation failure");
        assert!(matches!(err, ConfigError::Settings(_)));
    }

    #[test]
    fn bootstrap_creates_required_directories() {
        let dir = tempdir().expect("tempdir");
        let paths = VaultPaths::new(dir.path());
        bootstrap_vault(&paths).expect("bootstrap");

        for required in paths.required_directories() {
            assert!(required.is_dir(), "missing {}", required.display());
        }
        assert!(paths.needs_action_dir().ends_with("Needs_Action"));
        assert!(paths.state_file().ends_with("memory/orchestrator_state.json"));
    }

    #[test]
    fn missing_vault_is_reported() {
        let dir = tempdir().expect("tempdir");
        let err = ensure_vault_exists(&dir.path().join("nope")).expect_err("missing");
        assert!(matches!(err, ConfigError::VaultMissing { .. }));
    }
}
