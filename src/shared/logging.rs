use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Sends each event to the console subscriber and appends it to the
/// JSON-lines audit file.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self, event: &str, message: &str) {
        self.record(LogLevel::Info, event, message);
    }

    pub fn warn(&self, event: &str, message: &str) {
        self.record(LogLevel::Warn, event, message);
    }

    pub fn error(&self, event: &str, message: &str) {
        self.record(LogLevel::Error, event, message);
    }

    pub fn record(&self, level: LogLevel, event: &str, message: &str) {
        match level {
            LogLevel::Info => tracing::info!(event, "{message}"),
            LogLevel::Warn => tracing::warn!(event, "{message}"),
            LogLevel::Error => tracing::error!(event, "{message}"),
        }
        append_json_log(&self.path, level.as_str(), event, message);
    }
}

/// Appends one JSON object per line to `path`. Failures are dropped on the
/// floor: the audit log must never stop the pipeline.
pub fn append_json_log(path: &Path, level: &str, event: &str, message: &str) {
    let payload = serde_json::json!({
        "timestamp": super::now_rfc3339(),
        "level": level,
        "event": event,
        "message": message,
    });

    let Ok(line) = serde_json::to_string(&payload) else {
        return;
    };

    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = writeln!(file, "{line}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn appends_parseable_lines() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("logs/orchestrator.log");

        append_json_log(&path, "info", "sweep.completed", "first");
        append_json_log(&path, "error", "dispatch.failed", "second");

        let raw = fs::read_to_string(&path).expect("read log");
        let lines: Vec<serde_json::Value> = raw
            .lines()
            .map(|l| serde_json::from_str(l).expect("json line"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "sweep.completed");
        assert_eq!(lines[1]["level"], "error");
        assert_eq!(lines[1]["message"], "second");
    }

    #[test]
    fn event_log_records_level_names() {
        let dir = tempdir().expect("tempdir");
        let log = EventLog::new(dir.path().join("events.log"));

        log.warn("state.load_recovered", "malformed");

        let raw = fs::read_to_string(log.path()).expect("read log");
        let line: serde_json::Value = serde_json::from_str(raw.trim()).expect("json");
        assert_eq!(line["level"], "warn");
        assert_eq!(line["event"], "state.load_recovered");
    }
}
