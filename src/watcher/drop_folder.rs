use super::{Watcher, WatcherError};
use crate::config::VaultPaths;
use crate::shared::{atomic_write_file, file_stamp, readable_stamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Source paths this watcher has already announced. Kept apart from the
/// orchestrator's processing state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct SeenRecord {
    seen: BTreeSet<String>,
}

/// Turns files dropped into a plain directory into `Needs_Action` documents.
#[derive(Debug)]
pub struct DropFolderWatcher {
    drop_dir: PathBuf,
    needs_action_dir: PathBuf,
    seen_file: PathBuf,
    seen: SeenRecord,
    dry_run: bool,
}

impl DropFolderWatcher {
    pub fn new(drop_dir: &Path, paths: &VaultPaths, dry_run: bool) -> Result<Self, WatcherError> {
        for dir in [drop_dir.to_path_buf(), paths.needs_action_dir()] {
            fs::create_dir_all(&dir).map_err(|source| io_err(&dir, source))?;
        }
        let seen_file = paths.drop_watcher_seen_file();
        let mut seen: SeenRecord = fs::read_to_string(&seen_file)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        // Sources removed from the drop folder no longer need remembering.
        seen.seen.retain(|source| Path::new(source).exists());
        Ok(Self {
            drop_dir: drop_dir.to_path_buf(),
            needs_action_dir: paths.needs_action_dir(),
            seen_file,
            seen,
            dry_run,
        })
    }

    pub fn drop_dir(&self) -> &Path {
        &self.drop_dir
    }

    pub fn has_seen(&self, path: &Path) -> bool {
        self.seen.seen.contains(&path.display().to_string())
    }

    fn remember(&mut self, path: &Path) -> Result<(), WatcherError> {
        self.seen.seen.insert(path.display().to_string());
        if self.dry_run {
            return Ok(());
        }
        let encoded = serde_json::to_vec_pretty(&self.seen).map_err(|source| {
            WatcherError::Encode {
                path: self.seen_file.display().to_string(),
                source,
            }
        })?;
        atomic_write_file(&self.seen_file, &encoded).map_err(|source| io_err(&self.seen_file, source))
    }

    fn unused_document_path(&self, stem: &str) -> PathBuf {
        let first = self.needs_action_dir.join(format!("{stem}.md"));
        if !first.exists() {
            return first;
        }
        (2..)
            .map(|n| self.needs_action_dir.join(format!("{stem}_{n}.md")))
            .find(|candidate| !candidate.exists())
            .unwrap_or(first)
    }
}

impl Watcher for DropFolderWatcher {
    type Item = PathBuf;

    fn name(&self) -> &str {
        "DropFolderWatcher"
    }

    fn check(&mut self) -> Result<Vec<PathBuf>, WatcherError> {
        fs::create_dir_all(&self.drop_dir).map_err(|source| io_err(&self.drop_dir, source))?;
        let entries = fs::read_dir(&self.drop_dir).map_err(|source| io_err(&self.drop_dir, source))?;

        let mut fresh: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| !name.starts_with('.') && !name.starts_with('~'))
            })
            .filter(|path| !self.has_seen(path))
            .collect();
        fresh.sort();
        Ok(fresh)
    }

    fn materialize(&mut self, item: PathBuf) -> Result<PathBuf, WatcherError> {
        let size = fs::metadata(&item).map(|m| m.len()).unwrap_or(0);
        let stem = item
            .file_stem()
            .and_then(|s| s.to_str())
            .map(safe_name)
            .unwrap_or_else(|| "file".to_string());
        let target = self.unused_document_path(&format!("FILE_{stem}_{}", file_stamp()));
        let content = render_drop_document(&item, size, &readable_stamp());

        if self.dry_run {
            tracing::info!(
                "[DRY RUN] would create {}:\n{}",
                target.display(),
                content.chars().take(500).collect::<String>()
            );
        } else {
            atomic_write_file(&target, content.as_bytes())
                .map_err(|source| io_err(&target, source))?;
        }
        self.remember(&item)?;
        Ok(target)
    }
}

/// Keeps letters, digits, `-` and `_`; everything else becomes `_`.
pub fn safe_name(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn file_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "PDF Document",
        "doc" | "docx" => "Word Document",
        "xls" | "xlsx" => "Excel Spreadsheet",
        "txt" => "Text File",
        "md" => "Markdown File",
        "jpg" | "jpeg" | "png" | "gif" => "Image",
        "eml" | "msg" => "Email",
        "csv" => "CSV Data",
        "json" => "JSON Data",
        "zip" => "Archive",
        _ => "Unknown File",
    }
}

fn suggested_actions(file_type: &str) -> [&'static str; 3] {
    match file_type {
        "PDF Document" => [
            "Review document contents",
            "Extract key information",
            "File appropriately",
        ],
        "Word Document" => [
            "Review document contents",
            "Check for required actions",
            "File appropriately",
        ],
        "Excel Spreadsheet" => [
            "Review data",
            "Check for calculations needed",
            "File appropriately",
        ],
        "Email" => [
            "Read email contents",
            "Determine if response needed",
            "Extract action items",
        ],
        "Image" => ["Review image", "Determine context", "File appropriately"],
        "CSV Data" => [
            "Review data structure",
            "Analyze contents",
            "Process as needed",
        ],
        _ => [
            "Review file contents",
            "Determine required action",
            "Process accordingly",
        ],
    }
}

pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} TB")
}

fn render_drop_document(source: &Path, size: u64, detected: &str) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let kind = file_type(source);
    let location = source.display();

    let mut out = format!(
        "---\n\
         type: file_drop\n\
         original_name: {name}\n\
         original_path: {location}\n\
         size: {size}\n\
         detected: {detected}\n\
         status: pending\n\
         ---\n\
         \n\
         # New File: {name}\n\
         \n\
         ## File Information\n\
         \n\
         - **Name:** {name}\n\
         - **Type:** {kind}\n\
         - **Size:** {}\n\
         - **Detected:** {detected}\n\
         - **Location:** {location}\n\
         \n\
         ## Suggested Actions\n\
         \n",
        format_size(size)
    );
    for action in suggested_actions(kind) {
        let _ = writeln!(out, "- [ ] {action}");
    }
    out.push_str("\n## Notes\n\n_Add any notes about this file here._\n");
    out
}

fn io_err(path: &Path, source: std::io::Error) -> WatcherError {
    WatcherError::Io {
        path: path.display().to_string(),
        source,
    }
}
