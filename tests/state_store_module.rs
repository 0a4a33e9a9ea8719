use std::fs;
use tempfile::tempdir;
use vaultflow::config::DEFAULT_DEDUP_RETENTION;
use vaultflow::state::{LoadOutcome, Stat, StateStore, WatchedFolder};

#[test]
fn saved_state_survives_a_restart() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("memory/orchestrator_state.json");

    let mut store = StateStore::load(&path, DEFAULT_DEDUP_RETENTION);
    assert_eq!(store.load_outcome(), &LoadOutcome::Fresh);
    store.mark_processed(WatchedFolder::NeedsAction, "a.md");
    store.mark_processed(WatchedFolder::Approved, "b.md");
    store.increment(Stat::NeedsActionProcessed);
    store.increment(Stat::Errors);
    store.save().expect("save");

    let reloaded = StateStore::load(&path, DEFAULT_DEDUP_RETENTION);
    assert_eq!(reloaded.load_outcome(), &LoadOutcome::Loaded);
    assert!(reloaded.is_processed(WatchedFolder::NeedsAction, "a.md"));
    assert!(reloaded.is_processed(WatchedFolder::Approved, "b.md"));
    assert!(!reloaded.is_processed(WatchedFolder::Approved, "a.md"));
    assert_eq!(reloaded.stats().needs_action_processed, 1);
    assert_eq!(reloaded.stats().approved_executed, 0);
    assert_eq!(reloaded.stats().errors, 1);
    assert!(reloaded.state().last_run.is_some());
}

#[test]
fn persisted_file_uses_the_documented_field_names() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("state.json");
    let mut store = StateStore::load(&path, DEFAULT_DEDUP_RETENTION);
    store.mark_processed(WatchedFolder::NeedsAction, "x.md");
    store.increment(Stat::ApprovedExecuted);
    store.save().expect("save");

    let raw = fs::read_to_string(&path).expect("read");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(json["processed_needs_action"][0], "x.md");
    assert_eq!(json["processed_approved"].as_array().map(Vec::len), Some(0));
    assert_eq!(json["stats"]["approved_executed"], 1);
    assert_eq!(json["stats"]["needs_action_processed"], 0);
    assert!(json["last_run"].is_string());
}

#[test]
fn retention_keeps_the_newest_five_hundred() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("state.json");
    let mut store = StateStore::load(&path, DEFAULT_DEDUP_RETENTION);
    for n in 0..501 {
        store.mark_processed(WatchedFolder::NeedsAction, &format!("doc-{n:03}.md"));
    }
    store.save().expect("save");

    let reloaded = StateStore::load(&path, DEFAULT_DEDUP_RETENTION);
    let kept = reloaded.state().processed(WatchedFolder::NeedsAction);
    assert_eq!(kept.len(), 500);
    assert_eq!(kept.first().map(String::as_str), Some("doc-001.md"));
    assert_eq!(kept.last().map(String::as_str), Some("doc-500.md"));
    assert!(!reloaded.is_processed(WatchedFolder::NeedsAction, "doc-000.md"));
}

#[test]
fn corrupt_state_file_starts_over_and_is_replaced_on_save() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("state.json");
    fs::write(&path, "{ not json").expect("write");

    let mut store = StateStore::load(&path, DEFAULT_DEDUP_RETENTION);
    assert!(matches!(store.load_outcome(), LoadOutcome::Recovered { .. }));
    assert_eq!(store.stats().errors, 0);

    store.mark_processed(WatchedFolder::Approved, "ok.md");
    store.save().expect("save");
    let reloaded = StateStore::load(&path, DEFAULT_DEDUP_RETENTION);
    assert_eq!(reloaded.load_outcome(), &LoadOutcome::Loaded);
    assert!(reloaded.is_processed(WatchedFolder::Approved, "ok.md"));
}

#[test]
fn older_files_missing_fields_still_load() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("state.json");
    fs::write(&path, r#"{"processed_needs_action": ["old.md"]}"#).expect("write");

    let store = StateStore::load(&path, DEFAULT_DEDUP_RETENTION);
    assert_eq!(store.load_outcome(), &LoadOutcome::Loaded);
    assert!(store.is_processed(WatchedFolder::NeedsAction, "old.md"));
    assert_eq!(store.stats().errors, 0);
}
