use std::fs;
use std::time::Duration;
use tempfile::tempdir;
use vaultflow::config::VaultPaths;
use vaultflow::document::parse_frontmatter;
use vaultflow::runtime::StopSignal;
use vaultflow::shared::EventLog;
use vaultflow::watcher::{run_watcher, watch_once, DropFolderWatcher, Watcher, WatcherTiming};

#[test]
fn dropped_file_becomes_a_needs_action_document() {
    let dir = tempdir().expect("tempdir");
    let paths = VaultPaths::new(dir.path().join("vault"));
    let drop = dir.path().join("drop");
    let mut watcher = DropFolderWatcher::new(&drop, &paths, false).expect("watcher");
    fs::write(drop.join("Q3 report.pdf"), vec![0u8; 2048]).expect("write");

    let written = watch_once(&mut watcher).expect("watch");
    assert_eq!(written.len(), 1);
    let name = written[0]
        .file_name()
        .and_then(|n| n.to_str())
        .expect("file name")
        .to_string();
    assert!(name.starts_with("FILE_Q3_report_"), "{name}");
    assert!(name.ends_with(".md"));
    assert_eq!(written[0].parent(), Some(paths.needs_action_dir().as_path()));

    let content = fs::read_to_string(&written[0]).expect("read");
    let header = parse_frontmatter(&content);
    assert_eq!(header.get("type"), Some("file_drop"));
    assert_eq!(header.get("original_name"), Some("Q3 report.pdf"));
    assert_eq!(header.get("size"), Some("2048"));
    assert!(content.contains("- **Size:** 2.0 KB"));
}

#[test]
fn each_source_is_announced_once_across_restarts() {
    let dir = tempdir().expect("tempdir");
    let paths = VaultPaths::new(dir.path().join("vault"));
    let drop = dir.path().join("drop");
    fs::create_dir_all(&drop).expect("drop dir");
    fs::write(drop.join("a.txt"), "a").expect("write");

    let mut watcher = DropFolderWatcher::new(&drop, &paths, false).expect("watcher");
    assert_eq!(watch_once(&mut watcher).expect("watch").len(), 1);
    assert!(watch_once(&mut watcher).expect("watch").is_empty());
    assert!(paths.drop_watcher_seen_file().exists());

    let mut restarted = DropFolderWatcher::new(&drop, &paths, false).expect("watcher");
    assert!(restarted.check().expect("check").is_empty());

    fs::write(drop.join("b.txt"), "b").expect("write");
    assert_eq!(restarted.check().expect("check"), vec![drop.join("b.txt")]);
}

#[test]
fn hidden_and_lock_files_are_ignored() {
    let dir = tempdir().expect("tempdir");
    let paths = VaultPaths::new(dir.path().join("vault"));
    let drop = dir.path().join("drop");
    fs::create_dir_all(drop.join("subdir")).expect("drop dir");
    fs::write(drop.join(".DS_Store"), "x").expect("write");
    fs::write(drop.join("~$budget.xlsx"), "x").expect("write");
    fs::write(drop.join("budget.xlsx"), "x").expect("write");

    let mut watcher = DropFolderWatcher::new(&drop, &paths, false).expect("watcher");
    assert_eq!(watcher.check().expect("check"), vec![drop.join("budget.xlsx")]);
}

#[test]
fn dry_run_writes_nothing() {
    let dir = tempdir().expect("tempdir");
    let paths = VaultPaths::new(dir.path().join("vault"));
    let drop = dir.path().join("drop");
    fs::create_dir_all(&drop).expect("drop dir");
    fs::write(drop.join("a.txt"), "a").expect("write");

    let mut watcher = DropFolderWatcher::new(&drop, &paths, true).expect("watcher");
    let written = watch_once(&mut watcher).expect("watch");
    assert_eq!(written.len(), 1);
    assert!(!written[0].exists());
    assert!(!paths.drop_watcher_seen_file().exists());
    assert_eq!(
        fs::read_dir(paths.needs_action_dir()).expect("dir").count(),
        0
    );
}

#[test]
fn loop_exits_once_stop_is_requested() {
    let dir = tempdir().expect("tempdir");
    let paths = VaultPaths::new(dir.path().join("vault"));
    let drop = dir.path().join("drop");
    fs::create_dir_all(&drop).expect("drop dir");
    fs::write(drop.join("a.txt"), "a").expect("write");

    let mut watcher = DropFolderWatcher::new(&drop, &paths, false).expect("watcher");
    let stop = StopSignal::new(paths.drop_watcher_stop_path());
    let log = EventLog::new(paths.logs_dir().join("watcher.log"));
    let timing = WatcherTiming {
        poll_interval: Duration::from_millis(50),
        error_backoff: Duration::from_millis(50),
    };

    let handle = {
        let stop = stop.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(300));
            stop.request();
        })
    };
    run_watcher(&mut watcher, timing, &stop, &log);
    handle.join().expect("join");

    assert_eq!(
        fs::read_dir(paths.needs_action_dir()).expect("dir").count(),
        1
    );
    let log = fs::read_to_string(paths.logs_dir().join("watcher.log")).expect("log");
    assert!(log.contains("watcher.materialized"));
    assert!(log.contains("watcher.stopped"));
}
