//! Integration Tests for History Persistence

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::fs;

use kubequiz::HistoryManager;
use tempfile::TempDir;
use test_utils::{builtin_session, config_with_history, FakeTools};

#[test]
fn test_history_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history");

    {
        let mut history = HistoryManager::open(path.clone(), 100).unwrap();
        history.add("kubectl get nodes").unwrap();
        history.add("kubectl drain node-1 --ignore-daemonsets").unwrap();
        history.add("kubectl get nodes").unwrap();
    }

    let history = HistoryManager::open(path, 100).unwrap();
    assert_eq!(history.file_rows(), 3);
    assert_eq!(
        history.entries().iter().cloned().collect::<Vec<_>>(),
        vec!["kubectl drain node-1 --ignore-daemonsets", "kubectl get nodes"]
    );
}

#[test]
fn test_one_row_per_submitted_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history");
    let mut history = HistoryManager::open(path.clone(), 100).unwrap();

    let submitted = ["kubectl get pods", "", "   ", "kubectl get pods", "systemctl restart kubelet"];
    let mut expected = 0;
    for line in submitted {
        if history.add(line).unwrap() {
            expected += 1;
        }
        let rows = fs::read_to_string(&path).unwrap().lines().count();
        assert_eq!(rows, expected);
    }
    assert_eq!(expected, 3);
}

#[test]
fn test_missing_parent_directory_is_created() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("dir").join("history");
    let history = HistoryManager::open(path.clone(), 10).unwrap();
    assert!(path.exists());
    assert!(history.entries().is_empty());
}

#[test]
fn test_session_close_compacts_oversized_file() {
    let tools = FakeTools::new();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history");

    let mut config = config_with_history(&tools, path.clone());
    config.history.max_entries = 2;
    let mut session = builtin_session(config.clone());
    for line in ["kubectl get pods", "kubectl get svc", "kubectl get nodes"] {
        session.record_line(line).unwrap();
    }
    assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 3);
    session.close().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().collect::<Vec<_>>(), vec!["kubectl get svc", "kubectl get nodes"]);

    // The next session recalls what the last one kept
    let session = builtin_session(config);
    assert_eq!(session.recall_entries(), vec!["kubectl get svc", "kubectl get nodes"]);
}

#[test]
fn test_unwritable_history_disables_it() {
    let tools = FakeTools::new();
    let dir = TempDir::new().unwrap();
    // A directory where the file should be
    let path = dir.path().to_path_buf();

    let mut session = builtin_session(config_with_history(&tools, path));
    assert!(session.history().is_none());
    assert!(!session.record_line("kubectl get pods").unwrap());
}
