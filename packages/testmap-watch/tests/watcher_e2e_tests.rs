//! End-to-end watcher tests against a real directory
//!
//! File system notifications are asynchronous, so every assertion polls for
//! a bounded time instead of expecting an immediate result.

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use testmap_core::RuleStore;
use testmap_watch::{
    ResourceChangeProcessor, ResourceWatcher, SuffixFilter, WatchConfig, WatchError,
};

const TIMEOUT: Duration = Duration::from_secs(5);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(25));
    }
    condition()
}

fn counting_processor() -> (
    Arc<AtomicUsize>,
    Arc<ResourceChangeProcessor<impl Fn() + Send + Sync + 'static>>,
) {
    let count = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&count);
    let processor = ResourceChangeProcessor::new(SuffixFilter::default(), move || {
        hits.fetch_add(1, Ordering::SeqCst);
    });
    (count, Arc::new(processor))
}

#[test]
fn test_feature_file_creation_signals_refresh() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let (count, processor) = counting_processor();

    let mut watcher = ResourceWatcher::new(WatchConfig::new(dir.path()), processor).unwrap();
    watcher.start().unwrap();
    thread::sleep(Duration::from_millis(100));

    fs::write(dir.path().join("login.feature"), "Feature: Login\n").unwrap();

    assert!(wait_until(|| count.load(Ordering::SeqCst) >= 1));
    watcher.stop().unwrap();
    assert!(!watcher.is_running());
}

#[test]
fn test_non_resource_files_do_not_signal() {
    let dir = TempDir::new().unwrap();
    let (count, processor) = counting_processor();

    let mut watcher = ResourceWatcher::new(WatchConfig::new(dir.path()), processor).unwrap();
    watcher.start().unwrap();
    thread::sleep(Duration::from_millis(100));

    fs::write(dir.path().join("Login.java"), "class Login {}\n").unwrap();
    thread::sleep(Duration::from_millis(500));

    watcher.stop().unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn test_rule_file_edit_reloads_bound_store() {
    let dir = TempDir::new().unwrap();
    let rule_file = dir.path().join("tests.mapping");
    fs::write(&rule_file, "a\\.feature=com\\.A\n").unwrap();

    let store = Arc::new(RuleStore::open(&rule_file).unwrap());
    let processor = Arc::new(
        ResourceChangeProcessor::new(SuffixFilter::default(), || {})
            .with_rule_store(Arc::clone(&store)),
    );

    let mut watcher = ResourceWatcher::new(WatchConfig::new(dir.path()), processor).unwrap();
    watcher.start().unwrap();
    thread::sleep(Duration::from_millis(100));

    fs::write(&rule_file, "a\\.feature=com\\.A\nb\\.feature=com\\.B\n").unwrap();

    assert!(wait_until(|| store.snapshot().len() == 2));
    watcher.stop().unwrap();
}

#[test]
fn test_start_twice_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (_, processor) = counting_processor();

    let mut watcher = ResourceWatcher::new(WatchConfig::new(dir.path()), processor).unwrap();
    watcher.start().unwrap();
    assert!(matches!(watcher.start(), Err(WatchError::AlreadyRunning)));
    watcher.stop().unwrap();
}

#[test]
fn test_root_must_be_directory() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, "x").unwrap();
    let (_, processor) = counting_processor();

    let result = ResourceWatcher::new(WatchConfig::new(&file), processor);
    assert!(matches!(result, Err(WatchError::NotADirectory(_))));
}
