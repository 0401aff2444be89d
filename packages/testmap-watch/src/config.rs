//! Watcher configuration

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for [`crate::ResourceWatcher`]
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Root directory to watch
    pub root_path: PathBuf,

    /// Enable recursive watching of subdirectories
    pub recursive: bool,

    /// Quiet period that closes a batch of raw events
    pub batch_window: Duration,

    /// Upper bound on how long a batch stays open under steady changes
    pub max_batch_age: Duration,

    /// Directory names whose contents never produce changes
    pub ignored_dirs: Vec<String>,
}

impl WatchConfig {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            ..Self::default()
        }
    }

    pub fn with_batch_window(mut self, batch_window: Duration) -> Self {
        self.batch_window = batch_window;
        self
    }

    pub fn with_max_batch_age(mut self, max_batch_age: Duration) -> Self {
        self.max_batch_age = max_batch_age;
        self
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from("."),
            recursive: true,
            batch_window: Duration::from_millis(100),
            max_batch_age: Duration::from_millis(500),
            ignored_dirs: vec![
                ".git".to_string(),
                "target".to_string(),
                "node_modules".to_string(),
            ],
        }
    }
}
