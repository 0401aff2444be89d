//! ResourceWatcher - file system events to change batches
//!
//! Raw `notify` events are collected on a background thread. Once no event
//! has arrived for [`WatchConfig::batch_window`], or the batch has been open
//! for [`WatchConfig::max_batch_age`], the collected paths are emitted as one
//! `PostChange` batch rooted at the watched directory and handed to the
//! [`ResourceChangeProcessor`].

use crate::config::WatchConfig;
use crate::delta::{DeltaKind, ResourceDelta};
use crate::error::{Result, WatchError};
use crate::event::ChangeEvent;
use crate::processor::ResourceChangeProcessor;
use notify::event::ModifyKind;
use notify::{
    Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use testmap_core::RefreshTrigger;
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Watches a directory tree and feeds change batches to a processor
pub struct ResourceWatcher<T: RefreshTrigger + 'static> {
    config: WatchConfig,
    processor: Arc<ResourceChangeProcessor<T>>,
    watcher: Option<RecommendedWatcher>,
    processor_thread: Option<thread::JoinHandle<()>>,
    running: Arc<Mutex<bool>>,
}

impl<T: RefreshTrigger + 'static> ResourceWatcher<T> {
    /// # Errors
    /// Returns error if the root path does not exist or is not a directory.
    pub fn new(config: WatchConfig, processor: Arc<ResourceChangeProcessor<T>>) -> Result<Self> {
        if !config.root_path.exists() {
            return Err(WatchError::MissingRoot(config.root_path));
        }
        if !config.root_path.is_dir() {
            return Err(WatchError::NotADirectory(config.root_path));
        }

        Ok(Self {
            config,
            processor,
            watcher: None,
            processor_thread: None,
            running: Arc::new(Mutex::new(false)),
        })
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn processor(&self) -> &Arc<ResourceChangeProcessor<T>> {
        &self.processor
    }

    pub fn is_running(&self) -> bool {
        *self.running.lock()
    }

    /// Start watching; events are batched on a background thread
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Err(WatchError::AlreadyRunning);
        }

        let (event_tx, event_rx) = channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let _ = event_tx.send(event);
                }
                Err(e) => {
                    warn!("File watcher error: {}", e);
                }
            },
            NotifyConfig::default(),
        )?;

        let mode = if self.config.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(&self.config.root_path, mode)?;
        self.watcher = Some(watcher);

        let processor = Arc::clone(&self.processor);
        let config = self.config.clone();
        let running = Arc::clone(&self.running);
        *running.lock() = true;

        self.processor_thread = Some(thread::spawn(move || {
            process_events(event_rx, processor.as_ref(), &config, &running);
        }));

        debug!("Watching {}", self.config.root_path.display());
        Ok(())
    }

    /// Stop watching and join the background thread
    pub fn stop(&mut self) -> Result<()> {
        if !self.is_running() {
            return Ok(());
        }

        *self.running.lock() = false;
        self.watcher = None;

        if let Some(thread) = self.processor_thread.take() {
            thread.join().map_err(|_| WatchError::ThreadJoin)?;
        }
        Ok(())
    }
}

impl<T: RefreshTrigger + 'static> Drop for ResourceWatcher<T> {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Collected deltas of the batch being built, one per path
#[derive(Default)]
struct PendingBatch {
    order: Vec<PathBuf>,
    kinds: HashMap<PathBuf, DeltaKind>,
    first_event: Option<Instant>,
    last_event: Option<Instant>,
}

impl PendingBatch {
    fn push(&mut self, delta: ResourceDelta, now: Instant) {
        let path = delta.path().to_path_buf();
        match self.kinds.get(&path).copied() {
            None => {
                self.kinds.insert(path.clone(), delta.kind());
                self.order.push(path);
            }
            Some(earlier) => match earlier.then(delta.kind()) {
                Some(kind) => {
                    self.kinds.insert(path, kind);
                }
                None => {
                    self.kinds.remove(&path);
                    self.order.retain(|p| *p != path);
                }
            },
        }
        self.first_event.get_or_insert(now);
        self.last_event = Some(now);
    }

    /// Quiet for a full window, or open for longer than the maximum age
    fn is_due(&self, now: Instant, config: &WatchConfig) -> bool {
        match (self.first_event, self.last_event) {
            (Some(first), Some(last)) => {
                now.duration_since(last) >= config.batch_window
                    || now.duration_since(first) >= config.max_batch_age
            }
            _ => false,
        }
    }

    fn take(&mut self, root: &Path) -> Option<ChangeEvent> {
        self.first_event = None;
        self.last_event = None;
        let mut kinds = std::mem::take(&mut self.kinds);
        let children: Vec<ResourceDelta> = std::mem::take(&mut self.order)
            .into_iter()
            .filter_map(|path| {
                let kind = kinds.remove(&path)?;
                Some(ResourceDelta::new(path, kind))
            })
            .collect();
        if children.is_empty() {
            return None;
        }

        Some(ChangeEvent::post_change(vec![
            ResourceDelta::changed(root).with_children(children)
        ]))
    }
}

fn process_events<T: RefreshTrigger>(
    event_rx: Receiver<Event>,
    processor: &ResourceChangeProcessor<T>,
    config: &WatchConfig,
    running: &Mutex<bool>,
) {
    let mut pending = PendingBatch::default();

    while *running.lock() {
        match event_rx.recv_timeout(POLL_INTERVAL) {
            Ok(event) => {
                let now = Instant::now();
                for delta in convert_event(&event, config) {
                    pending.push(delta, now);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if pending.is_due(Instant::now(), config) {
            flush(&mut pending, processor, config);
        }
    }

    flush(&mut pending, processor, config);
}

fn flush<T: RefreshTrigger>(
    pending: &mut PendingBatch,
    processor: &ResourceChangeProcessor<T>,
    config: &WatchConfig,
) {
    if let Some(event) = pending.take(&config.root_path) {
        debug!(
            "Flushing batch of {} paths",
            event.deltas.iter().map(|d| d.children().len()).sum::<usize>()
        );
        processor.process(&event);
    }
}

/// Map one `notify` event to deltas, one per affected path
fn convert_event(event: &Event, config: &WatchConfig) -> Vec<ResourceDelta> {
    event
        .paths
        .iter()
        .filter(|path| !is_ignored(path, config))
        .filter_map(|path| {
            let kind = match event.kind {
                EventKind::Create(_) => DeltaKind::Added,
                EventKind::Remove(_) => DeltaKind::Removed,
                EventKind::Modify(ModifyKind::Metadata(_)) => return None,
                EventKind::Modify(ModifyKind::Name(_)) => {
                    if path.exists() {
                        DeltaKind::Added
                    } else {
                        DeltaKind::Removed
                    }
                }
                EventKind::Modify(_) => DeltaKind::Changed,
                EventKind::Any => {
                    if path.exists() {
                        DeltaKind::Changed
                    } else {
                        DeltaKind::Removed
                    }
                }
                EventKind::Access(_) | EventKind::Other => return None,
            };
            Some(ResourceDelta::new(path.clone(), kind))
        })
        .collect()
}

/// Whether `path` lies inside one of the ignored directories
fn is_ignored(path: &Path, config: &WatchConfig) -> bool {
    let relative = path.strip_prefix(&config.root_path).unwrap_or(path);
    relative.components().any(|component| match component {
        Component::Normal(name) => config
            .ignored_dirs
            .iter()
            .any(|dir| name == std::ffi::OsStr::new(dir.as_str())),
        _ => false,
    })
}
