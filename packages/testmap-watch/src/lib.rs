/*
 * Testmap Watch - Change Trigger Adapter
 *
 * Gates workspace refreshes on resource changes:
 * - delta     : Nested change notifications + lazy depth-first walk
 * - event     : Change batches and their lifecycle kind
 * - processor : Suffix filter, event-kind gate, refresh signalling
 * - watcher   : `notify`-backed batching of raw file system events
 */

pub mod config;
pub mod delta;
pub mod error;
pub mod event;
pub mod processor;
pub mod watcher;

pub use config::WatchConfig;
pub use delta::{portable_path, walk, DeltaKind, DeltaWalk, ResourceDelta};
pub use error::{Result, WatchError};
pub use event::{ChangeEvent, ChangeEventKind};
pub use processor::{ResourceChangeProcessor, SuffixFilter, PROCESSOR_NAME};
pub use watcher::ResourceWatcher;
