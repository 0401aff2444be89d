use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WatchError>;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Root path does not exist: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("Root path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Watcher already running")]
    AlreadyRunning,

    #[error("File watcher error: {0}")]
    Notify(#[from] notify::Error),

    #[error("Failed to join event processor thread")]
    ThreadJoin,
}
