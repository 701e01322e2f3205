use thiserror::Error;
use crate::core::config::ConfigError;

/// Failures that stop the process.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Error loading configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Error creating storage client: {0}")]
    Storage(#[from] object_store::Error),
    #[error("Error creating new watcher: {0}")]
    Watcher(#[source] notify::Error),
    #[error("Error on initial read: {0}")]
    InitialRead(#[from] std::io::Error),
    #[error("Error adding watcher: {0}")]
    Watch(#[source] notify::Error),
    #[error("Watcher task failed: {0}")]
    WatcherTask(#[from] tokio::task::JoinError),
}
