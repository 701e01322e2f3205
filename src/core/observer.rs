use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use futures::StreamExt;
use futures::channel::mpsc::{self, UnboundedReceiver};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio_util::sync::CancellationToken;
use tracing::{info, error};
use crate::core::models::FileEvent;
use crate::core::uploader::Uploader;

/// Run one path through the extension filter and, if it matches, the uploader.
/// Failures are logged here and never reach the caller.
pub async fn handle_path(uploader: &Uploader, path: &Path) {
    match uploader.maybe_upload(path).await {
        Ok(Some(uploaded)) => {
            info!(path = %uploaded.source.display(), url = %uploaded.url, "Uploaded");
        }
        Ok(None) => {}
        Err(e) => {
            error!(path = %path.display(), error = %e, "Error uploading");
        }
    }
}

/// Upload every image already sitting in `dir` (not recursive).
///
/// Only a failure to list the directory is returned; per-file failures are
/// logged and the scan moves on.
pub async fn scan_directory(dir: &Path, uploader: &Uploader) -> io::Result<()> {
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        match entry.file_type().await {
            Ok(file_type) if file_type.is_dir() => continue,
            Ok(_) => handle_path(uploader, &entry.path()).await,
            Err(e) => {
                error!(path = %entry.path().display(), error = %e, "Error reading file type");
            }
        }
    }

    Ok(())
}

/// Filesystem watcher for the single upload directory.
///
/// notify delivers events on its own thread; they are forwarded into two
/// channels, one for events and one for backend errors, consumed by `run`.
pub struct DirectoryWatcher {
    watcher: RecommendedWatcher,
    events: UnboundedReceiver<Event>,
    errors: UnboundedReceiver<notify::Error>,
}

impl DirectoryWatcher {
    pub fn new() -> notify::Result<Self> {
        let (event_tx, events) = mpsc::unbounded();
        let (error_tx, errors) = mpsc::unbounded();

        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            // Send failures only mean the receiving side has shut down
            let _ = match res {
                Ok(event) => event_tx.unbounded_send(event).map_err(|_| ()),
                Err(e) => error_tx.unbounded_send(e).map_err(|_| ()),
            };
        })?;

        Ok(Self { watcher, events, errors })
    }

    /// Register the directory to watch. Subdirectories are not watched.
    pub fn watch(&mut self, dir: &Path) -> notify::Result<()> {
        self.watcher.watch(dir, RecursiveMode::NonRecursive)
    }

    /// Process new files one at a time until `shutdown` is cancelled or
    /// either channel closes.
    pub async fn run(mut self, uploader: Uploader, shutdown: CancellationToken) {
        let mut last_handled: Option<PathBuf> = None;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Watcher stopped");
                    return;
                }
                event = self.events.next() => match event {
                    Some(event) => {
                        for created in FileEvent::created(&event) {
                            // A rename inside the directory is reported twice
                            if last_handled.as_ref() == Some(&created.path)
                                && fs::symlink_metadata(&created.path).await.is_err()
                            {
                                continue;
                            }
                            // Directories moved in show up as renames, not folder creations
                            if fs::metadata(&created.path).await.is_ok_and(|meta| meta.is_dir()) {
                                continue;
                            }
                            handle_path(&uploader, &created.path).await;
                            last_handled = Some(created.path);
                        }
                    }
                    None => return,
                },
                err = self.errors.next() => match err {
                    Some(e) => error!(error = %e, "Watcher error"),
                    None => return,
                },
            }
        }
    }
}
