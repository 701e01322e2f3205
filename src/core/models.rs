use std::path::PathBuf;
use notify::{Event, EventKind};
use notify::event::{CreateKind, ModifyKind, RenameMode};

/// A file that appeared in the watched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub path: PathBuf,
}

impl FileEvent {
    /// Extract the new directory entries from a notify event: non-folder
    /// creations and the destination side of a rename. Everything else,
    /// including the source side of a rename, yields nothing.
    pub fn created(event: &Event) -> Vec<FileEvent> {
        let paths: &[PathBuf] = match event.kind {
            EventKind::Create(CreateKind::Folder) => &[],
            EventKind::Create(_) => &event.paths,
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => &event.paths,
            // paths are [from, to]
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                event.paths.get(1..2).unwrap_or(&[])
            }
            _ => &[],
        };

        paths
            .iter()
            .map(|path| FileEvent { path: path.clone() })
            .collect()
    }
}

/// A file that was committed to the bucket and removed locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub source: PathBuf,   // Local path, no longer present
    pub object: String,    // Remote object name
    pub url: String,       // Public address of the object
}
