use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use object_store::ObjectStore;
use object_store::buffered::BufWriter;
use object_store::path::Path as ObjectPath;
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};
use crate::core::file_handler;
use crate::core::models::UploadedImage;

/// Chunk size for moving bytes from the local file to the remote stream (1MB)
pub const CHUNK_SIZE: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {} to the bucket: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to commit {} to the bucket: {source}", path.display())]
    Commit { path: PathBuf, source: io::Error },
    #[error("uploaded {} but failed to remove it: {source}", path.display())]
    Remove { path: PathBuf, source: io::Error },
}

/// Moves image files from the local disk into the bucket.
#[derive(Clone)]
pub struct Uploader {
    store: Arc<dyn ObjectStore>,
    base_url: String,
}

impl Uploader {
    pub fn new(store: Arc<dyn ObjectStore>, base_url: impl Into<String>) -> Self {
        Self {
            store,
            base_url: base_url.into(),
        }
    }

    /// Public address of an uploaded object.
    pub fn public_url(&self, object: &str) -> String {
        format!("{}/{}", self.base_url, object)
    }

    /// Upload `path` if it carries a supported image extension.
    ///
    /// Returns `Ok(None)` for files that are not images.
    pub async fn maybe_upload(&self, path: &Path) -> Result<Option<UploadedImage>, UploadError> {
        match file_handler::supported_extension(path) {
            Some(extension) => self.upload(path, extension).await.map(Some),
            None => {
                debug!(path = %path.display(), "Skipping unsupported file");
                Ok(None)
            }
        }
    }

    /// Stream `path` to a randomly named object, then delete the local file.
    ///
    /// The local file is only removed once the remote object has been
    /// committed. Nothing is committed if reading or writing fails part way.
    pub async fn upload(&self, path: &Path, extension: &str) -> Result<UploadedImage, UploadError> {
        let object = file_handler::random_object_name(extension);

        let mut file = File::open(path).await.map_err(|source| UploadError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut writer = BufWriter::new(Arc::clone(&self.store), ObjectPath::from(object.as_str()));
        let mut buffer = vec![0u8; CHUNK_SIZE];

        loop {
            let bytes_read = match file.read(&mut buffer).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(source) => {
                    abort(&mut writer, &object).await;
                    return Err(UploadError::Read { path: path.to_path_buf(), source });
                }
            };

            if let Err(source) = writer.write_all(&buffer[..bytes_read]).await {
                abort(&mut writer, &object).await;
                return Err(UploadError::Write { path: path.to_path_buf(), source });
            }
        }

        writer.shutdown().await.map_err(|source| UploadError::Commit {
            path: path.to_path_buf(),
            source,
        })?;

        // Remove file once it is safely in the bucket
        fs::remove_file(path).await.map_err(|source| UploadError::Remove {
            path: path.to_path_buf(),
            source,
        })?;

        let url = self.public_url(&object);
        println!("Uploaded image to {}", url);

        Ok(UploadedImage {
            source: path.to_path_buf(),
            object,
            url,
        })
    }
}

async fn abort(writer: &mut BufWriter, object: &str) {
    if let Err(e) = writer.abort().await {
        warn!(%object, error = %e, "Failed to abort upload");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use std::io::Write;
    use tempfile::TempDir;

    fn uploader(store: &Arc<InMemory>) -> Uploader {
        Uploader::new(store.clone(), "https://img.example.com")
    }

    async fn object_count(store: &InMemory) -> usize {
        store.list_with_delimiter(None).await.unwrap().objects.len()
    }

    async fn round_trip(len: usize) {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("photo.png");
        let content: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        std::fs::File::create(&file_path).unwrap().write_all(&content).unwrap();

        let store = Arc::new(InMemory::new());
        let uploaded = uploader(&store).upload(&file_path, ".png").await.unwrap();

        let stored = store
            .get(&ObjectPath::from(uploaded.object.as_str()))
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();
        assert_eq!(stored.as_ref(), content.as_slice(), "len {len}");
        assert!(!file_path.exists());
    }

    #[tokio::test]
    async fn test_round_trip_small_file() {
        round_trip(100).await;
    }

    #[tokio::test]
    async fn test_round_trip_empty_file() {
        round_trip(0).await;
    }

    #[tokio::test]
    async fn test_round_trip_exact_chunk() {
        round_trip(CHUNK_SIZE).await;
    }

    #[tokio::test]
    async fn test_round_trip_uneven_chunks() {
        round_trip(CHUNK_SIZE * 2 + 17).await;
    }

    #[tokio::test]
    async fn test_object_name_and_url() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("shot.jpeg");
        std::fs::write(&file_path, b"jpeg bytes").unwrap();

        let store = Arc::new(InMemory::new());
        let uploaded = uploader(&store).upload(&file_path, ".jpeg").await.unwrap();

        let (stem, extension) = uploaded.object.split_at(10);
        assert!(stem.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(extension, ".jpeg");
        assert_eq!(uploaded.url, format!("https://img.example.com/{}", uploaded.object));
        assert_eq!(uploaded.source, file_path);
    }

    #[tokio::test]
    async fn test_missing_file_fails_to_open() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("gone.png");

        let store = Arc::new(InMemory::new());
        let result = uploader(&store).upload(&file_path, ".png").await;

        assert!(matches!(result, Err(UploadError::Open { .. })));
        assert_eq!(object_count(&store).await, 0);
    }

    #[tokio::test]
    async fn test_unreadable_file_is_left_in_place() {
        // A directory opens fine but every read fails
        let temp_dir = TempDir::new().unwrap();
        let dir_path = temp_dir.path().join("album.png");
        std::fs::create_dir(&dir_path).unwrap();

        let store = Arc::new(InMemory::new());
        let result = uploader(&store).upload(&dir_path, ".png").await;

        assert!(matches!(result, Err(UploadError::Read { .. })));
        assert_eq!(object_count(&store).await, 0);
        assert!(dir_path.exists());
    }

    #[tokio::test]
    async fn test_maybe_upload_skips_other_files() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("notes.txt");
        std::fs::write(&file_path, b"not an image").unwrap();

        let store = Arc::new(InMemory::new());
        let result = uploader(&store).maybe_upload(&file_path).await.unwrap();

        assert!(result.is_none());
        assert!(file_path.exists());
        assert_eq!(object_count(&store).await, 0);
    }
}
