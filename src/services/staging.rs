use axum::extract::multipart::{Field, MultipartError};
use bytes::Bytes;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Prefix of every transient upload file in the upload directory
pub const UPLOAD_PREFIX: &str = "upload-";

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("Failed to write transient upload: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read multipart field: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Upload exceeds {limit} bytes")]
    TooLarge { limit: u64 },
}

/// An uploaded image held in transient storage.
///
/// The backing file is removed when the value is dropped, whichever way the
/// request ends. A failed removal is logged and otherwise ignored.
#[derive(Debug)]
pub struct StagedUpload {
    path: Option<TempPath>,
    pub filename: String,
    pub content_type: Option<String>,
    pub size: u64,
}

impl StagedUpload {
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn read(&self) -> io::Result<Bytes> {
        let path = self
            .path()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "upload already released"))?;
        tokio::fs::read(path).await.map(Bytes::from)
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let shown = path.display().to_string();
            match path.close() {
                Ok(()) => tracing::debug!(path = %shown, "Removed transient upload"),
                Err(e) => tracing::error!(path = %shown, error = %e, "Failed to delete uploaded file"),
            }
        }
    }
}

/// Writes multipart file fields into uniquely named files under one directory.
#[derive(Debug, Clone)]
pub struct UploadStager {
    dir: PathBuf,
    max_file_size: u64,
}

impl UploadStager {
    pub fn new(dir: impl Into<PathBuf>, max_file_size: u64) -> Self {
        Self {
            dir: dir.into(),
            max_file_size,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn stage(&self, mut field: Field<'_>) -> Result<StagedUpload, StagingError> {
        let filename = field.file_name().unwrap_or("unnamed").to_string();
        let content_type = field.content_type().map(|s| s.to_string());

        let temp_file = tempfile::Builder::new()
            .prefix(UPLOAD_PREFIX)
            .tempfile_in(&self.dir)?;
        let (file, path) = temp_file.into_parts();

        // Declared before the writer so the handle is closed before removal.
        let mut staged = StagedUpload {
            path: Some(path),
            filename,
            content_type,
            size: 0,
        };
        let mut writer = tokio::fs::File::from_std(file);

        while let Some(chunk) = field.chunk().await? {
            staged.size += chunk.len() as u64;
            if staged.size > self.max_file_size {
                return Err(StagingError::TooLarge {
                    limit: self.max_file_size,
                });
            }
            writer.write_all(&chunk).await?;
        }
        writer.flush().await?;

        Ok(staged)
    }
}
