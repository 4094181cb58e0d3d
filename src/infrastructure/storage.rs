use crate::services::staging::{UPLOAD_PREFIX, UploadStager};
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Create the upload directory and clear uploads left behind by an earlier
/// process. Only call this before the listener starts accepting requests.
pub async fn setup_upload_dir(dir: &Path, max_file_size: usize) -> io::Result<Arc<UploadStager>> {
    tokio::fs::create_dir_all(dir).await?;

    let removed = purge_stale_uploads(dir).await?;
    if removed > 0 {
        warn!("🧹 Removed {} stale upload(s) from {}", removed, dir.display());
    }

    info!("📁 Upload directory: {}", dir.display());
    Ok(Arc::new(UploadStager::new(dir, max_file_size as u64)))
}

async fn purge_stale_uploads(dir: &Path) -> io::Result<usize> {
    let mut removed = 0;
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let is_upload = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(UPLOAD_PREFIX));
        if !is_upload || !entry.file_type().await?.is_file() {
            continue;
        }

        match tokio::fs::remove_file(entry.path()).await {
            Ok(()) => removed += 1,
            Err(e) => warn!("Failed to remove stale upload {}: {}", entry.path().display(), e),
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_creates_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("uploads");

        let stager = setup_upload_dir(&dir, 1024).await.unwrap();
        assert!(dir.is_dir());
        assert_eq!(stager.dir(), dir.as_path());
    }

    #[tokio::test]
    async fn test_purges_only_stale_uploads() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("upload-abc123"), b"left over").unwrap();
        std::fs::write(dir.path().join("upload-def456"), b"left over").unwrap();
        std::fs::write(dir.path().join("README"), b"keep me").unwrap();

        setup_upload_dir(dir.path(), 1024).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["README".to_string()]);
    }
}
