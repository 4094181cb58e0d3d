use crate::models::CompressedImage;
use crate::services::compression::{CompressionError, ImageCompressor};
use crate::services::staging::StagedUpload;
use std::sync::Arc;
use tracing::info;

/// Runs one staged upload through the vendor: read, submit, fetch.
#[derive(Clone)]
pub struct RelayService {
    compressor: Arc<dyn ImageCompressor>,
}

impl RelayService {
    pub fn new(compressor: Arc<dyn ImageCompressor>) -> Self {
        Self { compressor }
    }

    pub async fn compress(&self, upload: &StagedUpload) -> Result<CompressedImage, CompressionError> {
        // 1. Read staged bytes
        let image = upload.read().await?;

        // 2. Submit to vendor
        let job = self.compressor.shrink(image).await?;
        info!(
            filename = %upload.filename,
            input_size = ?job.input_size,
            input_type = ?job.input_type,
            output_size = ?job.output_size,
            output_type = ?job.output_type,
            ratio = ?job.ratio,
            compression_count = ?job.compression_count,
            "Image compressed by vendor"
        );

        // 3. Download the artifact
        let compressed = self.compressor.fetch(&job).await?;
        info!(
            filename = %upload.filename,
            bytes = compressed.len(),
            content_type = ?compressed.content_type,
            "Downloaded compressed image"
        );

        Ok(compressed)
    }
}
