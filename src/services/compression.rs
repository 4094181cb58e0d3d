use crate::models::{CompressedImage, CompressionJob};
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use thiserror::Error;

/// Which leg of the vendor exchange failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Submit,
    Fetch,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Submit => f.write_str("submit"),
            Stage::Fetch => f.write_str("fetch"),
        }
    }
}

#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("Failed to read staged upload: {0}")]
    Staging(#[from] std::io::Error),

    #[error("Request to compression service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Compression service rejected {stage} with status {status}: {message}")]
    Rejected {
        stage: Stage,
        status: u16,
        message: String,
    },

    #[error("Compression service returned an unreadable response: {0}")]
    MalformedResponse(String),

    #[error("Compression service response has no output url")]
    MissingOutputUrl,

    #[error("Compression service returned an invalid output url: {0}")]
    InvalidOutputUrl(String),
}

impl CompressionError {
    /// The vendor answered, but without a usable artifact reference.
    pub fn is_malformed_response(&self) -> bool {
        matches!(
            self,
            CompressionError::MalformedResponse(_)
                | CompressionError::MissingOutputUrl
                | CompressionError::InvalidOutputUrl(_)
        )
    }
}

/// Vendor side of the relay: submit raw bytes, then download the result.
#[async_trait]
pub trait ImageCompressor: Send + Sync {
    /// Submit image bytes and return a reference to the compressed artifact
    async fn shrink(&self, image: Bytes) -> Result<CompressionJob, CompressionError>;

    /// Download the artifact a previous `shrink` pointed at
    async fn fetch(&self, job: &CompressionJob) -> Result<CompressedImage, CompressionError>;
}
