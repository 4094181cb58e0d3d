use bytes::Bytes;
use serde::Serialize;
use url::Url;
use utoipa::ToSchema;

/// Handle to a compression performed by the vendor.
#[derive(Debug, Clone)]
pub struct CompressionJob {
    pub output_url: Url,
    pub input_size: Option<u64>,
    pub input_type: Option<String>,
    pub output_size: Option<u64>,
    pub output_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub ratio: Option<f64>,
    /// Compressions used this month on the account, from the `Compression-Count` header
    pub compression_count: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

impl CompressedImage {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Multipart body accepted by the compress endpoint.
#[derive(ToSchema)]
pub struct CompressForm {
    /// Image file to compress
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
