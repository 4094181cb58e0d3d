use crate::models::{CompressedImage, CompressionJob};
use crate::services::compression::{CompressionError, ImageCompressor, Stage};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Fixed Basic auth username of the Tinify API; the key goes in the password.
pub const TINIFY_USERNAME: &str = "api";

const COMPRESSION_COUNT_HEADER: &str = "compression-count";
const MAX_LOGGED_BODY: usize = 512;

#[derive(Debug, Deserialize)]
struct ShrinkResponse {
    input: Option<ShrinkInput>,
    output: Option<ShrinkOutput>,
}

#[derive(Debug, Deserialize)]
struct ShrinkInput {
    size: Option<u64>,
    #[serde(rename = "type")]
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShrinkOutput {
    size: Option<u64>,
    #[serde(rename = "type")]
    mime_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    ratio: Option<f64>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VendorError {
    error: Option<String>,
    message: Option<String>,
}

pub struct TinifyClient {
    http: reqwest::Client,
    shrink_url: Url,
    api_key: String,
}

impl TinifyClient {
    pub fn new(
        shrink_url: Url,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, CompressionError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            shrink_url,
            api_key,
        })
    }

    async fn rejection(stage: Stage, response: reqwest::Response) -> CompressionError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        CompressionError::Rejected {
            stage,
            status,
            message: vendor_message(&body),
        }
    }
}

#[async_trait]
impl ImageCompressor for TinifyClient {
    async fn shrink(&self, image: Bytes) -> Result<CompressionJob, CompressionError> {
        let response = self
            .http
            .post(self.shrink_url.clone())
            .basic_auth(TINIFY_USERNAME, Some(&self.api_key))
            .header(CONTENT_TYPE, mime::APPLICATION_OCTET_STREAM.as_ref())
            .body(image)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(Stage::Submit, response).await);
        }

        let compression_count = compression_count(response.headers());
        let body = response.bytes().await?;
        parse_shrink_response(&body, compression_count)
    }

    async fn fetch(&self, job: &CompressionJob) -> Result<CompressedImage, CompressionError> {
        let response = self.http.get(job.output_url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(Self::rejection(Stage::Fetch, response).await);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
            .or_else(|| job.output_type.clone());
        let bytes = response.bytes().await?;

        Ok(CompressedImage {
            bytes,
            content_type,
        })
    }
}

fn compression_count(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(COMPRESSION_COUNT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn parse_shrink_response(
    body: &[u8],
    compression_count: Option<u64>,
) -> Result<CompressionJob, CompressionError> {
    let parsed: ShrinkResponse = serde_json::from_slice(body)
        .map_err(|e| CompressionError::MalformedResponse(e.to_string()))?;

    let output = parsed.output.ok_or(CompressionError::MissingOutputUrl)?;
    let raw_url = output
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or(CompressionError::MissingOutputUrl)?;

    let output_url = Url::parse(&raw_url)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .ok_or_else(|| CompressionError::InvalidOutputUrl(raw_url.clone()))?;

    Ok(CompressionJob {
        output_url,
        input_size: parsed.input.as_ref().and_then(|i| i.size),
        input_type: parsed.input.and_then(|i| i.mime_type),
        output_size: output.size,
        output_type: output.mime_type,
        width: output.width,
        height: output.height,
        ratio: output.ratio,
        compression_count,
    })
}

/// Condense a vendor error body into one log-friendly line.
fn vendor_message(body: &str) -> String {
    if let Ok(VendorError { error, message }) = serde_json::from_str::<VendorError>(body) {
        match (error, message) {
            (Some(e), Some(m)) => return format!("{}: {}", e, m),
            (Some(e), None) => return e,
            (None, Some(m)) => return m,
            (None, None) => {}
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    trimmed.chars().take(MAX_LOGGED_BODY).collect()
}
