use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default Tinify submit endpoint
pub const DEFAULT_SHRINK_URL: &str = "https://api.tinify.com/shrink";

/// Runtime configuration for the relay
#[derive(Clone)]
pub struct RelayConfig {
    /// Tinify API key, sent as the Basic auth password (required)
    pub tinify_api_key: String,

    /// Tinify submit endpoint (default: "https://api.tinify.com/shrink")
    pub tinify_shrink_url: String,

    /// Directory holding transient uploads (default: "uploads")
    pub upload_dir: PathBuf,

    /// Maximum accepted image size in bytes (default: 32 MB)
    pub max_file_size: usize,

    /// Timeout applied to each outbound vendor call (default: 60s)
    pub request_timeout_secs: u64,

    /// Allowed CORS origins, comma separated. Empty allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            tinify_api_key: String::new(),
            tinify_shrink_url: DEFAULT_SHRINK_URL.to_string(),
            upload_dir: PathBuf::from("uploads"),
            max_file_size: 32 * 1024 * 1024, // 32 MB
            request_timeout_secs: 60,
            allowed_origins: Vec::new(),
        }
    }
}

// Keep the API key out of logs.
impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("tinify_api_key", &"<redacted>")
            .field("tinify_shrink_url", &self.tinify_shrink_url)
            .field("upload_dir", &self.upload_dir)
            .field("max_file_size", &self.max_file_size)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("allowed_origins", &self.allowed_origins)
            .finish()
    }
}

impl RelayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        let tinify_api_key = lookup("TINYPNG_API_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .context("TINYPNG_API_KEY must be set")?;

        Ok(Self {
            tinify_api_key,

            tinify_shrink_url: lookup("TINIFY_SHRINK_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(default.tinify_shrink_url),

            upload_dir: lookup("UPLOAD_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            max_file_size: lookup("MAX_FILE_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(default.request_timeout_secs),

            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(default.allowed_origins),
        })
    }

    /// Config for local runs and tests; the key is a placeholder.
    pub fn development() -> Self {
        Self {
            tinify_api_key: "development-key".to_string(),
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
