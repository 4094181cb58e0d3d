use crate::config::RelayConfig;
use crate::services::compression::ImageCompressor;
use crate::services::tinify::TinifyClient;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use url::Url;

pub fn setup_compressor(config: &RelayConfig) -> Result<Arc<dyn ImageCompressor>> {
    let shrink_url = Url::parse(&config.tinify_shrink_url)
        .with_context(|| format!("Invalid TINIFY_SHRINK_URL: {}", config.tinify_shrink_url))?;

    info!(
        "🗜️  TinyPNG endpoint: {} (timeout {}s)",
        shrink_url, config.request_timeout_secs
    );

    let client = TinifyClient::new(
        shrink_url,
        config.tinify_api_key.clone(),
        config.request_timeout(),
    )
    .context("Failed to build TinyPNG HTTP client")?;

    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_endpoint() {
        let config = RelayConfig {
            tinify_shrink_url: "not a url".to_string(),
            ..RelayConfig::development()
        };
        assert!(setup_compressor(&config).is_err());
    }

    #[test]
    fn test_builds_client_for_default_endpoint() {
        assert!(setup_compressor(&RelayConfig::development()).is_ok());
    }
}
