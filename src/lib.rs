pub mod api;
pub mod config;
pub mod infrastructure;
pub mod models;
pub mod services;

use crate::config::RelayConfig;
use crate::services::compression::ImageCompressor;
use crate::services::relay::RelayService;
use crate::services::staging::UploadStager;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Room for multipart boundaries and part headers on top of the image itself.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::compress::compress_tinypng,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            models::CompressForm,
            models::ErrorResponse,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "compress", description = "Image compression relay"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub stager: Arc<UploadStager>,
    pub relay: RelayService,
}

impl AppState {
    pub fn new(
        config: RelayConfig,
        stager: Arc<UploadStager>,
        compressor: Arc<dyn ImageCompressor>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            stager,
            relay: RelayService::new(compressor),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.max_file_size + MULTIPART_OVERHEAD;
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/api/compress/tinypng",
            post(api::handlers::compress::compress_tinypng)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
