use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use image_compress_relay::api::middleware::request_id::REQUEST_ID_HEADER;
use image_compress_relay::config::RelayConfig;
use image_compress_relay::infrastructure::{compressor, storage};
use image_compress_relay::{AppState, create_app};
use std::net::{IpAddr, SocketAddr};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the HTTP listener to
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port for the HTTP listener
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_compress_relay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting image compression relay...");

    let config = RelayConfig::from_env()?;
    info!(
        "🛡️  Relay Config: Max Size={}MB, Upload Dir={}, Origins={}",
        config.max_file_size / 1024 / 1024,
        config.upload_dir.display(),
        if config.allowed_origins.is_empty() {
            "*".to_string()
        } else {
            config.allowed_origins.join(",")
        }
    );

    let stager = storage::setup_upload_dir(&config.upload_dir, config.max_file_size)
        .await
        .with_context(|| format!("Failed to prepare {}", config.upload_dir.display()))?;
    let compressor = compressor::setup_compressor(&config)?;

    let state = AppState::new(config, stager, compressor);

    let app = create_app(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            })
            .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
                info!("📥 {} {}", request.method(), request.uri());
            })
            .on_response(
                |response: &axum::http::Response<_>,
                 latency: std::time::Duration,
                 _span: &tracing::Span| {
                    info!(
                        "📤 Finished in {:?} with status {}",
                        latency,
                        response.status()
                    );
                },
            ),
    );

    let addr = SocketAddr::new(args.host, args.port);
    info!("✅ Image compression API server running at http://{}", addr);
    info!("📖 Swagger UI: http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("🛑 Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, starting graceful shutdown...");
        },
    }
}
