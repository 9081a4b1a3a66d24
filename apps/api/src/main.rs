mod analysis;
mod auth;
mod config;
mod errors;
mod feedback;
mod platform;
mod resumes;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::client::AnthropicClient;
use crate::analysis::LlmFeedbackService;
use crate::config::{Config, RemoteStorage, StorageBackend};
use crate::platform::memory::{MemoryBlobStore, MemoryKvStore};
use crate::platform::redis_kv::RedisKvStore;
use crate::platform::s3_blob::S3BlobStore;
use crate::platform::session::KvSessionAuth;
use crate::platform::{BlobStore, KvStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resumind API v{}", env!("CARGO_PKG_VERSION"));

    let (kv, blobs): (Arc<dyn KvStore>, Arc<dyn BlobStore>) = match &config.storage {
        StorageBackend::Memory => {
            info!("Using in-memory storage; records are lost on restart");
            (
                Arc::new(MemoryKvStore::default()),
                Arc::new(MemoryBlobStore::default()),
            )
        }
        StorageBackend::Remote(remote) => {
            let redis = redis::Client::open(remote.redis_url.clone())?;
            info!("Redis client initialized");
            let s3 = build_s3_client(remote).await;
            info!("S3 client initialized (bucket: {})", remote.s3_bucket);
            (
                Arc::new(RedisKvStore::new(redis)),
                Arc::new(S3BlobStore::new(s3, remote.s3_bucket.clone())),
            )
        }
    };

    let client = AnthropicClient::new(config.anthropic_api_key.clone())?;
    info!("Feedback service initialized (model: {})", analysis::client::MODEL);

    let state = AppState {
        auth: Arc::new(KvSessionAuth::new(kv.clone())),
        kv,
        blobs,
        feedback_service: Arc::new(LlmFeedbackService::new(client)),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(remote: &RemoteStorage) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &remote.aws_access_key_id,
        &remote.aws_secret_access_key,
        None,
        None,
        "resumind-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&remote.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
