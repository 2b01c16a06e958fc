//! Ragline HTTP Gateway
//!
//! The external surface of the service:
//! - `POST /upload-documents` - multipart document ingestion
//! - `POST /chat` - grounded question answering
//! - `GET /stats` - index statistics
//! - `DELETE /documents` - index wipe
//! - `GET /health`, `GET /metrics`

mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use ragline_common::{
    config::AppConfig,
    embeddings, generation, metrics,
    store::{self, VectorStore},
    RagEngine,
};
use ragline_ingestion::IngestionPipeline;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, Level};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub engine: Arc<RagEngine>,
    pub pipeline: Arc<IngestionPipeline>,
    pub store: Arc<dyn VectorStore>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(true)
        .json()
        .init();

    info!("Starting Ragline Gateway v{}", ragline_common::VERSION);

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        anyhow::anyhow!(e)
    })?;
    config.validate()?;
    let config = Arc::new(config);

    // Initialize metrics
    metrics::register_metrics();
    let metrics_handle = if config.observability.metrics_enabled {
        Some(PrometheusBuilder::new().install_recorder()?)
    } else {
        None
    };

    // Build the client bundle
    let embedder = embeddings::create_embedder(&config.embedding)?;
    let vector_store = store::create_store(&config.vector_store)?;
    let generator = generation::create_generator(&config.generation)?;

    let engine = Arc::new(RagEngine::new(
        embedder.clone(),
        vector_store.clone(),
        generator,
        config.retrieval.clone(),
    ));
    let pipeline = Arc::new(IngestionPipeline::new(
        embedder,
        vector_store.clone(),
        config.vector_store.upsert_batch_size,
    ));

    let state = AppState {
        config: config.clone(),
        engine,
        pipeline,
        store: vector_store,
    };

    // Build the router
    let app = create_router(state, metrics_handle);

    // Start the server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(
    state: AppState,
    metrics_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let max_upload_bytes = state.config.server.max_upload_bytes;

    let mut app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/upload-documents", post(handlers::documents::upload_documents))
        .route("/documents", delete(handlers::documents::delete_documents))
        .route("/chat", post(handlers::chat::chat))
        .route("/stats", get(handlers::stats::stats));

    if let Some(handle) = metrics_handle {
        app = app.route("/metrics", get(move || async move { handle.render() }));
    }

    app.layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
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
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
