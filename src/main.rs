//! IoT IDS Multi-Class Analyzer
//!
//! Single-page web service over a pre-trained multi-class traffic
//! classifier: upload a CSV of network features to get per-row attack
//! predictions, or a labeled CSV to get an accuracy check.
//!
//! # Architecture
//!
//! ```text
//! upload ──► Tabular Ingestion ──► Prediction Pipeline ──► Report
//!                                     │            │
//!                              Model Adapter   Label Registry
//!                              (ONNX session)  (id → name/desc/action)
//! ```
//!
//! The model artifact is loaded exactly once at startup and is fatal if
//! it cannot be loaded; every per-upload failure is recovered at the
//! handler boundary.

mod config;
mod error;
mod handlers;
mod logic;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logic::labels::LabelRegistry;
use logic::model::{Classifier, OnnxClassifier};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "iotids_analyzer=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("IoT IDS Multi-Class Analyzer starting...");
    tracing::info!("Model artifact: {}", config.model_path);

    // No fallback model: a load failure stops the service, with the
    // full diagnostic surfaced to the operator.
    let classifier = match OnnxClassifier::load(&config.model_path) {
        Ok(classifier) => Arc::new(classifier),
        Err(e) => {
            tracing::error!("{}", e);
            tracing::error!("Refusing to serve without a model");
            std::process::exit(1);
        }
    };

    // Build application state
    let state = AppState {
        classifier,
        registry: Arc::new(LabelRegistry::builtin()),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared application state: the loaded model and the class registry
/// are read-only for the process lifetime.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn Classifier>,
    pub registry: Arc<LabelRegistry>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        // Page
        .route("/", get(handlers::page::index))
        .route("/assets/background", get(handlers::page::background))
        // Service
        .route("/health", get(handlers::health::check))
        .route("/api/v1/engine/status", get(handlers::analyze::engine_status))
        // Prediction paths
        .route("/api/v1/analyze", post(handlers::analyze::unlabeled))
        .route("/api/v1/analyze/scored", post(handlers::analyze::scored))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
