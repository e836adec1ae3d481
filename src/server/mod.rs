pub mod error;
pub mod handlers;
pub mod models;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::document::orientation::OrientationChain;
use crate::document::SignaturePipeline;
use crate::inference::{
    InferenceError, OrientationNet, TesseractOsd, YoloClassifier, YoloDetector,
};
use crate::utils::config::AppConfig;

/// Shared state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SignaturePipeline>,
    pub max_file_size: usize,
    pub temp_directory: Option<PathBuf>,
}

impl AppState {
    pub fn new(pipeline: SignaturePipeline, max_file_size: usize) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            max_file_size,
            temp_directory: None,
        }
    }

    #[must_use]
    pub fn with_temp_directory(mut self, temp_directory: Option<PathBuf>) -> Self {
        self.temp_directory = temp_directory;
        self
    }
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.max_file_size;

    Router::new()
        .route("/health", get(handlers::health))
        .route("/detect-signatures", post(handlers::detect_signatures))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Loads every model named in `config` and wires up the pipeline.
///
/// A missing classifier or detector is an error. A missing orientation
/// model only disables the neural orientation tier.
pub fn build_state(config: &AppConfig) -> Result<AppState, InferenceError> {
    tracing::info!("Preloading models...");
    let pool_size = config.inference_pool_size;

    tracing::info!("  Loading classifier ({})...", config.classifier_model);
    let classifier = YoloClassifier::pool(
        &config.model_path(&config.classifier_model),
        pool_size,
        config.classifier_min_confidence,
    )?;

    tracing::info!("  Loading signature detector ({})...", config.detector_model);
    let detector = YoloDetector::pool(
        &config.model_path(&config.detector_model),
        pool_size,
        config.detection_confidence,
    )?;

    let mut orientation = OrientationChain::new()
        .with_neural_min_confidence(config.neural_min_confidence)
        .with_osd_min_confidence(config.osd.min_confidence);

    match config.orientation_model.as_deref() {
        Some(model) => {
            tracing::info!("  Loading orientation classifier ({})...", model);
            match OrientationNet::pool(&config.model_path(model), pool_size) {
                Ok(net) => orientation = orientation.with_predictor(Arc::new(net)),
                Err(e) => tracing::warn!(
                    "Orientation classifier unavailable, continuing without it: {}",
                    e
                ),
            }
        }
        None => tracing::info!("  Neural orientation disabled"),
    }

    if config.osd.enabled {
        tracing::info!("  Using {} for orientation detection", config.osd.binary);
        orientation = orientation.with_scanner(Arc::new(TesseractOsd::new(
            &*config.osd.binary,
            Duration::from_millis(config.osd.timeout_ms),
        )));
    }

    tracing::info!("All models preloaded successfully.");

    let pipeline = SignaturePipeline::new(orientation, Arc::new(classifier), Arc::new(detector))
        .with_iou_threshold(config.iou_threshold);

    let max_file_size = usize::try_from(config.max_file_size).unwrap_or(usize::MAX);

    Ok(AppState::new(pipeline, max_file_size).with_temp_directory(config.temp_directory()))
}

pub async fn start_server(
    addr: SocketAddr,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting server on {}", addr);

    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("API endpoint: http://{}/detect-signatures", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
