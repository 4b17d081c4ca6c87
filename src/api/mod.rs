//! HTTP API for palm productivity prediction.
//!
//! Provides REST endpoints over axum:
//!
//! - `GET /` - Welcome message
//! - `GET /health` - Readiness check
//! - `GET /metrics` - Prometheus-formatted metrics
//! - `POST /predict` - Batch prediction over land records
//!
//! ## Example
//!
//! ```rust,ignore
//! use panen::api::{create_router, AppState};
//!
//! let state = AppState::ready(predictor);
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::error::PanenError;
use crate::metrics::MetricsCollector;
use crate::service::Predictor;

mod types;

pub use types::{ErrorResponse, HealthResponse, PredictRequest, PredictResponse, WelcomeResponse};

/// Default cap on instances per request; bounds per-request memory.
pub const DEFAULT_MAX_BATCH: usize = 1024;

/// Application state shared across handlers.
///
/// Either the startup sequence produced a ready [`Predictor`] or it
/// failed with a recorded reason; there is no intermediate observable
/// state. Everything in here is immutable after construction.
#[derive(Clone)]
pub struct AppState {
    /// Predictor published by a successful startup, absent otherwise
    predictor: Option<Arc<Predictor>>,
    /// Why startup failed, for 503 responses in the failed state
    load_error: Option<String>,
    /// Metrics collector for monitoring
    metrics: Arc<MetricsCollector>,
    /// Maximum instances accepted per request
    max_batch: usize,
}

impl AppState {
    /// State for a service whose startup load succeeded.
    #[must_use]
    pub fn ready(predictor: Predictor) -> Self {
        Self {
            predictor: Some(Arc::new(predictor)),
            load_error: None,
            metrics: Arc::new(MetricsCollector::new()),
            max_batch: DEFAULT_MAX_BATCH,
        }
    }

    /// State for a service whose startup load failed. The server still
    /// answers, but `/predict` returns 503 carrying `reason`.
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            predictor: None,
            load_error: Some(reason.into()),
            metrics: Arc::new(MetricsCollector::new()),
            max_batch: DEFAULT_MAX_BATCH,
        }
    }

    /// State backed by the in-memory demo predictor.
    ///
    /// # Errors
    ///
    /// Returns an error if the demo predictor fails to build.
    pub fn demo() -> crate::error::Result<Self> {
        Ok(Self::ready(Predictor::demo()?))
    }

    /// Override the per-request batch cap.
    #[must_use]
    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch;
        self
    }

    /// Whether the service can serve predictions.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.predictor.is_some()
    }

    /// Metrics collector backing `GET /metrics`.
    #[must_use]
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }
}

/// Map a pipeline error to the HTTP status the boundary reports.
fn error_status(err: &PanenError) -> StatusCode {
    match err {
        PanenError::ModelNotReady => StatusCode::SERVICE_UNAVAILABLE,
        PanenError::SchemaMismatch { .. } | PanenError::Inference { .. } => {
            StatusCode::BAD_REQUEST
        }
        PanenError::StartupLoad { .. } | PanenError::Server { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Welcome handler (GET /)
async fn root_handler() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the Panen palm productivity prediction API!".to_string(),
    })
}

/// Health check handler (GET /health)
async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    if state.is_ready() {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ready".to_string(),
                version: crate::VERSION.to_string(),
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unavailable".to_string(),
                version: crate::VERSION.to_string(),
            }),
        )
    }
}

/// Metrics handler (GET /metrics)
async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics.to_prometheus()
}

/// Batch prediction handler (POST /predict)
///
/// Encodes the batch against the startup vocabularies, scores it, and
/// returns one rounded prediction per instance in input order. The
/// whole batch is rejected on any failure; no partial prediction list
/// is ever returned.
async fn predict_handler(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, (StatusCode, Json<ErrorResponse>)> {
    let start = Instant::now();

    let Some(predictor) = state.predictor.as_ref() else {
        state.metrics.record_failure();
        let err = PanenError::ModelNotReady;
        let message = match &state.load_error {
            Some(reason) => format!("{err}: {reason}"),
            None => err.to_string(),
        };
        return Err((error_status(&err), Json(ErrorResponse { error: message })));
    };

    if request.instances.len() > state.max_batch {
        state.metrics.record_failure();
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!(
                    "batch size {} exceeds the configured maximum of {}",
                    request.instances.len(),
                    state.max_batch
                ),
            }),
        ));
    }

    let predictions = predictor.predict(&request.instances).map_err(|err| {
        state.metrics.record_failure();
        (
            error_status(&err),
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
    })?;

    state
        .metrics
        .record_success(predictions.len(), start.elapsed());

    Ok(Json(PredictResponse { predictions }))
}

/// Create the API router with all routes configured.
#[must_use]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/predict", post(predict_handler))
        .with_state(state)
}
