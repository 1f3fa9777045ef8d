use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use tokio::net::TcpListener;

use crate::config::{self, Config};
use crate::error::ScheduleError;
use crate::invitee::EnrichedInvitee;
use crate::pipeline::Pipeline;

// API state that will be shared across handlers
pub struct ApiState {
    pub pipeline: Pipeline,
}

// Error body, shaped the same for every failure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

impl From<ScheduleError> for ErrorResponse {
    fn from(err: ScheduleError) -> Self {
        Self { error: err.to_string(), kind: err.kind().to_string() }
    }
}

/// HTTP status reported for each pipeline failure
pub fn status_for(err: &ScheduleError) -> StatusCode {
    match err {
        ScheduleError::UnknownLocation(_) => StatusCode::FORBIDDEN,
        ScheduleError::LocationNotFound(_) => StatusCode::NOT_FOUND,
        ScheduleError::DeadlineExceeded { .. } => StatusCode::GATEWAY_TIMEOUT,
        ScheduleError::ProviderUnavailable { .. }
        | ScheduleError::EventUriMalformed(_)
        | ScheduleError::MalformedInviteeRecord { .. }
        | ScheduleError::InviteeUriMalformed(_)
        | ScheduleError::EnrichmentFailed { .. } => StatusCode::BAD_GATEWAY,
    }
}

// Build the enriched schedule for one location
async fn schedule_handler(
    State(state): State<Arc<ApiState>>,
    Path(location): Path<String>,
) -> Result<Json<Vec<EnrichedInvitee>>, ApiError> {
    match state.pipeline.run(&location).await {
        Ok(invitees) => Ok(Json(invitees)),
        Err(e) => {
            warn!("Schedule request for '{}' failed: {}", location, e);
            Err((status_for(&e), Json(ErrorResponse::from(e))))
        }
    }
}

// List the locations a schedule can be requested for
async fn locations_handler(State(state): State<Arc<ApiState>>) -> Json<Vec<String>> {
    Json(state.pipeline.locations().all().to_vec())
}

// Health check endpoint
async fn health_check() -> &'static str {
    "Pickup schedule API is running"
}

pub fn router(state: Arc<ApiState>) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/locations", get(locations_handler))
        .route("/schedule/{location}", get(schedule_handler))
        .layer(cors)
        .with_state(state)
}

// Create and start the API server
pub async fn start_api_server(config: Config) -> Result<()> {
    let token = config::bearer_token()?;
    let pipeline = Pipeline::from_config(&config, token)?;
    let state = Arc::new(ApiState { pipeline });
    let app = router(state);

    let addr = config.server.bind_address.as_str();
    info!("API server starting on http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to address: {}", addr))?;

    info!("API server successfully bound to {}. Waiting for connections...", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow!("Failed to start API server: {}", e))?;

    Ok(())
}
