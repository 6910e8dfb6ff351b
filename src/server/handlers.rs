use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::error::ErrorCategory;
use crate::geo::GeoCoordinate;
use crate::risk::CacheMetadata;

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── GET /api/risk ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RiskQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

pub async fn risk(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RiskQuery>,
) -> Result<impl IntoResponse, Response> {
    let start = Instant::now();

    let (lat, lon) = match (params.lat, params.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            return Err(
                api_error(StatusCode::BAD_REQUEST, "Provide 'lat' and 'lon' parameters")
                    .into_response(),
            )
        }
    };

    let coord = GeoCoordinate::new(lat, lon);
    let observation = {
        let mut orchestrator = state.orchestrator.lock().unwrap();
        orchestrator.resolve(coord)
    };

    match observation {
        Ok(obs) => {
            tracing::info!(
                coord = %coord.redacted(),
                source = %obs.source,
                freshness = %obs.freshness,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "GET /api/risk"
            );
            Ok(Json(obs))
        }
        // Validation is the only error the risk path can surface.
        Err(e) => Err(api_error(StatusCode::BAD_REQUEST, e.to_string()).into_response()),
    }
}

// ─── GET /api/location ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct LocationQuery {
    pub allow_default: Option<bool>,
}

pub async fn location(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocationQuery>,
) -> Result<impl IntoResponse, Response> {
    let allow_default = params.allow_default.unwrap_or(true);

    let resolved = {
        let resolver = state.resolver.lock().unwrap();
        resolver.resolve(allow_default)
    };

    match resolved {
        Ok(loc) => {
            tracing::info!(
                coord = %loc.coordinates.redacted(),
                source = %loc.source,
                "GET /api/location"
            );
            Ok(Json(loc))
        }
        Err(e) if e.category == ErrorCategory::Validation => {
            Err(api_error(StatusCode::NOT_FOUND, e.to_string()).into_response())
        }
        Err(e) => Err(api_error(StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response()),
    }
}

// ─── POST /api/location/manual ───────────────────────────────────

#[derive(Deserialize)]
pub struct ManualSaveRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub place_name: String,
}

pub async fn save_manual(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ManualSaveRequest>,
) -> Result<StatusCode, Response> {
    let coord = GeoCoordinate::new(body.latitude, body.longitude);

    let result = {
        let mut resolver = state.resolver.lock().unwrap();
        resolver.save_manual(coord, &body.place_name)
    };

    match result {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(api_error(StatusCode::BAD_REQUEST, e.to_string()).into_response()),
    }
}

// ─── GET /api/cache, DELETE /api/cache ───────────────────────────

pub async fn cache_metadata(State(state): State<Arc<AppState>>) -> Json<CacheMetadata> {
    let orchestrator = state.orchestrator.lock().unwrap();
    Json(orchestrator.cache().metadata())
}

pub async fn cache_clear(State(state): State<Arc<AppState>>) -> StatusCode {
    let mut orchestrator = state.orchestrator.lock().unwrap();
    orchestrator.cache_mut().clear();
    tracing::info!("DELETE /api/cache");
    StatusCode::NO_CONTENT
}
