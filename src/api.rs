//! HTTP API handlers for Footprint.
//!
//! Calculation failures are returned as `422 Unprocessable Entity` with a
//! classified body:
//!
//! ```json
//! { "error": { "code": "UNKNOWN_FACTOR", "message": "no emission factor named 'coal'" } }
//! ```
//!
//! Bodies that do not deserialize get the same shape with code
//! `INVALID_REQUEST` and the extractor's status. Storage failures are logged
//! and returned as a bare `500`.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use crate::engine::FootprintEngine;
use crate::error::EngineError;
use crate::model::{
    AdminSummary, AdminSummaryQuery, CalculateRequest, EmissionFactor, FootprintRecord,
    MonthlyAnalyticsResponse, UserInfo,
};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: FootprintEngine,
    /// Default length of the admin performer lists.
    pub ranking_size: usize,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/users/:user_id/footprints",
            post(post_footprint)
                .get(list_footprints)
                .delete(delete_footprints),
        )
        .route("/users/:user_id/analytics/monthly", get(get_monthly_analytics))
        .route("/users/:user_id", put(put_user))
        .route("/admin/summary", get(get_admin_summary))
        .route("/factors", get(list_factors))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Error response for handlers that go through the engine.
pub enum ApiError {
    Engine(EngineError),
    BadBody(JsonRejection),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadBody(rejection)
    }
}

fn error_body(status: StatusCode, code: &str, message: String) -> Response {
    let body = json!({
        "error": {
            "code": code,
            "message": message,
        }
    });
    (status, Json(body)).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Engine(EngineError::Calculation(err)) => error_body(
                StatusCode::UNPROCESSABLE_ENTITY,
                err.kind().as_str(),
                err.to_string(),
            ),
            ApiError::Engine(EngineError::Storage(err)) => {
                warn!(error = %err, "Storage failure");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            ApiError::BadBody(rejection) => {
                error_body(rejection.status(), "INVALID_REQUEST", rejection.body_text())
            }
        }
    }
}

/// POST /users/:user_id/footprints - Calculate and store a monthly footprint.
///
/// # Request Body
///
/// ```json
/// {
///     "period": "2025-03",
///     "activities": [
///         { "category": "energy", "sub_type": "electricity", "quantity": 100, "unit": "kWh" }
///     ]
/// }
/// ```
///
/// # Response
///
/// Returns `201 Created` with the stored record. A second calculation for the
/// same period replaces the first.
#[instrument(skip(state, request), fields(period, activities))]
pub async fn post_footprint(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    request: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FootprintRecord>), ApiError> {
    let Json(request) = request?;
    tracing::Span::current().record("period", request.period.as_str());
    tracing::Span::current().record("activities", request.activities.len());

    match state
        .engine
        .calculate(&user_id, &request.period, request.activities)
        .await
    {
        Ok(record) => Ok((StatusCode::CREATED, Json(record))),
        Err(e) => {
            warn!(
                user_id = %user_id,
                period = %request.period,
                error = %e,
                "Footprint calculation failed"
            );
            Err(e.into())
        }
    }
}

/// GET /users/:user_id/footprints - List a user's records, oldest period first.
#[instrument(skip(state))]
pub async fn list_footprints(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<FootprintRecord>>, ApiError> {
    let records = state.engine.list_records(&user_id).await?;
    info!(user_id = %user_id, count = records.len(), "Footprints listed");
    Ok(Json(records))
}

/// DELETE /users/:user_id/footprints - Delete all of a user's records.
#[instrument(skip(state))]
pub async fn delete_footprints(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = state.engine.delete_user_data(&user_id).await?;
    Ok(Json(json!({ "user_id": user_id, "deleted": deleted })))
}

/// GET /users/:user_id/analytics/monthly - Per-month totals and latest trend.
///
/// # Response
///
/// ```json
/// {
///     "user_id": "u1",
///     "months": [
///         { "month": "2025-01", "total_emissions": 96.0, "count": 1, "avg_emissions": 96.0 }
///     ],
///     "trend": null
/// }
/// ```
#[instrument(skip(state))]
pub async fn get_monthly_analytics(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<MonthlyAnalyticsResponse>, ApiError> {
    let report = state.engine.monthly_report(&user_id).await?;
    info!(user_id = %user_id, months = report.months.len(), "Monthly analytics queried");
    Ok(Json(report))
}

/// PUT /users/:user_id - Store username and region shown in rankings.
#[instrument(skip(state, info))]
pub async fn put_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    info: Result<Json<UserInfo>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(info) = info?;
    state
        .engine
        .storage()
        .upsert_user(&user_id, &info)
        .await
        .map_err(EngineError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /admin/summary - Population average and performer rankings.
///
/// # Query Parameters
///
/// - `limit` (optional): length of each performer list
///
/// Top performers are the lowest emitters, ascending; bottom performers are
/// the highest emitters, descending.
#[instrument(skip(state))]
pub async fn get_admin_summary(
    State(state): State<AppState>,
    Query(query): Query<AdminSummaryQuery>,
) -> Result<Json<AdminSummary>, ApiError> {
    let limit = query.limit.unwrap_or(state.ranking_size);
    Ok(Json(state.engine.admin_summary(limit).await?))
}

/// GET /factors - The active emission factor catalog.
#[instrument(skip(state))]
pub async fn list_factors(
    State(state): State<AppState>,
) -> Result<Json<Vec<EmissionFactor>>, ApiError> {
    let factors = state
        .engine
        .storage()
        .get_all_active_factors()
        .await
        .map_err(EngineError::from)?;
    Ok(Json(factors))
}

/// GET /health - Simple health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}
