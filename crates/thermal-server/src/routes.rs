use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use thermal_analytics::aggregations::{
    build_dashboard_stats, compute_temp_trends, compute_weekly_buckets,
};
use thermal_analytics::ReportGenerator;
use thermal_core::error::ThermalError;
use thermal_core::pagination::Pagination;
use thermal_core::store::SessionQuery;
use thermal_core::types::SessionRecord;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

/// Store failures reach the client as an opaque "could not load".
fn store_error(e: ThermalError) -> ApiError {
    tracing::warn!("Session fetch failed: {}", e);
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorBody {
            error: "Could not load sessions".into(),
        }),
    )
}

// ── Health ──────────────────────────────────────────────────────────────

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "store": state.source.name(),
    }))
}

// ── Sessions ────────────────────────────────────────────────────────────

pub fn session_routes() -> Router<AppState> {
    Router::new().route("/v1/sessions", get(list_sessions))
}

/// Paging arrives as raw text so that junk values fall back to defaults
/// instead of being rejected.
#[derive(Debug, Deserialize)]
struct SessionListParams {
    limit: Option<String>,
    offset: Option<String>,
    user_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct SessionListResponse {
    sessions: Vec<SessionRecord>,
    limit: u32,
    offset: u64,
}

async fn list_sessions(
    State(state): State<AppState>,
    Query(params): Query<SessionListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = Pagination::from_query(params.limit.as_deref(), params.offset.as_deref());
    let query = SessionQuery::page(params.user_id, page);
    let sessions = state.source.fetch(&query).await.map_err(store_error)?;

    Ok(Json(SessionListResponse {
        sessions,
        limit: page.limit,
        offset: page.offset,
    }))
}

// ── Dashboard ───────────────────────────────────────────────────────────

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/dashboard", get(dashboard))
        .route("/v1/dashboard/weekly", get(dashboard_weekly))
        .route("/v1/dashboard/trends", get(dashboard_trends))
        .route("/v1/dashboard/summary", get(dashboard_summary))
}

#[derive(Debug, Deserialize)]
struct DashboardParams {
    user_id: Option<String>,
}

async fn recent_sessions(
    state: &AppState,
    user_id: Option<String>,
) -> Result<Vec<SessionRecord>, ApiError> {
    let query = SessionQuery::recent(user_id, state.config.dashboard.history_limit);
    state.source.fetch(&query).await.map_err(store_error)
}

async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Result<impl IntoResponse, ApiError> {
    let sessions = recent_sessions(&state, params.user_id).await?;
    Ok(Json(build_dashboard_stats(&sessions, state.now())))
}

async fn dashboard_weekly(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Result<impl IntoResponse, ApiError> {
    let sessions = recent_sessions(&state, params.user_id).await?;
    Ok(Json(compute_weekly_buckets(&sessions, state.now())))
}

async fn dashboard_trends(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Result<impl IntoResponse, ApiError> {
    let sessions = recent_sessions(&state, params.user_id).await?;
    Ok(Json(compute_temp_trends(&sessions)))
}

async fn dashboard_summary(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Result<impl IntoResponse, ApiError> {
    let sessions = recent_sessions(&state, params.user_id).await?;
    let stats = build_dashboard_stats(&sessions, state.now());
    Ok(ReportGenerator::text_summary(&stats))
}
