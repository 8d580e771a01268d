pub mod routes;
pub mod state;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use subtle::ConstantTimeEq;
use thermal_core::config::AppConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Middleware that validates a bearer token from the Authorization header.
///
/// Uses constant-time comparison (`subtle::ConstantTimeEq`) so the token
/// cannot be recovered from response timing.
async fn auth_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let expected = match &state.config.server.auth_token {
        Some(t) => t,
        None => return next.run(req).await,
    };

    let provided = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match provided {
        Some(token) if bool::from(token.as_bytes().ct_eq(expected.as_bytes())) => {
            next.run(req).await
        }
        _ => (StatusCode::UNAUTHORIZED, "Invalid or missing bearer token").into_response(),
    }
}

/// Build the axum Router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let config = &state.config;

    // Session data requires auth when a token is configured.
    let protected = Router::new()
        .merge(routes::session_routes())
        .merge(routes::dashboard_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let public = Router::new().merge(routes::health_routes());

    let mut app = Router::new()
        .merge(protected)
        .merge(public)
        .with_state(state.clone());

    app = app.layer(TraceLayer::new_for_http());

    if config.server.cors {
        let cors = if config.server.auth_token.is_some() {
            CorsLayer::new()
                .allow_methods([axum::http::Method::GET])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                ])
                .allow_origin(Any)
        } else {
            CorsLayer::permissive()
        };
        app = app.layer(cors);
    }

    app
}

/// Start the HTTP server.
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let state = AppState::new(config.clone())?;
    tracing::info!("Serving sessions from the {} store", state.source.name());
    let router = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Starting server on {}", addr);

    if config.server.auth_token.is_none() {
        tracing::warn!("No auth_token configured, server is unauthenticated!");
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
    use std::sync::Arc;
    use thermal_core::error::ThermalError;
    use thermal_core::store::{SessionQuery, SessionSource};
    use thermal_core::types::SessionRecord;
    use tower::ServiceExt;

    /// Wednesday noon UTC, far from any day boundary.
    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap()
    }

    /// Write `count` daily sessions, newest on `fixed_now`, into a temp
    /// session dir.
    fn test_state(auth_token: Option<String>, count: i64) -> AppState {
        let tmp = tempfile::TempDir::new().unwrap();
        let now = fixed_now();
        let rows: Vec<_> = (0..count)
            .map(|i| {
                let start = now - Duration::days(i);
                serde_json::json!({
                    "id": format!("s{}", i),
                    "user_id": "u1",
                    "session_type": if i % 2 == 0 { "sauna" } else { "cold_plunge" },
                    "started_at": start.to_rfc3339_opts(SecondsFormat::Secs, true),
                    "duration_ms": 600000,
                    "peak_temp_c": 80.0,
                    "min_temp_c": 5.0,
                })
            })
            .collect();
        std::fs::write(
            tmp.path().join("sessions.json"),
            serde_json::to_string(&rows).unwrap(),
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.server.auth_token = auth_token;
        config.store.sessions_dir = Some(tmp.path().to_path_buf());
        // Keep the TempDir alive by leaking it (tests are short-lived).
        std::mem::forget(tmp);

        AppState::new(config)
            .expect("Failed to create test app state")
            .with_clock(fixed_now)
    }

    fn test_router(auth_token: Option<String>, count: i64) -> Router {
        build_router(test_state(auth_token, count))
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    struct FailingSource;

    #[async_trait]
    impl SessionSource for FailingSource {
        async fn fetch(&self, _query: &SessionQuery) -> thermal_core::error::Result<Vec<SessionRecord>> {
            Err(ThermalError::Store("database unreachable".into()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_health_no_auth_required() {
        let app = test_router(Some("secret-token".into()), 0);
        let resp = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["store"], "file");
    }

    #[tokio::test]
    async fn test_protected_route_rejects_without_token() {
        let app = test_router(Some("secret-token".into()), 1);
        let resp = app.oneshot(get("/v1/dashboard")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_protected_route_rejects_wrong_token() {
        let app = test_router(Some("secret-token".into()), 1);
        let req = Request::builder()
            .uri("/v1/sessions")
            .header("authorization", "Bearer wrong-token")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_protected_route_accepts_correct_token() {
        let app = test_router(Some("secret-token".into()), 1);
        let req = Request::builder()
            .uri("/v1/sessions")
            .header("authorization", "Bearer secret-token")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_sessions_are_paged_and_sanitized() {
        let app = test_router(None, 8);

        let resp = app
            .clone()
            .oneshot(get("/v1/sessions?limit=3.7&offset=2"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["limit"], 3);
        assert_eq!(body["offset"], 2);
        let ids: Vec<_> = body["sessions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["s2", "s3", "s4"]);

        let resp = app
            .oneshot(get("/v1/sessions?limit=abc&offset=-4"))
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["limit"], 50);
        assert_eq!(body["offset"], 0);
        assert_eq!(body["sessions"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_sessions_filtered_by_user() {
        let app = test_router(None, 4);
        let resp = app
            .oneshot(get("/v1/sessions?user_id=someone-else"))
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert!(body["sessions"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_stats() {
        let app = test_router(None, 6);
        let resp = app.oneshot(get("/v1/dashboard")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["totalSessions"], 6);
        assert_eq!(body["saunaCount"], 3);
        assert_eq!(body["coldCount"], 3);
        assert_eq!(body["currentStreakDays"], 6);
        assert_eq!(body["avgDurationMs"], 600000);
        assert_eq!(body["weeklyBuckets"].as_array().unwrap().len(), 12);
        assert_eq!(body["tempTrends"].as_array().unwrap().len(), 6);
        assert_eq!(body["recentSessions"].as_array().unwrap().len(), 5);
        assert_eq!(body["recentSessions"][0]["id"], "s0");
    }

    #[tokio::test]
    async fn test_dashboard_weekly_and_trends() {
        let app = test_router(None, 25);

        let resp = app.clone().oneshot(get("/v1/dashboard/weekly")).await.unwrap();
        let weekly = body_json(resp).await;
        let buckets = weekly.as_array().unwrap();
        assert_eq!(buckets.len(), 12);
        let total: u64 = buckets.iter().map(|b| b["totalCount"].as_u64().unwrap()).sum();
        assert_eq!(total, 25);

        let resp = app.oneshot(get("/v1/dashboard/trends")).await.unwrap();
        let trends = body_json(resp).await;
        let points = trends.as_array().unwrap();
        assert_eq!(points.len(), 20);
        assert_eq!(points[0]["tempF"], 41);
        assert_eq!(points[19]["tempF"], 176);
    }

    #[tokio::test]
    async fn test_dashboard_summary_text() {
        let app = test_router(None, 2);
        let resp = app.oneshot(get("/v1/dashboard/summary")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("Sessions: 2"));
    }

    #[tokio::test]
    async fn test_store_failure_is_opaque() {
        let state = AppState::with_source(AppConfig::default(), Arc::new(FailingSource));
        let app = build_router(state);
        let resp = app.oneshot(get("/v1/dashboard")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "Could not load sessions");
    }

    #[tokio::test]
    async fn test_dashboard_evaluates_at_state_clock() {
        fn a_week_later() -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2026, 3, 11, 12, 0, 0).unwrap()
        }

        let app = build_router(test_state(None, 6).with_clock(a_week_later));
        let resp = app.oneshot(get("/v1/dashboard")).await.unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["totalSessions"], 6);
        assert_eq!(body["currentStreakDays"], 0);
        let buckets = body["weeklyBuckets"].as_array().unwrap();
        assert_eq!(buckets[11]["weekStart"], "2026-03-09");
        assert_eq!(buckets[11]["totalCount"], 0);
        assert_eq!(buckets[10]["totalCount"], 3);
    }
}
