mod availability;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod store;
#[cfg(test)]
mod test_utils;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use availability::{AvailabilityService, Clock, SystemClock};
use config::Config;
use store::SqliteStore;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub store: SqliteStore,
    pub availability: AvailabilityService,
    pub config: Config,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: sqlx::SqlitePool, config: Config, clock: Arc<dyn Clock>) -> Self {
        let store = SqliteStore::new(db.clone());
        let availability = AvailabilityService::new(Arc::new(store.clone()), clock, config.zone);
        Self {
            db,
            store,
            availability,
            config,
            started_at: Instant::now(),
        }
    }
}

pub fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    // ── CORS: whitelist CORS_ORIGIN when configured, otherwise allow any ──
    let cors = match &state.config.cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(origin.parse()?))
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let availability_routes = Router::new()
        .route(
            "/api/craftsmen/{id}/availability",
            get(handlers::availability::check_availability),
        )
        .route(
            "/api/availability/alternatives",
            post(handlers::availability::check_with_alternatives),
        );

    let craftsman_routes = Router::new()
        .route("/api/craftsmen", post(handlers::craftsmen::create_craftsman))
        .route("/api/craftsmen/{id}", get(handlers::craftsmen::get_craftsman))
        .route(
            "/api/craftsmen/{id}/working-hours",
            put(handlers::craftsmen::update_working_hours),
        )
        .route(
            "/api/craftsmen/{id}/appointments",
            get(handlers::appointments::list_appointments),
        );

    let appointment_routes = Router::new()
        .route(
            "/api/appointments",
            post(handlers::appointments::create_appointment),
        )
        .route(
            "/api/appointments/{id}/cancel",
            post(handlers::appointments::cancel_appointment),
        );

    Ok(Router::new()
        .route("/api/health", get(handlers::health::health))
        .merge(availability_routes)
        .merge(craftsman_routes)
        .merge(appointment_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // ── Tracing ──
    let env_filter = EnvFilter::from_default_env().add_directive("info".parse()?);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Local time zone offset: {} (search defaults: {} days, {} slots)",
        config.zone.offset(),
        config.default_days_to_check,
        config.default_slots_to_return
    );

    // ── Database ──
    let pool = db::connect(&config.database_url).await?;

    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::new(pool, config, Arc::new(SystemClock)));
    let app = router(state)?;

    tracing::info!("Craftsman scheduler starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::test_utils::frozen_clock;

    async fn app(now: &str) -> Router {
        let pool = db::connect_in_memory().await.unwrap();
        let state = Arc::new(AppState::new(pool, Config::default(), frozen_clock(now)));
        router(state).unwrap()
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(json) => request.body(Body::from(json.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    /// Craftsman working Monday and Tuesday 9:00-17:00; returns its id.
    async fn seed_craftsman(app: &Router) -> i64 {
        let (status, body) = call(
            app,
            "POST",
            "/api/craftsmen",
            Some(json!({
                "name": "Anna Schreiner",
                "working_hours": {
                    "monday": ["9:00-17:00"],
                    "tuesday": ["9:00-17:00"]
                }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["data"]["id"].as_i64().unwrap()
    }

    async fn book(app: &Router, craftsman_id: i64, at: &str) -> i64 {
        let (status, body) = call(
            app,
            "POST",
            "/api/appointments",
            Some(json!({
                "craftsman_id": craftsman_id,
                "scheduled_at": at,
                "duration_minutes": 60
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["data"]["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app("2026-10-18 12:00").await;
        let (status, body) = call(&app, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["db_ok"], true);
    }

    #[tokio::test]
    async fn test_point_check_flow() {
        let app = app("2026-10-18 12:00").await;
        let id = seed_craftsman(&app).await;

        let uri = format!("/api/craftsmen/{}/availability?date=2026-10-19&time=10:00", id);
        let (status, body) = call(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["available"], true);
        assert_eq!(body["data"]["working_hours"], "9:00-17:00");

        book(&app, id, "2026-10-19T10:00").await;

        let (_, body) = call(&app, "GET", &uri, None).await;
        assert_eq!(body["data"]["available"], false);
        assert_eq!(body["data"]["reason"], "has conflicting appointments");

        let at_eleven =
            format!("/api/craftsmen/{}/availability?date=2026-10-19&time=11:00", id);
        let (_, body) = call(&app, "GET", &at_eleven, None).await;
        assert_eq!(body["data"]["available"], true);
    }

    #[tokio::test]
    async fn test_point_check_day_off() {
        let app = app("2026-10-18 12:00").await;
        let id = seed_craftsman(&app).await;
        let uri = format!("/api/craftsmen/{}/availability?date=2026-10-21&time=10:00", id);
        let (_, body) = call(&app, "GET", &uri, None).await;
        assert_eq!(body["data"]["available"], false);
        assert_eq!(body["data"]["reason"], "does not work on wednesday");
    }

    #[tokio::test]
    async fn test_point_check_validation_and_not_found() {
        let app = app("2026-10-18 12:00").await;
        let id = seed_craftsman(&app).await;

        let (status, body) =
            call(&app, "GET", &format!("/api/craftsmen/{}/availability", id), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);

        let (status, _) = call(
            &app,
            "GET",
            &format!("/api/craftsmen/{}/availability?date=19.10.2026", id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &app,
            "GET",
            "/api/craftsmen/999/availability?date=2026-10-19",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_alternatives_for_booked_monday() {
        let app = app("2026-10-18 12:00").await;
        let id = seed_craftsman(&app).await;
        for hour in 9..17 {
            book(&app, id, &format!("2026-10-19T{:02}:00", hour)).await;
        }

        let (status, body) = call(
            &app,
            "POST",
            "/api/availability/alternatives",
            Some(json!({
                "craftsman_id": id,
                "requested_date_time": "2026-10-19T10:00:00"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        let data = &body["data"];
        assert_eq!(data["is_available"], false);
        assert_eq!(data["reason"], "has conflicting appointments");
        assert_eq!(
            data["alternative_slots"],
            json!([
                "2026-10-20T09:00:00+00:00",
                "2026-10-20T09:30:00+00:00",
                "2026-10-20T10:00:00+00:00"
            ])
        );
        assert!(data["message_to_send"]
            .as_str()
            .unwrap()
            .contains("Tuesday, 20.10.2026 at 09:30"));
    }

    #[tokio::test]
    async fn test_alternatives_available() {
        let app = app("2026-10-18 12:00").await;
        let id = seed_craftsman(&app).await;
        let (_, body) = call(
            &app,
            "POST",
            "/api/availability/alternatives",
            Some(json!({
                "craftsman_id": id,
                "requested_date_time": "2026-10-19T10:00:00",
                "days_to_check": 3,
                "slots_to_return": 5
            })),
        )
        .await;
        assert_eq!(body["data"]["is_available"], true);
        assert_eq!(body["data"]["alternative_slots"], json!([]));
    }

    #[tokio::test]
    async fn test_alternatives_near_calendar_end() {
        let app = app("2026-10-18 12:00").await;
        let id = seed_craftsman(&app).await;
        let (status, body) = call(
            &app,
            "POST",
            "/api/availability/alternatives",
            Some(json!({
                "craftsman_id": id,
                "requested_date_time": "+262142-12-30T10:00",
                "slots_to_return": 20
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        let slots = body["data"]["alternative_slots"].as_array().unwrap();
        assert!(slots.len() <= 20);
    }

    #[tokio::test]
    async fn test_alternatives_validation() {
        let app = app("2026-10-18 12:00").await;
        let id = seed_craftsman(&app).await;
        for body in [
            json!({ "craftsman_id": id }),
            json!({ "craftsman_id": id, "requested_date_time": "soon" }),
            json!({
                "craftsman_id": id,
                "requested_date_time": "2026-10-19T10:00",
                "slots_to_return": 0
            }),
        ] {
            let (status, _) =
                call(&app, "POST", "/api/availability/alternatives", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }

        let (status, _) = call(
            &app,
            "POST",
            "/api/availability/alternatives",
            Some(json!({ "craftsman_id": 999, "requested_date_time": "2026-10-19T10:00" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cancelled_appointment_frees_slot() {
        let app = app("2026-10-18 12:00").await;
        let id = seed_craftsman(&app).await;
        let appointment_id = book(&app, id, "2026-10-19T10:00").await;

        let cancel = format!("/api/appointments/{}/cancel", appointment_id);
        let (status, _) = call(&app, "POST", &cancel, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&app, "POST", &cancel, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = call(&app, "POST", "/api/appointments/999/cancel", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let uri = format!("/api/craftsmen/{}/availability?date=2026-10-19&time=10:00", id);
        let (_, body) = call(&app, "GET", &uri, None).await;
        assert_eq!(body["data"]["available"], true);
    }

    #[tokio::test]
    async fn test_working_hours_update_and_validation() {
        let app = app("2026-10-18 12:00").await;
        let id = seed_craftsman(&app).await;
        let uri = format!("/api/craftsmen/{}/working-hours", id);

        let (status, _) = call(
            &app,
            "PUT",
            &uri,
            Some(json!({ "working_hours": { "wednesday": ["9-17"] } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(
            &app,
            "PUT",
            &uri,
            Some(json!({ "working_hours": { "wednesday": ["7:30-12:00"] } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["working_hours"]["wednesday"][0], "7:30-12:00");

        let (status, _) = call(
            &app,
            "PUT",
            "/api/craftsmen/999/working-hours",
            Some(json!({ "working_hours": {} })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_appointments_for_day() {
        let app = app("2026-10-18 12:00").await;
        let id = seed_craftsman(&app).await;
        book(&app, id, "2026-10-19T14:00").await;
        book(&app, id, "2026-10-19T09:00").await;
        book(&app, id, "2026-10-20T09:00").await;

        let uri = format!("/api/craftsmen/{}/appointments?date=2026-10-19", id);
        let (status, body) = call(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let list = body["data"].as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["scheduled_at"], "2026-10-19T09:00:00");
    }

    #[tokio::test]
    async fn test_create_appointment_validation() {
        let app = app("2026-10-18 12:00").await;
        let id = seed_craftsman(&app).await;
        let (status, _) = call(
            &app,
            "POST",
            "/api/appointments",
            Some(json!({ "craftsman_id": id, "scheduled_at": "2026-10-19T10:00", "duration_minutes": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &app,
            "POST",
            "/api/appointments",
            Some(json!({ "craftsman_id": 999, "scheduled_at": "2026-10-19T10:00" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
