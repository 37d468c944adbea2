//! LifeFlow REST API Server
//!
//! HTTP/JSON API for tracking habits and reading their streaks.
//!
//! Everything under the API prefix requires a bearer token. `/health`,
//! `/swagger-ui` and `/api-docs/openapi.json` are open.

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use lifeflow_store::{HabitStore, TimeoutStore};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod jwt;
pub mod models;
pub mod services;
pub mod shutdown;

pub use auth::AuthUser;
pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult};
pub use jwt::{JwtLayer, JwtService};

use services::{HabitAggregator, LogIngestion};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Store with every call bounded by `config.store_timeout`
    pub store: Arc<dyn HabitStore>,
    pub aggregator: HabitAggregator,
    pub ingestion: LogIngestion,
    pub jwt: Arc<JwtService>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn HabitStore>, config: ApiConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let store: Arc<dyn HabitStore> = Arc::new(TimeoutStore::new(store, config.store_timeout));
        let jwt = Arc::new(JwtService::new(config.jwt_config()?));

        Ok(Self {
            aggregator: HabitAggregator::new(store.clone(), config.stats_lookback_days),
            ingestion: LogIngestion::new(store.clone()),
            store,
            jwt,
            config: Arc::new(config),
        })
    }

    /// The caller's UTC offset: `minutes` when supplied, otherwise the
    /// configured default.
    pub fn utc_offset(&self, minutes: Option<i32>) -> ApiResult<FixedOffset> {
        match minutes {
            Some(m) => m
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .ok_or_else(|| {
                    ApiError::InvalidInput(format!("utcOffsetMinutes is out of range: {}", m))
                }),
            None => Ok(self.config.utc_offset().unwrap_or_else(|| Utc.fix())),
        }
    }

    /// The calendar day requests are evaluated against: `as_of` when the
    /// caller supplied one, otherwise the current day in `offset`.
    pub fn today(&self, as_of: Option<NaiveDate>, offset: FixedOffset) -> NaiveDate {
        as_of.unwrap_or_else(|| Utc::now().with_timezone(&offset).date_naive())
    }
}

/// Create the API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    // Authenticated routes; route_layer keeps unknown paths on the 404 fallback
    let api_routes = Router::new()
        .route(
            "/habits",
            get(handlers::habits::list_habits).post(handlers::habits::create_habit),
        )
        .route(
            "/habits/:id",
            get(handlers::habits::get_habit)
                .put(handlers::habits::update_habit)
                .delete(handlers::habits::delete_habit),
        )
        .route("/habits/:id/log", post(handlers::habits::log_habit))
        .route("/habits/:id/logs", get(handlers::habits::list_logs))
        .route("/analytics/dashboard", get(handlers::analytics::dashboard))
        .route_layer(JwtLayer::new(state.jwt.clone()));

    // OpenAPI documentation
    let swagger = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi());

    let cors = cors_layer(&state.config.cors_origin);

    Router::new()
        .nest(&state.config.api_prefix, api_routes)
        .merge(swagger)
        .route("/health", get(handlers::health::health_check))
        .fallback(handlers::health::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }

    match origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            tracing::warn!(origin, "unusable CORS origin, cross-origin requests disabled");
            CorsLayer::new()
        }
    }
}

/// OpenAPI specification
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::habits::list_habits,
        handlers::habits::create_habit,
        handlers::habits::get_habit,
        handlers::habits::update_habit,
        handlers::habits::delete_habit,
        handlers::habits::log_habit,
        handlers::habits::list_logs,
        handlers::analytics::dashboard,
        handlers::health::health_check,
    ),
    components(schemas(
        models::CreateHabitRequest,
        models::UpdateHabitRequest,
        models::HabitResponse,
        models::HabitWithStats,
        models::DeleteHabitResponse,
        models::LogHabitRequest,
        models::HabitLogResponse,
        models::DashboardResponse,
        models::TodayStats,
        models::WeekStats,
        models::BestStreak,
        models::HealthResponse,
        error::ErrorResponse,
    )),
    tags(
        (name = "habits", description = "Habit management and daily logs"),
        (name = "analytics", description = "Progress across all habits"),
        (name = "health", description = "Health checks"),
    ),
    info(
        title = "LifeFlow API",
        version = "0.1.0",
        description = "REST API for LifeFlow - habit tracking with streaks"
    )
)]
pub struct ApiDoc;
