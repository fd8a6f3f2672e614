//! API handlers for the equipment status REST endpoints

pub mod equipment;
pub mod health;
pub mod openapi;

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::{header, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, AppState};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// JSON body with two-space indentation and non-ASCII text left as is
pub struct PrettyJson<T>(pub T);

impl<T: Serialize> IntoResponse for PrettyJson<T> {
    fn into_response(self) -> Response {
        match serde_json::to_string_pretty(&self.0) {
            Ok(body) => (
                [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
                body,
            )
                .into_response(),
            Err(e) => AppError::Internal(format!("Failed to serialize response: {}", e)).into_response(),
        }
    }
}

/// `Query` whose rejection is rendered as the JSON error envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// `Path` whose rejection is rendered as the JSON error envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// `Json` whose rejection is rendered as the JSON error envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Equipment status
        .route(
            "/equipment-status",
            get(equipment::get_equipment_status)
                .options(equipment::preflight)
                .fallback(equipment::method_not_allowed),
        )
        .route("/equipment-status/maintenance", get(equipment::get_maintenance_due))
        .route("/equipment-types", get(equipment::list_equipment_types))
        .route("/locations", get(equipment::list_locations))
        // Writes (document store only)
        .route("/equipment", post(equipment::create_equipment))
        .route("/equipment/:id/status", put(equipment::update_equipment_status))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
