use axum::{Json, Router, response::IntoResponse, routing::get, routing::post};
use serde_json::json;

use crate::{AppState, bookings, users};

/// Every Berth route, with state attached. Cross-cutting layers (tracing,
/// CORS) are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/user", post(users::create_user))
        .route(
            "/api/user/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/api/booking",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route(
            "/api/booking/{id}",
            get(bookings::get_booking)
                .put(bookings::update_booking)
                .delete(bookings::delete_booking),
        )
        .route("/health", get(health))
        .with_state(state)
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
