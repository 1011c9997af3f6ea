pub mod config;
pub mod conflict;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod overlay;
pub mod state;
pub mod store;
pub mod view;

use axum::{
    Router,
    routing::{delete, get, post},
};
use state::AppState;
use tower_http::trace::TraceLayer;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/schedules", get(handlers::list_schedules))
        .route("/api/schedules/summary", get(handlers::schedule_summary))
        .route("/api/schedules/{id}", get(handlers::get_schedule))
        .route("/api/schedules/{id}/status", post(handlers::update_status))
        .route(
            "/api/schedules/{id}/acceptance",
            post(handlers::decide_acceptance),
        )
        .route(
            "/api/schedules/{id}/conflicts",
            get(handlers::get_conflicts).post(handlers::check_conflicts),
        )
        .route("/api/photographers", get(handlers::list_photographers))
        .route(
            "/api/photographers/{id}/schedule",
            get(handlers::photographer_schedule),
        )
        .route("/api/overlay", delete(handlers::clear_overlay))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
