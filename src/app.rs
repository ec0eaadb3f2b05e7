use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/chart", get(handlers::get_chart))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/nutrition", post(handlers::update_nutrition))
        .with_state(state)
}
