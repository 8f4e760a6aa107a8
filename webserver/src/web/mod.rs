//! HTTP routing

pub mod handlers;

use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/tests/") }))
        .route("/health", get(handlers::health))
        .route("/tests", get(handlers::list_root).post(handlers::run_root))
        .route("/tests/", get(handlers::list_root).post(handlers::run_root))
        .route("/tests/*path", get(handlers::list_tests).post(handlers::run_tests))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
