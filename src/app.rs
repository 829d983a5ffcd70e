use axum::Router;
use tower_http::cors::CorsLayer;

use crate::routes::{health, live_price, predictions};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/predictions", predictions::router())
        .nest("/api/live-price", live_price::router())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
