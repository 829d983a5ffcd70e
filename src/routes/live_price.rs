use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::models::LiveQuote;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_live_price))
}

/// Always 200: an unavailable provider is reported inside the quote.
pub async fn get_live_price(State(state): State<AppState>) -> Json<LiveQuote> {
    info!("GET /api/live-price - Fetching {}", state.live_prices.ticker());
    Json(state.live_prices.quote().await)
}
