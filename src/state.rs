use std::sync::Arc;

use crate::services::live_price_service::LivePriceService;
use crate::services::prediction_service::PredictionPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PredictionPipeline>,
    pub live_prices: LivePriceService,
    pub currency_symbol: String,
}
