use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use goldcast_backend::app;
use goldcast_backend::config::AppConfig;
use goldcast_backend::external::price_provider::PriceProvider;
use goldcast_backend::external::yahoofinance::YahooFinanceProvider;
use goldcast_backend::logging::{init_logging, LoggingConfig};
use goldcast_backend::services::forecast_index::ForecastIndex;
use goldcast_backend::services::historical_service::HistoricalSeries;
use goldcast_backend::services::live_price_service::LivePriceService;
use goldcast_backend::services::prediction_service::{ModelArtifacts, PredictionPipeline};
use goldcast_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())?;

    let config = AppConfig::from_env();
    config.validate()?;

    let historical = HistoricalSeries::from_path(&config.historical_csv_path)?;
    let forecast = ForecastIndex::from_path(&config.forecast_csv_path)?;

    let window = historical.prediction_window();
    if !forecast.covers(&window) {
        tracing::warn!(
            "Forecast table ends {} but predictions are accepted until {}; later dates use the last row",
            forecast.last_date(),
            window.end
        );
    }

    // Predictions answer ModelUnavailable until artifacts are fixed; the rest of the API keeps serving.
    let artifacts = match ModelArtifacts::load(&config.scaler_path, &config.model_path) {
        Ok(artifacts) => Some(artifacts),
        Err(e) => {
            tracing::error!("❌ Model artifacts unavailable: {:#}", e);
            None
        }
    };

    let pipeline = PredictionPipeline::new(forecast, historical.max_date(), artifacts);

    let provider: Arc<dyn PriceProvider> = Arc::new(YahooFinanceProvider::new(config.live_price_timeout));
    let live_prices = LivePriceService::new(
        provider,
        config.live_price_ticker.clone(),
        config.currency_symbol.clone(),
        config.live_price_timeout,
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
        live_prices,
        currency_symbol: config.currency_symbol.clone(),
    };
    let app = app::create_app(state);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(
        "🚀 Goldcast backend running at http://{}/ (predictions {} to {})",
        addr,
        window.start,
        window.end
    );
    axum::serve(listener, app).await?;

    Ok(())
}
