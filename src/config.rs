use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub forecast_csv_path: PathBuf,
    pub historical_csv_path: PathBuf,
    pub scaler_path: PathBuf,
    pub model_path: PathBuf,
    pub live_price_ticker: String,
    pub live_price_timeout: Duration,
    pub currency_symbol: String,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Self {
            forecast_csv_path: var("FORECAST_CSV_PATH", "data/forecast_df.csv").into(),
            historical_csv_path: var("HISTORICAL_CSV_PATH", "data/gold_price_in_inr.csv").into(),
            scaler_path: var("SCALER_PATH", "artifacts/scaler.json").into(),
            model_path: var("MODEL_PATH", "artifacts/gold_price_model.json").into(),
            live_price_ticker: var("LIVE_PRICE_TICKER", "IVZINGOLD.BO"),
            live_price_timeout: Duration::from_secs(
                lookup("LIVE_PRICE_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),
            currency_symbol: var("CURRENCY_SYMBOL", "Rs."),
            bind_addr: var("BIND_ADDR", "0.0.0.0:3000"),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.live_price_ticker.trim().is_empty() {
            return Err("LIVE_PRICE_TICKER must not be empty".to_string());
        }
        if self.live_price_timeout.is_zero() {
            return Err("LIVE_PRICE_TIMEOUT_SECS must be at least 1".to_string());
        }
        self.socket_addr().map(|_| ())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        self.bind_addr
            .parse()
            .map_err(|e| format!("BIND_ADDR {:?} is not a socket address: {}", self.bind_addr, e))
    }
}
