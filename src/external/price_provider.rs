use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct ExternalPricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

#[derive(Debug, Error)]
pub enum PriceProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("no data available")]
    NotFound,

    #[error("rate limited")]
    RateLimited,

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Most recent daily close for `ticker`.
    async fn fetch_latest_close(
        &self,
        ticker: &str,
    ) -> Result<ExternalPricePoint, PriceProviderError>;
}
