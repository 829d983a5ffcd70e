use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::LiveQuote;
use crate::services::failure_cache::FailureCache;

/// Best-effort reference price. Never returns an error: failures become a
/// displayable message and are cached briefly.
#[derive(Clone)]
pub struct LivePriceService {
    provider: Arc<dyn PriceProvider>,
    ticker: String,
    currency_symbol: String,
    timeout: Duration,
    failure_cache: FailureCache,
}

impl LivePriceService {
    pub fn new(
        provider: Arc<dyn PriceProvider>,
        ticker: impl Into<String>,
        currency_symbol: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            ticker: ticker.into(),
            currency_symbol: currency_symbol.into(),
            timeout,
            failure_cache: FailureCache::new(),
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub async fn quote(&self) -> LiveQuote {
        if let Some(failure) = self.failure_cache.is_failed(&self.ticker) {
            return self.unavailable(&failure.reason);
        }

        let fetched = tokio::time::timeout(self.timeout, self.provider.fetch_latest_close(&self.ticker))
            .await
            .unwrap_or_else(|_| Err(PriceProviderError::Timeout(self.timeout)));

        match fetched {
            Ok(point) => {
                self.failure_cache.clear(&self.ticker);
                info!("Live price for {}: {:.2} ({})", self.ticker, point.close, point.date);
                LiveQuote {
                    ticker: self.ticker.clone(),
                    price: Some(point.close),
                    as_of: Some(point.date),
                    message: format!(
                        "Current Gold ETF Price ({}): {}{:.2}",
                        self.ticker, self.currency_symbol, point.close
                    ),
                }
            }
            Err(e) => {
                warn!("Live price for {} unavailable: {}", self.ticker, e);
                self.failure_cache.record_failure(&self.ticker, &e);
                self.unavailable(&e.to_string())
            }
        }
    }

    fn unavailable(&self, reason: &str) -> LiveQuote {
        LiveQuote {
            ticker: self.ticker.clone(),
            price: None,
            as_of: None,
            message: format!("Unable to fetch real-time price: {}", reason),
        }
    }
}
