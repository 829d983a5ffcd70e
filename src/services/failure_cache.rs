use std::sync::Arc;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::external::price_provider::PriceProviderError;

/// Information about a failed live-price lookup for a ticker
#[derive(Debug, Clone)]
pub struct FailureInfo {
    pub failed_at: DateTime<Utc>,
    pub error_type: FailureType,
    pub reason: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FailureType {
    NotFound,       // Ticker has no recent data at the provider
    RateLimited,    // Temporary rate limit
    ApiError,       // Network, timeout, malformed response
}

impl From<&PriceProviderError> for FailureType {
    fn from(value: &PriceProviderError) -> Self {
        match value {
            PriceProviderError::NotFound => FailureType::NotFound,
            PriceProviderError::RateLimited => FailureType::RateLimited,
            _ => FailureType::ApiError,
        }
    }
}

/// Thread-safe cache of recent provider failures, so a flaky provider is not
/// queried on every page load.
#[derive(Clone, Default)]
pub struct FailureCache {
    cache: Arc<DashMap<String, FailureInfo>>,
}

impl FailureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a ticker is in the failure cache and the failure is still valid
    pub fn is_failed(&self, ticker: &str) -> Option<FailureInfo> {
        self.is_failed_at(ticker, Utc::now())
    }

    fn is_failed_at(&self, ticker: &str, now: DateTime<Utc>) -> Option<FailureInfo> {
        if let Some(entry) = self.cache.get(ticker) {
            let info = entry.value().clone();
            let expiry = info.failed_at + Duration::minutes(info.ttl_minutes);

            if now < expiry {
                return Some(info);
            }
            drop(entry); // Release the read lock
            self.cache.remove(ticker);
        }
        None
    }

    pub fn record_failure(&self, ticker: &str, error: &PriceProviderError) {
        let error_type = FailureType::from(error);
        let ttl_minutes = match error_type {
            FailureType::NotFound => 60,
            FailureType::RateLimited => 15,
            FailureType::ApiError => 2,
        };

        let info = FailureInfo {
            failed_at: Utc::now(),
            error_type,
            reason: error.to_string(),
            ttl_minutes,
        };

        self.cache.insert(ticker.to_string(), info);
    }

    /// Clear a ticker from the failure cache (e.g., after successful fetch)
    pub fn clear(&self, ticker: &str) {
        self.cache.remove(ticker);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
