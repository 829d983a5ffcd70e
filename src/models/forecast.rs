use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Pre-computed auxiliary values for one future date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub volume: f64,
    /// Prior-day closing value
    pub close_lag1: f64,
    /// 7-period moving average of the closing value
    pub ma7: f64,
}

/// Result of a nearest-date lookup against the forecast table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestForecast<'a> {
    pub record: &'a ForecastRecord,
    pub distance_days: i64,
}
