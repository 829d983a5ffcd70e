use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Days past the last historical close that can be predicted.
pub const PREDICTION_HORIZON_DAYS: i64 = 365;

/// Inclusive range of dates a prediction may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PredictionWindow {
    pub fn from_max_historical_date(max_historical_date: NaiveDate) -> Self {
        Self {
            start: max_historical_date,
            end: max_historical_date + Duration::days(PREDICTION_HORIZON_DAYS),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A validated user request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub target_date: NaiveDate,
    pub grams: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub date: NaiveDate,
    pub grams: f64,
    pub price_per_gram: f64,
    pub total_price: f64,
    /// Forecast row used as a proxy for `date`
    pub forecast_date: NaiveDate,
    pub forecast_distance_days: i64,
}

impl PredictionResult {
    pub fn summary(&self, currency: &str) -> String {
        format!(
            "Predicted Price per Gram for {}: {currency}{:.2}\n\n\
             Total Price for {} grams: {currency}{:.2}\n\n\
             Note: The difference between predicted price and actual price is usually between 600 to 800 INR.",
            self.date.format("%Y-%m-%d"),
            self.price_per_gram,
            self.grams,
            self.total_price,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_window_spans_one_year_inclusive() {
        let window = PredictionWindow::from_max_historical_date(date("2025-05-21"));
        assert_eq!(window.end, date("2026-05-21"));
        assert!(window.contains(date("2025-05-21")));
        assert!(window.contains(date("2026-05-21")));
        assert!(!window.contains(date("2025-05-20")));
        assert!(!window.contains(date("2026-05-22")));
    }

    #[test]
    fn test_summary_formats_two_decimals() {
        let result = PredictionResult {
            date: date("2025-05-23"),
            grams: 10.0,
            price_per_gram: 9600.0,
            total_price: 96000.0,
            forecast_date: date("2025-05-23"),
            forecast_distance_days: 0,
        };
        let message = result.summary("Rs.");
        assert!(message.starts_with("Predicted Price per Gram for 2025-05-23: Rs.9600.00"));
        assert!(message.contains("Total Price for 10 grams: Rs.96000.00"));
    }
}
