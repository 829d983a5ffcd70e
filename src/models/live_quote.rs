use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Best-effort reference price shown next to predictions.
///
/// `price` is `None` whenever the provider could not be reached; `message`
/// is always ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveQuote {
    pub ticker: String,
    pub price: Option<f64>,
    pub as_of: Option<NaiveDate>,
    pub message: String,
}
