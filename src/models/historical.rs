use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// One observed closing price. The latest date bounds the predictable horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub date: NaiveDate,
    pub close: f64,
}
