mod features;
mod forecast;
mod historical;
mod live_quote;
mod prediction;

pub use features::{Feature, FeatureVector, FEATURE_COUNT};
pub use forecast::{ForecastRecord, NearestForecast};
pub use historical::HistoricalRecord;
pub use live_quote::LiveQuote;
pub use prediction::{
    PredictionRequest, PredictionResult, PredictionWindow, PREDICTION_HORIZON_DAYS,
};
