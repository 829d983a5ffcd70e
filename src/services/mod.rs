pub mod csv_fields;
pub mod failure_cache;
pub mod feature_builder;
pub mod forecast_index;
pub mod historical_service;
pub mod live_price_service;
pub mod prediction_service;
pub mod price_model;
pub mod scaler;
