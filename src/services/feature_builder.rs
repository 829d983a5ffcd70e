use chrono::{Datelike, NaiveDate};

use crate::models::{Feature, FeatureVector, NearestForecast, PredictionWindow};
use crate::services::forecast_index::ForecastIndex;
use crate::services::prediction_service::PipelineError;

/// Raw model input for `target_date` plus the forecast row it was taken from.
#[derive(Debug, Clone, Copy)]
pub struct BuiltFeatures<'a> {
    pub features: FeatureVector,
    pub source: NearestForecast<'a>,
}

/// Build the model input for `target_date`.
///
/// Market-derived slots come from the nearest forecast row; calendar slots come
/// from `target_date` itself. High and Low both carry the forecast Close because
/// the table has no separate high/low forecast and the model was trained that way.
pub fn build_features<'a>(
    target_date: NaiveDate,
    forecast: &'a ForecastIndex,
    max_historical_date: NaiveDate,
) -> Result<BuiltFeatures<'a>, PipelineError> {
    let window = PredictionWindow::from_max_historical_date(max_historical_date);
    if !window.contains(target_date) {
        return Err(PipelineError::OutOfRangeDate {
            date: target_date,
            start: window.start,
            end: window.end,
        });
    }

    let source = forecast.nearest(target_date);
    let row = source.record;

    let features = FeatureVector::from_fn(|feature| match feature {
        Feature::Open => row.open,
        Feature::High | Feature::Low => row.close,
        Feature::Volume => row.volume,
        Feature::Year => target_date.year() as f64,
        Feature::Month => target_date.month() as f64,
        Feature::Day => target_date.day() as f64,
        Feature::DayOfWeek => target_date.weekday().num_days_from_monday() as f64,
        Feature::CloseLag1 => row.close_lag1,
        Feature::Ma7 => row.ma7,
    });

    Ok(BuiltFeatures { features, source })
}
