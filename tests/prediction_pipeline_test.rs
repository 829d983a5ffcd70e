//! Prediction pipeline tests
//!
//! End-to-end checks from CSV + JSON artifacts through to a priced result:
//! - calendar decomposition across the whole prediction window
//! - window bounds derived from the historical data
//! - nearest-date lookup on exact forecast dates
//! - determinism, scaling, and grams validation

use chrono::{Datelike, Duration, NaiveDate};
use std::sync::Arc;

use goldcast_backend::models::Feature;
use goldcast_backend::services::feature_builder::build_features;
use goldcast_backend::services::forecast_index::ForecastIndex;
use goldcast_backend::services::historical_service::HistoricalSeries;
use goldcast_backend::services::prediction_service::{
    ModelArtifacts, PipelineError, PredictionPipeline,
};
use goldcast_backend::services::price_model::{model_from_json, PriceModel};
use goldcast_backend::services::scaler::StandardScaler;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const HISTORICAL_CSV: &str = "Date,Close\n\
                              19-05-2025,\"9,410.00\"\n\
                              20-05-2025,\"9,455.50\"\n\
                              21-05-2025,\"9,480.25\"\n";

const IDENTITY_SCALER: &str = r#"{
    "feature_names": ["Open","High","Low","Volume","Year","Month","Day","DayOfWeek","Close_Lag1","MA7"],
    "mean":  [0,0,0,0,0,0,0,0,0,0],
    "scale": [1,1,1,1,1,1,1,1,1,1]
}"#;

// Returns the High slot, i.e. the forecast Close.
const CLOSE_PROXY_MODEL: &str = r#"{
    "model_type": "linear_regression",
    "coefficients": [0,1,0,0,0,0,0,0,0,0],
    "intercept": 0.0
}"#;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Daily forecast rows from 2025-05-22 for `days` days, with 2025-05-23 pinned
/// to known values.
fn forecast_csv(days: i64) -> String {
    let start = date("2025-05-22");
    let mut csv = String::from("ds,Open,Close,Volume,Close_Lag1,MA7\n");
    for i in 0..days {
        let d = start + Duration::days(i);
        let line = if d == date("2025-05-23") {
            format!("{} 00:00:00,9500,9600,1000,9550,9575\n", d)
        } else {
            let close = 9400.0 + i as f64 * 2.0;
            format!(
                "{} 00:00:00,{},{},{},{},{}\n",
                d,
                close - 40.0,
                close,
                900 + i,
                close - 2.0,
                close - 6.0
            )
        };
        csv.push_str(&line);
    }
    csv
}

fn historical() -> HistoricalSeries {
    HistoricalSeries::from_reader(HISTORICAL_CSV.as_bytes()).unwrap()
}

fn forecast() -> ForecastIndex {
    ForecastIndex::from_reader(forecast_csv(370).as_bytes()).unwrap()
}

fn identity_pipeline() -> PredictionPipeline {
    let scaler = StandardScaler::from_json(IDENTITY_SCALER).unwrap();
    let model: Arc<dyn PriceModel> = Arc::from(model_from_json(CLOSE_PROXY_MODEL).unwrap());
    let artifacts = ModelArtifacts::new(scaler, model).unwrap();
    PredictionPipeline::new(forecast(), historical().max_date(), Some(artifacts))
}

// ---------------------------------------------------------------------------
// Feature construction
// ---------------------------------------------------------------------------

#[test]
fn test_every_window_date_builds_matching_calendar_features() {
    let history = historical();
    let index = forecast();
    let window = history.prediction_window();

    let mut d = window.start;
    while d <= window.end {
        let built = build_features(d, &index, history.max_date())
            .unwrap_or_else(|e| panic!("{} should be predictable: {}", d, e));
        let f = built.features;
        assert_eq!(f.get(Feature::Year), d.year() as f64);
        assert_eq!(f.get(Feature::Month), d.month() as f64);
        assert_eq!(f.get(Feature::Day), d.day() as f64);
        assert_eq!(f.get(Feature::DayOfWeek), d.weekday().num_days_from_monday() as f64);
        assert_eq!(f.get(Feature::High), f.get(Feature::Low));
        assert_eq!(f.get(Feature::High), built.source.record.close);
        d += Duration::days(1);
    }
}

#[test]
fn test_exact_forecast_dates_are_their_own_nearest() {
    let index = forecast();
    for record in index.records().iter().step_by(17) {
        let hit = index.nearest(record.date);
        assert_eq!(hit.distance_days, 0);
        assert_eq!(hit.record, record);
    }
}

// ---------------------------------------------------------------------------
// Window bounds
// ---------------------------------------------------------------------------

#[test]
fn test_window_comes_from_historical_data() {
    let pipeline = identity_pipeline();
    assert_eq!(pipeline.window().start, date("2025-05-21"));
    assert_eq!(pipeline.window().end, date("2026-05-21"));
}

#[test]
fn test_dates_outside_window_are_out_of_range() {
    let pipeline = identity_pipeline();
    for outside in ["2025-05-20", "2024-01-01", "2026-05-22", "2030-12-31"] {
        let err = pipeline.predict_price(outside, 10.0).unwrap_err();
        assert!(
            matches!(err, PipelineError::OutOfRangeDate { .. }),
            "{} gave {:?}",
            outside,
            err
        );
        assert!(err.to_string().contains("2025-05-21"));
        assert!(err.to_string().contains("2026-05-21"));
    }
}

#[test]
fn test_window_edges_are_inclusive() {
    let pipeline = identity_pipeline();
    assert!(pipeline.predict_price("2025-05-21", 1.0).is_ok());
    assert!(pipeline.predict_price("2026-05-21", 1.0).is_ok());
}

// ---------------------------------------------------------------------------
// Scaling + prediction
// ---------------------------------------------------------------------------

#[test]
fn test_identity_pipeline_end_to_end() {
    let result = identity_pipeline().predict_price("2025-05-23", 10.0).unwrap();

    assert_eq!(result.price_per_gram, 9600.0);
    assert_eq!(result.total_price, result.price_per_gram * 10.0);
    assert_eq!(result.forecast_date, date("2025-05-23"));
    assert_eq!(result.forecast_distance_days, 0);
}

#[test]
fn test_prediction_is_deterministic() {
    let pipeline = identity_pipeline();
    let first = pipeline.predict_from_input("2025-09-14", "12.5").unwrap();
    for _ in 0..10 {
        assert_eq!(pipeline.predict_from_input("2025-09-14", "12.5").unwrap(), first);
    }
}

#[test]
fn test_fitted_scaler_feeds_model_standardised_values() {
    // Model returns the standardised Open slot; with mean 9000 / scale 250 the
    // pinned Open of 9500 must come out as exactly 2.0.
    let scaler = StandardScaler::new(
        vec![9000.0, 9100.0, 9100.0, 950.0, 2025.0, 6.0, 15.0, 3.0, 9100.0, 9100.0],
        vec![250.0, 300.0, 300.0, 100.0, 0.5, 3.5, 8.8, 2.0, 300.0, 300.0],
    )
    .unwrap();
    let model: Arc<dyn PriceModel> = Arc::from(
        model_from_json(
            r#"{"model_type":"linear_regression","coefficients":[1,0,0,0,0,0,0,0,0,0],"intercept":0}"#,
        )
        .unwrap(),
    );
    let pipeline = PredictionPipeline::new(
        forecast(),
        historical().max_date(),
        Some(ModelArtifacts::new(scaler, model).unwrap()),
    );

    let result = pipeline.predict_price("2025-05-23", 1.0).unwrap();
    assert!((result.price_per_gram - 2.0).abs() < 1e-12);
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

#[test]
fn test_non_positive_grams_are_rejected() {
    let pipeline = identity_pipeline();
    for grams in ["-5", "0", "abc", ""] {
        assert!(matches!(
            pipeline.predict_from_input("2025-05-23", grams),
            Err(PipelineError::InvalidGrams { .. })
        ));
    }
    assert!(matches!(
        pipeline.predict_price("2025-05-23", -5.0),
        Err(PipelineError::InvalidGrams { .. })
    ));
}

#[test]
fn test_malformed_dates_are_invalid_format() {
    let pipeline = identity_pipeline();
    for bad in ["23-05-2025", "2025/05/23", "tomorrow", ""] {
        assert!(matches!(
            pipeline.predict_price(bad, 1.0),
            Err(PipelineError::InvalidDateFormat { .. })
        ));
    }
}

#[test]
fn test_without_artifacts_predictions_are_unavailable() {
    let pipeline = PredictionPipeline::new(forecast(), historical().max_date(), None);
    assert!(matches!(
        pipeline.predict_price("2025-05-23", 1.0),
        Err(PipelineError::ModelUnavailable(_))
    ));
}
