use anyhow::Context;
use chrono::NaiveDate;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::models::{FeatureVector, PredictionRequest, PredictionResult, PredictionWindow};
use crate::services::feature_builder::build_features;
use crate::services::forecast_index::ForecastIndex;
use crate::services::price_model::{model_from_path, ModelError, PriceModel};
use crate::services::scaler::{ScalerError, StandardScaler};

pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PipelineError {
    #[error("Invalid date '{input}': expected format YYYY-MM-DD (e.g., 2025-05-23).")]
    InvalidDateFormat { input: String },

    #[error("Date must be between {start} and {end}.")]
    OutOfRangeDate {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Grams must be a positive number small enough to price (got '{input}').")]
    InvalidGrams { input: String },

    #[error("Prediction failed: {0}")]
    FeatureShapeMismatch(String),

    #[error("Prediction failed: model unavailable: {0}")]
    ModelUnavailable(String),
}

impl PipelineError {
    /// Whether the caller can fix this by changing their input.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            PipelineError::InvalidDateFormat { .. }
                | PipelineError::OutOfRangeDate { .. }
                | PipelineError::InvalidGrams { .. }
        )
    }
}

impl From<ScalerError> for PipelineError {
    fn from(value: ScalerError) -> Self {
        PipelineError::FeatureShapeMismatch(value.to_string())
    }
}

impl From<ModelError> for PipelineError {
    fn from(value: ModelError) -> Self {
        match value {
            ModelError::ShapeMismatch { .. } => PipelineError::FeatureShapeMismatch(value.to_string()),
            ModelError::NonFinite | ModelError::InvalidArtifact(_) => {
                PipelineError::ModelUnavailable(value.to_string())
            }
        }
    }
}

pub fn parse_target_date(input: &str) -> Result<NaiveDate, PipelineError> {
    NaiveDate::parse_from_str(input.trim(), DATE_INPUT_FORMAT).map_err(|_| {
        PipelineError::InvalidDateFormat {
            input: input.to_string(),
        }
    })
}

pub fn parse_grams(input: &str) -> Result<f64, PipelineError> {
    let invalid = || PipelineError::InvalidGrams {
        input: input.to_string(),
    };
    let grams = input.trim().parse::<f64>().map_err(|_| invalid())?;
    validate_grams(grams).map_err(|_| invalid())
}

fn validate_grams(grams: f64) -> Result<f64, PipelineError> {
    if grams.is_finite() && grams > 0.0 {
        Ok(grams)
    } else {
        Err(PipelineError::InvalidGrams {
            input: grams.to_string(),
        })
    }
}

/// Pick the date string to predict for: typed text wins over the picker.
/// Neither value is parsed here, so a malformed one still reaches
/// [`parse_target_date`].
pub fn resolve_date_input<'a>(manual: Option<&'a str>, picker: Option<&'a str>) -> Option<&'a str> {
    let non_blank = |s: Option<&'a str>| s.map(str::trim).filter(|s| !s.is_empty());
    non_blank(manual).or_else(|| non_blank(picker))
}

/// Fitted scaler and trained model, loaded together.
#[derive(Clone)]
pub struct ModelArtifacts {
    scaler: StandardScaler,
    model: Arc<dyn PriceModel>,
}

impl ModelArtifacts {
    pub fn new(scaler: StandardScaler, model: Arc<dyn PriceModel>) -> Result<Self, PipelineError> {
        if scaler.n_features() != model.n_features() {
            return Err(PipelineError::FeatureShapeMismatch(format!(
                "scaler produces {} features but model '{}' expects {}",
                scaler.n_features(),
                model.name(),
                model.n_features()
            )));
        }
        Ok(Self { scaler, model })
    }

    pub fn load(scaler_path: &Path, model_path: &Path) -> anyhow::Result<Self> {
        let scaler = StandardScaler::from_path(scaler_path)?;
        let model: Arc<dyn PriceModel> = Arc::from(model_from_path(model_path)?);
        info!(
            "Loaded scaler ({} features) and {} model",
            scaler.n_features(),
            model.name()
        );
        Self::new(scaler, model).context("Scaler and model artifacts are incompatible")
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }
}

/// Date → features → scaled features → price, against immutable start-up data.
pub struct PredictionPipeline {
    forecast: ForecastIndex,
    window: PredictionWindow,
    artifacts: Option<ModelArtifacts>,
}

impl PredictionPipeline {
    pub fn new(
        forecast: ForecastIndex,
        max_historical_date: NaiveDate,
        artifacts: Option<ModelArtifacts>,
    ) -> Self {
        Self {
            forecast,
            window: PredictionWindow::from_max_historical_date(max_historical_date),
            artifacts,
        }
    }

    pub fn window(&self) -> PredictionWindow {
        self.window
    }

    pub fn forecast(&self) -> &ForecastIndex {
        &self.forecast
    }

    pub fn is_ready(&self) -> bool {
        self.artifacts.is_some()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.artifacts.as_ref().map(ModelArtifacts::model_name)
    }

    /// Scale `features` and run the model.
    pub fn predict(&self, features: &FeatureVector) -> Result<f64, PipelineError> {
        let artifacts = self.artifacts.as_ref().ok_or_else(|| {
            PipelineError::ModelUnavailable("scaler/model artifacts are not loaded".to_string())
        })?;
        let scaled = artifacts.scaler.transform(features)?;
        Ok(artifacts.model.predict(scaled.view())?)
    }

    pub fn predict_request(
        &self,
        request: PredictionRequest,
    ) -> Result<PredictionResult, PipelineError> {
        let grams = validate_grams(request.grams)?;
        let built = build_features(request.target_date, &self.forecast, self.window.start)?;
        let price_per_gram = self.predict(&built.features)?;

        let total_price = price_per_gram * grams;
        if !total_price.is_finite() {
            return Err(PipelineError::InvalidGrams {
                input: grams.to_string(),
            });
        }

        Ok(PredictionResult {
            date: request.target_date,
            grams,
            price_per_gram,
            total_price,
            forecast_date: built.source.record.date,
            forecast_distance_days: built.source.distance_days,
        })
    }

    pub fn predict_price(
        &self,
        date_str: &str,
        grams: f64,
    ) -> Result<PredictionResult, PipelineError> {
        let outcome = self.validate(date_str, || validate_grams(grams)).and_then(|request| {
            self.predict_request(request)
        });
        log_outcome(date_str, &outcome);
        outcome
    }

    /// Like [`predict_price`](Self::predict_price), with grams as typed by the user.
    pub fn predict_from_input(
        &self,
        date_str: &str,
        grams: &str,
    ) -> Result<PredictionResult, PipelineError> {
        let outcome = self.validate(date_str, || parse_grams(grams)).and_then(|request| {
            self.predict_request(request)
        });
        log_outcome(date_str, &outcome);
        outcome
    }

    // Date format, then window, then grams; the model is never reached on bad input.
    fn validate(
        &self,
        date_str: &str,
        grams: impl FnOnce() -> Result<f64, PipelineError>,
    ) -> Result<PredictionRequest, PipelineError> {
        let target_date = parse_target_date(date_str)?;
        if !self.window.contains(target_date) {
            return Err(PipelineError::OutOfRangeDate {
                date: target_date,
                start: self.window.start,
                end: self.window.end,
            });
        }
        Ok(PredictionRequest {
            target_date,
            grams: grams()?,
        })
    }
}

fn log_outcome(date_str: &str, outcome: &Result<PredictionResult, PipelineError>) {
    match outcome {
        Ok(result) => info!(
            "Predicted {:.2}/g for {} ({} g, forecast row {} at {} days)",
            result.price_per_gram,
            result.date,
            result.grams,
            result.forecast_date,
            result.forecast_distance_days
        ),
        Err(e) if e.is_user_error() => warn!("Rejected prediction request for {:?}: {}", date_str, e),
        Err(e) => error!("Prediction pipeline failed for {:?}: {}", date_str, e),
    }
}
