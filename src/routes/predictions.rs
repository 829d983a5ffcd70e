use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::PredictionResult;
use crate::services::prediction_service::resolve_date_input;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_prediction))
        .route("/window", get(get_window))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GramsInput {
    Text(String),
    Number(f64),
}

/// Fields are kept as raw input so malformed values get the pipeline's
/// validation messages rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct PredictionBody {
    #[serde(default)]
    pub grams: Option<GramsInput>,
    /// Value of the date picker
    #[serde(default)]
    pub date: Option<String>,
    /// Free-text date; overrides `date` when non-blank
    #[serde(default)]
    pub manual_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    #[serde(flatten)]
    pub result: PredictionResult,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct WindowResponse {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub forecast_start: NaiveDate,
    pub forecast_end: NaiveDate,
    pub model_ready: bool,
    pub model: Option<String>,
}

pub async fn create_prediction(
    State(state): State<AppState>,
    Json(body): Json<PredictionBody>,
) -> Result<Json<PredictionResponse>, AppError> {
    info!("POST /api/predictions - Predicting price");

    let date_str = resolve_date_input(body.manual_date.as_deref(), body.date.as_deref())
        .ok_or_else(|| {
            AppError::Validation("Please provide a date either via calendar or manual entry.".to_string())
        })?;

    // A missing grams field is validated like an empty text box.
    let result = match &body.grams {
        Some(GramsInput::Text(grams)) => state.pipeline.predict_from_input(date_str, grams),
        Some(GramsInput::Number(grams)) => state.pipeline.predict_price(date_str, *grams),
        None => state.pipeline.predict_from_input(date_str, ""),
    }?;

    let message = result.summary(&state.currency_symbol);
    Ok(Json(PredictionResponse { result, message }))
}

pub async fn get_window(State(state): State<AppState>) -> Json<WindowResponse> {
    info!("GET /api/predictions/window - Getting prediction window");
    let window = state.pipeline.window();
    let forecast = state.pipeline.forecast();
    Json(WindowResponse {
        start: window.start,
        end: window.end,
        forecast_start: forecast.first_date(),
        forecast_end: forecast.last_date(),
        model_ready: state.pipeline.is_ready(),
        model: state.pipeline.model_name().map(str::to_string),
    })
}
