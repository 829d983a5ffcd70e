use axum::http::StatusCode;
use axum::response::IntoResponse;
use thiserror::Error;

use crate::services::prediction_service::PipelineError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("{0}")]
    Prediction(#[from] PipelineError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::Prediction(e) => {
                let status = match &e {
                    PipelineError::InvalidDateFormat { .. }
                    | PipelineError::OutOfRangeDate { .. }
                    | PipelineError::InvalidGrams { .. } => StatusCode::BAD_REQUEST,
                    PipelineError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                    PipelineError::FeatureShapeMismatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.to_string()).into_response()
            }
        }
    }
}

impl From<String> for AppError {
    fn from(value: String) -> Self {
        AppError::Validation(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_status_codes() {
        let d = NaiveDate::from_ymd_opt(2025, 5, 21).unwrap();
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                PipelineError::OutOfRangeDate { date: d, start: d, end: d }.into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                PipelineError::InvalidGrams { input: "-5".into() }.into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                PipelineError::ModelUnavailable("not loaded".into()).into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                PipelineError::FeatureShapeMismatch("3 != 10".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
