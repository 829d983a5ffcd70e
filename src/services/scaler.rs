use anyhow::{Context, Result};
use ndarray::{Array1, ArrayView1};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::models::{Feature, FeatureVector, FEATURE_COUNT};

#[derive(Debug, Error, PartialEq)]
pub enum ScalerError {
    #[error("scaler expects {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("scaler feature order {actual:?} does not match {expected:?}")]
    FeatureOrder {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("invalid scaler parameter: {0}")]
    InvalidParameter(String),
}

/// On-disk form of a fitted standard scaler.
#[derive(Debug, Deserialize)]
struct ScalerArtifact {
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

/// Fitted per-feature standardisation: `(x - mean) / scale`.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ScalerError> {
        if mean.len() != scale.len() {
            return Err(ScalerError::ShapeMismatch {
                expected: mean.len(),
                actual: scale.len(),
            });
        }
        if let Some(m) = mean.iter().find(|m| !m.is_finite()) {
            return Err(ScalerError::InvalidParameter(format!("mean {} is not finite", m)));
        }
        if let Some(s) = scale.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(ScalerError::InvalidParameter(format!(
                "scale {} must be finite and positive",
                s
            )));
        }

        Ok(Self {
            mean: Array1::from_vec(mean),
            scale: Array1::from_vec(scale),
        })
    }

    /// Pass-through scaler for the full feature schema.
    pub fn identity() -> Self {
        Self {
            mean: Array1::zeros(FEATURE_COUNT),
            scale: Array1::ones(FEATURE_COUNT),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: ScalerArtifact =
            serde_json::from_str(json).context("Scaler artifact is not valid JSON")?;

        if let Some(names) = artifact.feature_names {
            let expected: Vec<String> = Feature::names().into_iter().map(String::from).collect();
            if names != expected {
                return Err(ScalerError::FeatureOrder { expected, actual: names }.into());
            }
        }

        let scaler = Self::new(artifact.mean, artifact.scale)?;
        if scaler.n_features() != FEATURE_COUNT {
            return Err(ScalerError::ShapeMismatch {
                expected: FEATURE_COUNT,
                actual: scaler.n_features(),
            }
            .into());
        }
        Ok(scaler)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scaler artifact: {:?}", path))?;
        Self::from_json(&json).with_context(|| format!("Failed to load scaler artifact: {:?}", path))
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform_slice(&self, raw: ArrayView1<f64>) -> Result<Array1<f64>, ScalerError> {
        if raw.len() != self.n_features() {
            return Err(ScalerError::ShapeMismatch {
                expected: self.n_features(),
                actual: raw.len(),
            });
        }
        Ok((&raw - &self.mean) / &self.scale)
    }

    pub fn transform(&self, features: &FeatureVector) -> Result<Array1<f64>, ScalerError> {
        self.transform_slice(ArrayView1::from(features.as_slice()))
    }
}
