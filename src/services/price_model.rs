use anyhow::{Context, Result};
use ndarray::{Array1, ArrayView1};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("model expects {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("model produced a non-finite prediction")]
    NonFinite,

    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),
}

/// A trained regressor mapping one scaled feature row to a price per gram.
pub trait PriceModel: Send + Sync {
    fn name(&self) -> &str;

    fn n_features(&self) -> usize;

    fn predict(&self, scaled: ArrayView1<f64>) -> Result<f64, ModelError>;
}

fn check_width(expected: usize, scaled: &ArrayView1<f64>) -> Result<(), ModelError> {
    if scaled.len() != expected {
        return Err(ModelError::ShapeMismatch {
            expected,
            actual: scaled.len(),
        });
    }
    Ok(())
}

fn finite(value: f64) -> Result<f64, ModelError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ModelError::NonFinite)
    }
}

#[derive(Debug, Clone)]
pub struct LinearRegressionModel {
    coefficients: Array1<f64>,
    intercept: f64,
}

impl LinearRegressionModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self, ModelError> {
        if coefficients.is_empty() {
            return Err(ModelError::InvalidArtifact("no coefficients".into()));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::InvalidArtifact("non-finite coefficient".into()));
        }
        Ok(Self {
            coefficients: Array1::from_vec(coefficients),
            intercept,
        })
    }
}

impl PriceModel for LinearRegressionModel {
    fn name(&self) -> &str {
        "linear_regression"
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, scaled: ArrayView1<f64>) -> Result<f64, ModelError> {
        check_width(self.n_features(), &scaled)?;
        finite(scaled.dot(&self.coefficients) + self.intercept)
    }
}

/// One regression tree in flattened array form.
///
/// A node is a leaf when `children_left[node] == -1`; its output is `value[node]`.
/// Traversal goes left when `x[feature[node]] <= threshold[node]`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegressionTree {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<f64>,
}

impl RegressionTree {
    fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        let n = self.children_left.len();
        if n == 0 {
            return Err(ModelError::InvalidArtifact("tree has no nodes".into()));
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err(ModelError::InvalidArtifact(
                "tree node arrays have different lengths".into(),
            ));
        }

        for node in 0..n {
            let left = self.children_left[node];
            let right = self.children_right[node];
            if left == -1 {
                if !self.value[node].is_finite() {
                    return Err(ModelError::InvalidArtifact(format!("leaf {} is not finite", node)));
                }
                continue;
            }
            // Children always come after their parent, which also rules out cycles.
            let in_range = |child: i64| child > node as i64 && (child as usize) < n;
            if !in_range(left) || !in_range(right) {
                return Err(ModelError::InvalidArtifact(format!(
                    "node {} has out-of-range children ({}, {})",
                    node, left, right
                )));
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(ModelError::InvalidArtifact(format!(
                    "node {} splits on unknown feature {}",
                    node, feature
                )));
            }
        }
        Ok(())
    }

    fn predict(&self, x: &ArrayView1<f64>) -> f64 {
        let mut node = 0usize;
        loop {
            let left = self.children_left[node];
            if left == -1 {
                return self.value[node];
            }
            let feature = self.feature[node] as usize;
            node = if x[feature] <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }
    }
}

/// Bagged tree ensemble; the prediction is the mean of all tree outputs.
#[derive(Debug, Clone)]
pub struct RandomForestModel {
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForestModel {
    pub fn new(trees: Vec<RegressionTree>, n_features: usize) -> Result<Self, ModelError> {
        if trees.is_empty() {
            return Err(ModelError::InvalidArtifact("forest has no trees".into()));
        }
        for tree in &trees {
            tree.validate(n_features)?;
        }
        Ok(Self { trees, n_features })
    }
}

impl PriceModel for RandomForestModel {
    fn name(&self) -> &str {
        "random_forest"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, scaled: ArrayView1<f64>) -> Result<f64, ModelError> {
        check_width(self.n_features, &scaled)?;
        let sum: f64 = self.trees.iter().map(|t| t.predict(&scaled)).sum();
        finite(sum / self.trees.len() as f64)
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "model_type", rename_all = "snake_case")]
enum ModelArtifact {
    LinearRegression {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    RandomForest {
        n_features: usize,
        trees: Vec<RegressionTree>,
    },
}

pub fn model_from_json(json: &str) -> Result<Box<dyn PriceModel>> {
    let artifact: ModelArtifact =
        serde_json::from_str(json).context("Model artifact is not valid JSON")?;

    let model: Box<dyn PriceModel> = match artifact {
        ModelArtifact::LinearRegression { coefficients, intercept } => {
            Box::new(LinearRegressionModel::new(coefficients, intercept)?)
        }
        ModelArtifact::RandomForest { n_features, trees } => {
            Box::new(RandomForestModel::new(trees, n_features)?)
        }
    };
    Ok(model)
}

pub fn model_from_path(path: &Path) -> Result<Box<dyn PriceModel>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read model artifact: {:?}", path))?;
    model_from_json(&json).with_context(|| format!("Failed to load model artifact: {:?}", path))
}
