use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{error::ServiceError, model::Frame};

/// File name of the serialized predictor inside a model directory.
pub const ARTIFACT_FILE: &str = "model.json";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("model artifact missing: {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid predictor in {}: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictorKind {
    Linear,
    Logistic,
}

fn default_threshold() -> f64 {
    0.5
}

/// Linear model over named or positional features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predictor {
    pub kind: PredictorKind,
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Predictor {
    pub fn from_dir(model_dir: &Path) -> Result<Self, ArtifactError> {
        let path = model_dir.join(ARTIFACT_FILE);
        if !path.exists() {
            return Err(ArtifactError::Missing(path));
        }
        let raw = fs::read_to_string(&path).map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?;
        let predictor: Predictor =
            serde_json::from_str(&raw).map_err(|source| ArtifactError::Decode {
                path: path.clone(),
                source,
            })?;
        predictor.validate(&path)?;
        Ok(predictor)
    }

    fn validate(&self, path: &Path) -> Result<(), ArtifactError> {
        let invalid = |reason: String| ArtifactError::Invalid {
            path: path.to_path_buf(),
            reason,
        };
        if self.coefficients.is_empty() {
            return Err(invalid("coefficients must not be empty".into()));
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.coefficients.len() {
                return Err(invalid(format!(
                    "{} feature names for {} coefficients",
                    names.len(),
                    self.coefficients.len()
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(invalid(format!(
                "threshold {} outside [0, 1]",
                self.threshold
            )));
        }
        Ok(())
    }

    /// One prediction per frame row, in row order.
    pub fn predict(&self, frame: &Frame) -> Result<Vec<f64>, ServiceError> {
        let indices = self.feature_indices(frame)?;

        Ok(frame
            .rows()
            .iter()
            .map(|row| {
                let score = indices
                    .iter()
                    .zip(&self.coefficients)
                    .fold(self.intercept, |acc, (&idx, coef)| acc + coef * row[idx]);
                match self.kind {
                    PredictorKind::Linear => score,
                    PredictorKind::Logistic => {
                        if sigmoid(score) >= self.threshold {
                            1.0
                        } else {
                            0.0
                        }
                    }
                }
            })
            .collect())
    }

    fn feature_indices(&self, frame: &Frame) -> Result<Vec<usize>, ServiceError> {
        if frame.is_empty() {
            return Ok((0..self.coefficients.len()).collect());
        }
        match &self.feature_names {
            Some(_) if self.is_positional(frame) => Ok((0..frame.width()).collect()),
            Some(names) => names
                .iter()
                .map(|name| {
                    frame.column_index(name).ok_or_else(|| {
                        ServiceError::Prediction(format!("input is missing feature '{name}'"))
                    })
                })
                .collect(),
            None if frame.width() == self.coefficients.len() => {
                Ok((0..frame.width()).collect())
            }
            None => Err(ServiceError::Prediction(format!(
                "input has {} columns, model expects {}",
                frame.width(),
                self.coefficients.len()
            ))),
        }
    }

    /// Row-array input carries no names; columns are `"0".."n-1"`.
    fn is_positional(&self, frame: &Frame) -> bool {
        frame.width() == self.coefficients.len()
            && frame
                .columns()
                .iter()
                .enumerate()
                .all(|(idx, column)| *column == idx.to_string())
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
