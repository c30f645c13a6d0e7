use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::{
    adapter::InferenceSpec,
    error::ServiceError,
    model::{Frame, PredictionResponse, Predictor},
};

/// Serves the predictor artifact stored in a model directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactSpec;

impl InferenceSpec for ArtifactSpec {
    type Handle = Predictor;
    type Input = Value;
    type Output = PredictionResponse;

    fn load(&self, model_dir: &Path) -> Result<Predictor, ServiceError> {
        let predictor = Predictor::from_dir(model_dir)
            .map_err(|err| ServiceError::model_load(model_dir.display().to_string(), err))?;
        info!(
            dir = %model_dir.display(),
            kind = ?predictor.kind,
            features = predictor.coefficients.len(),
            "predictor loaded"
        );
        Ok(predictor)
    }

    fn invoke(&self, handle: &Predictor, input: Value) -> Result<PredictionResponse, ServiceError> {
        let frame = Frame::from_json(&input)?;
        debug!(rows = frame.len(), columns = frame.width(), "running prediction");
        let prediction = handle.predict(&frame)?;
        Ok(PredictionResponse { prediction })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::model::ARTIFACT_FILE;
    use serde_json::json;
    use tempfile::tempdir;

    fn model_dir() -> tempfile::TempDir {
        let tmp = tempdir().expect("create temp dir");
        fs::write(
            tmp.path().join(ARTIFACT_FILE),
            json!({
                "kind": "linear",
                "coefficients": [1.0, 10.0],
                "intercept": 0.0,
                "feature_names": ["a", "b"]
            })
            .to_string(),
        )
        .unwrap();
        tmp
    }

    #[test]
    fn prediction_length_and_order_match_input() {
        let tmp = model_dir();
        let handle = ArtifactSpec.load(tmp.path()).unwrap();

        let input = json!({"a": [1, 2, 3, 4], "b": [0, 1, 0, 1]});
        let response = ArtifactSpec.invoke(&handle, input).unwrap();
        assert_eq!(response.prediction, vec![1.0, 12.0, 3.0, 14.0]);
    }

    #[test]
    fn empty_batch_yields_empty_prediction() {
        let tmp = model_dir();
        let handle = ArtifactSpec.load(tmp.path()).unwrap();

        let response = ArtifactSpec.invoke(&handle, json!([])).unwrap();
        assert!(response.prediction.is_empty());
    }

    #[test]
    fn repeated_load_is_equivalent() {
        let tmp = model_dir();
        let first = ArtifactSpec.load(tmp.path()).unwrap();
        let second = ArtifactSpec.load(tmp.path()).unwrap();
        assert_eq!(first, second);

        let input = json!([{"a": 2, "b": 3}]);
        assert_eq!(
            ArtifactSpec.invoke(&first, input.clone()).unwrap(),
            ArtifactSpec.invoke(&second, input).unwrap()
        );
    }

    #[test]
    fn malformed_payload_propagates() {
        let tmp = model_dir();
        let handle = ArtifactSpec.load(tmp.path()).unwrap();

        assert!(matches!(
            ArtifactSpec.invoke(&handle, json!("1, 2")),
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            ArtifactSpec.invoke(&handle, json!([{"a": 1}])),
            Err(ServiceError::Prediction(_))
        ));
    }

    #[test]
    fn missing_artifact_is_a_load_failure() {
        let tmp = tempdir().expect("create temp dir");
        match ArtifactSpec.load(tmp.path()) {
            Err(ServiceError::ModelLoad { locator, .. }) => {
                assert_eq!(locator, tmp.path().display().to_string());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
