use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to load model from {locator}: {source}")]
    ModelLoad {
        locator: String,
        #[source]
        source: BoxError,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("prediction failed: {0}")]
    Prediction(String),
    #[error("inference task failed: {0}")]
    Task(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ServiceError {
    pub fn model_load<E>(locator: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        ServiceError::ModelLoad {
            locator: locator.into(),
            source: source.into(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match self {
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::InvalidConfiguration(_)
            | ServiceError::ModelLoad { .. }
            | ServiceError::Prediction(_)
            | ServiceError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Io(_) | ServiceError::Yaml(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_load_message_names_locator_and_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::NotFound, "no such model");
        let err = ServiceError::model_load("models:/churn/Production", cause);

        let message = err.to_string();
        assert!(message.contains("models:/churn/Production"));
        assert!(message.contains("no such model"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let response = ServiceError::InvalidInput("empty frame".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ServiceError::Prediction("width mismatch".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
