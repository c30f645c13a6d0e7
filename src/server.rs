use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use tokio::task;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::{adapter::InferenceSpec, error::ServiceError};

pub struct AppState<S: InferenceSpec> {
    pub spec: Arc<S>,
    pub handle: Arc<S::Handle>,
}

impl<S: InferenceSpec> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            handle: self.handle.clone(),
        }
    }
}

/// Routes for the model-server contract: `GET /ping` and `POST /invocations`.
pub fn build_router<S>(spec: S, handle: S::Handle) -> Router
where
    S: InferenceSpec + Send + Sync + 'static,
    S::Handle: Send + Sync + 'static,
    S::Input: Send + 'static,
    S::Output: Send + 'static,
{
    let state = AppState {
        spec: Arc::new(spec),
        handle: Arc::new(handle),
    };

    Router::new()
        .route("/ping", get(ping))
        .route("/invocations", post(invocations::<S>))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn ping() -> &'static str {
    "ok"
}

async fn invocations<S>(
    State(state): State<AppState<S>>,
    Json(input): Json<S::Input>,
) -> Result<Json<S::Output>, ServiceError>
where
    S: InferenceSpec + Send + Sync + 'static,
    S::Handle: Send + Sync + 'static,
    S::Input: Send + 'static,
    S::Output: Send + 'static,
{
    debug!("invocation received");
    let output = task::spawn_blocking(move || state.spec.invoke(&state.handle, input))
        .await
        .map_err(|err| ServiceError::Task(err.to_string()))??;
    Ok(Json(output))
}
