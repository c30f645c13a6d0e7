mod loader;
mod registry;
mod types;

pub use loader::{ARTIFACT_FILE, ArtifactError, Predictor, PredictorKind};
pub use registry::{LocalRegistry, ModelResolver, RegistryError, load_model_from_registry};
pub use types::{Frame, PredictionResponse, SumOutcome};
