pub mod adapter;
pub mod config;
pub mod error;
pub mod model;
pub mod selector;
pub mod server;

pub use adapter::{ArtifactSpec, InferenceSpec, SumSpec};
pub use config::{AdapterKind, AppConfig, load_selector};
pub use error::ServiceError;
pub use model::{LocalRegistry, ModelResolver, Predictor, load_model_from_registry};
pub use selector::{ModelLocator, ModelRef, ModelSelector, RawSelector};
pub use server::build_router;
