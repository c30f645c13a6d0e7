use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::{
    error::{BoxError, ServiceError},
    model::loader::{ArtifactError, Predictor},
    selector::{ModelLocator, ModelSelector},
};

/// Capability that turns a locator into a loaded model.
pub trait ModelResolver {
    type Handle;
    type Error: Into<BoxError>;

    fn resolve(
        &self,
        locator: &ModelLocator,
        endpoint: Option<&str>,
    ) -> Result<Self::Handle, Self::Error>;
}

/// Resolves the selector's locator and loads it. No retries: the first failure is returned.
pub fn load_model_from_registry<R: ModelResolver>(
    selector: &ModelSelector,
    resolver: &R,
) -> Result<R::Handle, ServiceError> {
    let locator = selector.locator();
    info!(%locator, endpoint = ?selector.registry_endpoint(), "loading model from registry");

    resolver
        .resolve(&locator, selector.registry_endpoint())
        .map_err(|err| ServiceError::model_load(locator.to_string(), err))
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unsupported registry endpoint '{0}'")]
    UnsupportedEndpoint(String),
    #[error("no model registered at {}", .0.display())]
    NotRegistered(PathBuf),
    #[error("locator part '{0}' is not a single path segment")]
    InvalidLocator(String),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Directory-backed registry laid out as `<root>/<name>/<version-or-stage>/model.json`.
#[derive(Debug, Clone)]
pub struct LocalRegistry {
    root: PathBuf,
}

impl LocalRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn root_for(&self, endpoint: Option<&str>) -> Result<PathBuf, RegistryError> {
        let Some(endpoint) = endpoint else {
            return Ok(self.root.clone());
        };
        if let Some(path) = endpoint.strip_prefix("file://") {
            return Ok(PathBuf::from(path));
        }
        if endpoint.contains("://") {
            return Err(RegistryError::UnsupportedEndpoint(endpoint.to_string()));
        }
        Ok(PathBuf::from(endpoint))
    }
}

impl ModelResolver for LocalRegistry {
    type Handle = Predictor;
    type Error = RegistryError;

    fn resolve(
        &self,
        locator: &ModelLocator,
        endpoint: Option<&str>,
    ) -> Result<Predictor, RegistryError> {
        let name = segment(locator.name())?;
        let reference = segment(locator.reference().as_str())?;
        let model_dir = self.root_for(endpoint)?.join(name).join(reference);
        if !model_dir.is_dir() {
            return Err(RegistryError::NotRegistered(model_dir));
        }
        Ok(Predictor::from_dir(&model_dir)?)
    }
}

/// Locator parts must stay inside the registry root.
fn segment(part: &str) -> Result<&Path, RegistryError> {
    let path = Path::new(part);
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(path),
        _ => Err(RegistryError::InvalidLocator(part.to_string())),
    }
}
