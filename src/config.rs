use std::{
    env, fs,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    str::FromStr,
};

use tracing::info;

use crate::{
    error::ServiceError,
    selector::{ModelSelector, RawSelector},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    /// Resolve a model through the registry named by the selector document.
    Registry,
    /// Load the predictor artifact found in `model_dir`.
    Artifact,
    /// Comma-separated sum; needs no artifact.
    Sum,
}

impl FromStr for AdapterKind {
    type Err = ServiceError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "registry" => Ok(AdapterKind::Registry),
            "artifact" => Ok(AdapterKind::Artifact),
            "sum" => Ok(AdapterKind::Sum),
            other => Err(ServiceError::InvalidConfiguration(format!(
                "unknown adapter '{other}', expected one of registry, artifact, sum"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub adapter: AdapterKind,
    pub config_path: PathBuf,
    pub config_section: String,
    pub model_dir: PathBuf,
    pub registry_root: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let listen_addr = env::var("SERVER_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".into())
            .parse()
            .unwrap_or_else(|_| SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080));

        let adapter = env::var("ADAPTER")
            .ok()
            .map(|raw| raw.parse::<AdapterKind>())
            .transpose()?
            .unwrap_or(AdapterKind::Registry);

        let config_path =
            PathBuf::from(env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string()));
        let config_section = env::var("CONFIG_SECTION").unwrap_or_else(|_| "mlflow".to_string());
        let model_dir =
            PathBuf::from(env::var("MODEL_DIR").unwrap_or_else(|_| "/opt/ml/model".to_string()));
        let registry_root =
            PathBuf::from(env::var("REGISTRY_ROOT").unwrap_or_else(|_| "mlruns".to_string()));

        Ok(Self {
            listen_addr,
            adapter,
            config_path,
            config_section,
            model_dir,
            registry_root,
        })
    }
}

/// Reads the YAML document at `path` and validates its `section` as a model selector.
pub fn load_selector(path: &Path, section: &str) -> Result<ModelSelector, ServiceError> {
    let raw = fs::read_to_string(path)?;
    let selector = parse_selector(&raw, section)?;
    info!(
        path = %path.display(),
        model = selector.name(),
        reference = selector.reference().as_str(),
        "model selector validated"
    );
    Ok(selector)
}

pub fn parse_selector(document: &str, section: &str) -> Result<ModelSelector, ServiceError> {
    let root: serde_yaml::Value = serde_yaml::from_str(document)?;

    // An absent section behaves like an empty mapping and fails on the missing name.
    let inner = match root.get(section) {
        Some(serde_yaml::Value::Null) | None => {
            serde_yaml::Value::Mapping(serde_yaml::Mapping::new())
        }
        Some(value) => value.clone(),
    };

    let raw: RawSelector = serde_yaml::from_value(inner).map_err(|e| {
        ServiceError::InvalidConfiguration(format!("section '{section}': {e}"))
    })?;
    ModelSelector::new(raw)
}
