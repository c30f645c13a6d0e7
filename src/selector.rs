//! Model selector: which registered model to load, and from where.
//!
//! The raw record mirrors the configuration document. Validation turns it into a
//! [`ModelSelector`] whose reference is either a version or a stage, never both.

use std::fmt;

use serde::{Deserialize, Deserializer, de};

use crate::error::ServiceError;

/// Stage assigned when the document names neither a version nor a stage.
pub const DEFAULT_STAGE: &str = "Production";

/// Registry scheme prefixed to every locator.
pub const LOCATOR_SCHEME: &str = "models:/";

/// Selector fields as they appear in the configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSelector {
    pub model_name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub version: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default, alias = "registry_endpoint", alias = "registryEndpoint")]
    pub tracking_uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModelRef {
    Version(String),
    Stage(String),
}

impl ModelRef {
    pub fn as_str(&self) -> &str {
        match self {
            ModelRef::Version(v) | ModelRef::Stage(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelector {
    name: String,
    reference: ModelRef,
    registry_endpoint: Option<String>,
}

impl ModelSelector {
    pub fn new(raw: RawSelector) -> Result<Self, ServiceError> {
        if raw.model_name.trim().is_empty() {
            return Err(ServiceError::InvalidConfiguration(
                "'model_name' must not be empty".into(),
            ));
        }

        let reference = match (present(raw.version), present(raw.stage)) {
            (Some(_), Some(_)) => {
                return Err(ServiceError::InvalidConfiguration(
                    "specify only one of 'version' or 'stage', not both".into(),
                ));
            }
            (Some(version), None) => ModelRef::Version(version),
            (None, Some(stage)) => ModelRef::Stage(stage),
            (None, None) => ModelRef::Stage(DEFAULT_STAGE.to_string()),
        };

        Ok(Self {
            name: raw.model_name,
            reference,
            registry_endpoint: present(raw.tracking_uri),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reference(&self) -> &ModelRef {
        &self.reference
    }

    pub fn version(&self) -> Option<&str> {
        match &self.reference {
            ModelRef::Version(v) => Some(v),
            ModelRef::Stage(_) => None,
        }
    }

    pub fn stage(&self) -> Option<&str> {
        match &self.reference {
            ModelRef::Stage(s) => Some(s),
            ModelRef::Version(_) => None,
        }
    }

    pub fn registry_endpoint(&self) -> Option<&str> {
        self.registry_endpoint.as_deref()
    }

    pub fn locator(&self) -> ModelLocator {
        ModelLocator {
            name: self.name.clone(),
            reference: self.reference.clone(),
        }
    }
}

impl TryFrom<RawSelector> for ModelSelector {
    type Error = ServiceError;

    fn try_from(raw: RawSelector) -> Result<Self, Self::Error> {
        ModelSelector::new(raw)
    }
}

/// Registry key for one model revision, rendered as `models:/<name>/<ref>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelLocator {
    name: String,
    reference: ModelRef,
}

impl ModelLocator {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reference(&self) -> &ModelRef {
        &self.reference
    }

    /// `<name>/<ref>` without the scheme.
    pub fn path(&self) -> String {
        format!("{}/{}", self.name, self.reference.as_str())
    }
}

impl fmt::Display for ModelLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{LOCATOR_SCHEME}{}", self.path())
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Int(i64),
        Float(f64),
    }

    // A float loses its written form (`1.10` reads as `1.1`), so it must be quoted.
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Text(t)) => Ok(Some(t)),
        Some(Scalar::Int(i)) => Ok(Some(i.to_string())),
        Some(Scalar::Float(f)) => Err(de::Error::custom(format!(
            "version {f} must be quoted or an integer"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(version: Option<&str>, stage: Option<&str>) -> RawSelector {
        RawSelector {
            model_name: "HeartDiseaseModel".into(),
            version: version.map(str::to_string),
            stage: stage.map(str::to_string),
            tracking_uri: None,
        }
    }

    #[test]
    fn both_version_and_stage_is_rejected() {
        let err = ModelSelector::new(raw(Some("3"), Some("Staging"))).unwrap_err();
        match err {
            ServiceError::InvalidConfiguration(msg) => {
                assert!(msg.contains("version"));
                assert!(msg.contains("stage"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn neither_defaults_to_production_stage() {
        let selector = ModelSelector::new(raw(None, None)).unwrap();
        assert_eq!(selector.stage(), Some(DEFAULT_STAGE));
        assert_eq!(selector.version(), None);
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let selector = ModelSelector::new(raw(Some(""), Some(""))).unwrap();
        assert_eq!(selector.stage(), Some("Production"));

        let selector = ModelSelector::new(raw(Some("7"), Some(""))).unwrap();
        assert_eq!(selector.version(), Some("7"));
        assert_eq!(selector.stage(), None);

        let mut input = raw(None, None);
        input.tracking_uri = Some(String::new());
        assert_eq!(ModelSelector::new(input).unwrap().registry_endpoint(), None);

        let parsed: RawSelector =
            serde_yaml::from_str("model_name: churn\nregistryEndpoint: \"\"\n").unwrap();
        assert_eq!(ModelSelector::new(parsed).unwrap().registry_endpoint(), None);
    }

    #[test]
    fn model_name_is_stored_as_written() {
        let mut input = raw(None, None);
        input.model_name = " churn ".into();
        assert_eq!(ModelSelector::new(input).unwrap().name(), " churn ");
    }

    #[test]
    fn single_reference_is_kept_verbatim() {
        let selector = ModelSelector::new(raw(Some("12"), None)).unwrap();
        assert_eq!(selector.version(), Some("12"));
        assert_eq!(selector.stage(), None);

        let selector = ModelSelector::new(raw(None, Some("Staging"))).unwrap();
        assert_eq!(selector.stage(), Some("Staging"));
        assert_eq!(selector.version(), None);
    }

    #[test]
    fn blank_model_name_is_rejected() {
        let mut input = raw(None, None);
        input.model_name = "   ".into();
        assert!(matches!(
            ModelSelector::new(input),
            Err(ServiceError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn locator_is_deterministic() {
        let a = ModelSelector::new(raw(None, Some("Staging"))).unwrap();
        let b = ModelSelector::new(raw(None, Some("Staging"))).unwrap();

        assert_eq!(a.locator(), b.locator());
        assert_eq!(a.locator().to_string(), "models:/HeartDiseaseModel/Staging");
        assert_eq!(a.locator().path(), "HeartDiseaseModel/Staging");

        let by_version = ModelSelector::new(raw(Some("4"), None)).unwrap();
        assert_eq!(
            by_version.locator().to_string(),
            "models:/HeartDiseaseModel/4"
        );
    }

    #[test]
    fn deserializes_numeric_version_and_endpoint_alias() {
        let raw: RawSelector = serde_yaml::from_str(
            "model_name: churn\nversion: 3\nregistryEndpoint: file:///srv/registry\n",
        )
        .unwrap();
        let selector = ModelSelector::try_from(raw).unwrap();

        assert_eq!(selector.version(), Some("3"));
        assert_eq!(selector.registry_endpoint(), Some("file:///srv/registry"));
    }

    #[test]
    fn float_version_must_be_quoted() {
        let err = serde_yaml::from_str::<RawSelector>("model_name: churn\nversion: 1.10\n")
            .unwrap_err();
        assert!(err.to_string().contains("must be quoted"));

        let raw: RawSelector =
            serde_yaml::from_str("model_name: churn\nversion: \"1.10\"\n").unwrap();
        assert_eq!(ModelSelector::new(raw).unwrap().version(), Some("1.10"));
    }
}
