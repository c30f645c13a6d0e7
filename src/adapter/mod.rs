//! Load/invoke capability shared by every serving variant.

mod artifact;
mod sum;

use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::ServiceError;

pub use artifact::ArtifactSpec;
pub use sum::SumSpec;

/// A model variant the serving harness can host.
///
/// `load` runs once at startup; the returned handle is shared read-only by every
/// subsequent `invoke`.
pub trait InferenceSpec {
    type Handle;
    type Input: DeserializeOwned;
    type Output: Serialize;

    fn load(&self, model_dir: &Path) -> Result<Self::Handle, ServiceError>;

    fn invoke(&self, handle: &Self::Handle, input: Self::Input)
    -> Result<Self::Output, ServiceError>;
}
