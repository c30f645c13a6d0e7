use std::path::Path;

use tracing::warn;

use crate::{adapter::InferenceSpec, error::ServiceError, model::SumOutcome};

/// Sums a comma-separated list of numbers. Needs no model artifact.
#[derive(Debug, Clone, Copy, Default)]
pub struct SumSpec;

impl SumSpec {
    pub fn sum(request: &str) -> SumOutcome {
        let parsed = request
            .trim()
            .split(',')
            .map(|item| {
                let item = item.trim();
                item.parse::<f64>()
                    .map_err(|e| format!("could not convert '{item}' to a number: {e}"))
            })
            .collect::<Result<Vec<_>, _>>()
            .and_then(|numbers| {
                let total: f64 = numbers.iter().sum();
                if total.is_finite() {
                    Ok(total)
                } else {
                    Err(format!("sum {total} is not a finite number"))
                }
            });

        match parsed {
            Ok(sum) => SumOutcome::Sum { sum },
            Err(error) => {
                warn!(%error, "rejecting sum request");
                SumOutcome::Error { error }
            }
        }
    }
}

impl InferenceSpec for SumSpec {
    type Handle = ();
    type Input = String;
    type Output = SumOutcome;

    fn load(&self, _model_dir: &Path) -> Result<(), ServiceError> {
        Ok(())
    }

    fn invoke(&self, _handle: &(), input: String) -> Result<SumOutcome, ServiceError> {
        Ok(Self::sum(&input))
    }
}
