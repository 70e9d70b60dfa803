//! Statistical correction applied to the simulated field before plume
//! extraction. Physics never depends on which model is active.

use tracing::debug;

use crate::config::{CorrectionConfig, CorrectionKind};
use crate::error::{AnalysisError, Result};
use crate::physics_engine::ConcentrationField;

use super::features::{extract_features, CellFeatures, FEATURE_COUNT};

/// Maps one cell's features to a corrected concentration (mg/L, >= 0).
pub trait CorrectionModel: Send + Sync {
    fn name(&self) -> &'static str;

    fn score(&self, features: &CellFeatures) -> f64;

    /// Models that only read the raw concentration can skip feature extraction.
    fn needs_features(&self) -> bool {
        true
    }
}

/// Passes the simulated concentration through unchanged.
pub struct IdentityCorrection;

impl CorrectionModel for IdentityCorrection {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn score(&self, features: &CellFeatures) -> f64 {
        features.concentration
    }

    fn needs_features(&self) -> bool {
        false
    }
}

/// Calibrated linear regression over the feature vector, floored at zero.
pub struct LinearCorrection {
    intercept: f64,
    coefficients: [f64; FEATURE_COUNT],
}

impl LinearCorrection {
    pub fn new(intercept: f64, coefficients: [f64; FEATURE_COUNT]) -> Self {
        Self {
            intercept,
            coefficients,
        }
    }
}

impl CorrectionModel for LinearCorrection {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn score(&self, features: &CellFeatures) -> f64 {
        let x = features.to_vector();
        let y = self.intercept
            + self
                .coefficients
                .iter()
                .zip(x.iter())
                .map(|(w, v)| w * v)
                .sum::<f64>();
        y.max(0.0)
    }
}

pub fn correction_from_config(config: &CorrectionConfig) -> Box<dyn CorrectionModel> {
    match config.model {
        CorrectionKind::Identity => Box::new(IdentityCorrection),
        CorrectionKind::Linear => Box::new(LinearCorrection::new(config.intercept, config.coefficients)),
    }
}

/// Produce the corrected field. Output is always finite and non-negative.
pub fn apply_correction(
    model: &dyn CorrectionModel,
    field: &ConcentrationField,
) -> Result<ConcentrationField> {
    if !model.needs_features() {
        let values = field
            .values()
            .iter()
            .map(|&c| {
                model.score(&CellFeatures {
                    concentration: c,
                    gradient: [0.0; 3],
                    local_mean: c,
                    local_std: 0.0,
                })
            })
            .collect();
        return corrected(model, field, values);
    }

    debug!(model = model.name(), cells = field.dims().len(), "Extracting plume features");
    let values = extract_features(field).iter().map(|f| model.score(f)).collect();
    corrected(model, field, values)
}

fn corrected(
    model: &dyn CorrectionModel,
    field: &ConcentrationField,
    values: Vec<f64>,
) -> Result<ConcentrationField> {
    ConcentrationField::from_values(field.dims(), field.spacing(), values).map_err(|e| {
        AnalysisError::Configuration(format!("correction model '{}' is unusable: {e}", model.name()))
    })
}
