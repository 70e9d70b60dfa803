//! Plume Predictor
//!
//! Turns a simulated concentration field into plume statistics:
//!
//! 1. Apply the configured `CorrectionModel` (identity by default)
//! 2. Threshold at the detection limit
//! 3. Extent, max/avg concentration, contour and centroid
//! 4. Seepage velocity along the modelled flow axis

pub mod correction;
pub mod features;
pub mod morphology;

pub use correction::{
    apply_correction, correction_from_config, CorrectionModel, IdentityCorrection, LinearCorrection,
};
pub use features::{cell_features, extract_features, CellFeatures};

use tracing::{debug, info};

use crate::config::PlumeConfig;
use crate::error::Result;
use crate::physics_engine::ConcentrationField;
use crate::types::{HydrogeologicalParameters, PlumePrediction, PlumeVelocity};

/// Flow is modelled along +x only.
const FLOW_DIRECTION_DEG: f64 = 0.0;

pub struct PlumePredictor<'a> {
    config: &'a PlumeConfig,
    correction: &'a dyn CorrectionModel,
    hydraulic_gradient: f64,
}

impl<'a> PlumePredictor<'a> {
    pub fn new(
        config: &'a PlumeConfig,
        correction: &'a dyn CorrectionModel,
        hydraulic_gradient: f64,
    ) -> Self {
        Self {
            config,
            correction,
            hydraulic_gradient,
        }
    }

    pub fn predict(
        &self,
        field: &ConcentrationField,
        params: &HydrogeologicalParameters,
    ) -> Result<PlumePrediction> {
        let corrected = apply_correction(self.correction, field)?;
        let dims = corrected.dims();
        let spacing = corrected.spacing();
        let values = corrected.values();
        let threshold = self.config.detection_threshold_mg_l;

        let mask = morphology::threshold_mask(values, threshold);
        let detected_cells = mask.iter().filter(|&&m| m).count();

        let (positive_sum, positive_count) = values
            .iter()
            .filter(|&&v| v > 0.0)
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        let avg_concentration = if positive_count > 0 {
            positive_sum / positive_count as f64
        } else {
            0.0
        };

        let centroid_m = if detected_cells > 0 {
            let (si, sj) = mask
                .iter()
                .enumerate()
                .filter(|(_, &m)| m)
                .fold((0.0, 0.0), |(si, sj), (idx, _)| {
                    let (i, j, _) = dims.coords(idx);
                    (si + i as f64, sj + j as f64)
                });
            let n = detected_cells as f64;
            Some([si / n * spacing.dx, sj / n * spacing.dy])
        } else {
            None
        };

        let boundary = morphology::boundary_cells(&dims, &mask);

        let prediction = PlumePrediction {
            extent_m2: detected_cells as f64 * spacing.cell_area(),
            max_concentration: corrected.max(),
            avg_concentration,
            detected_cells,
            boundary,
            velocity: PlumeVelocity {
                speed: params.seepage_velocity(self.hydraulic_gradient),
                direction_deg: FLOW_DIRECTION_DEG,
                centroid_m,
            },
            confidence: self.config.prediction_confidence,
        };

        debug!(
            correction = self.correction.name(),
            boundary_cells = prediction.boundary.len(),
            "Plume contour extracted"
        );
        info!(
            extent_m2 = prediction.extent_m2,
            max = prediction.max_concentration,
            avg = prediction.avg_concentration,
            "Plume predicted"
        );
        Ok(prediction)
    }
}
