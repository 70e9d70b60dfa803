//! Transport and plume types: HydrogeologicalParameters, PlumePrediction

use serde::{Deserialize, Serialize};

use super::AquiferType;

/// Aquifer transport parameters, resolved once per run and read-only after.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HydrogeologicalParameters {
    pub aquifer_type: AquiferType,
    /// m/s
    pub hydraulic_conductivity: f64,
    /// fraction
    pub porosity: f64,
    /// m
    pub dispersivity: f64,
    /// dimensionless
    pub retardation_factor: f64,
}

impl HydrogeologicalParameters {
    /// Longitudinal dispersion coefficient: dispersivity x K / porosity.
    pub fn longitudinal_dispersion(&self) -> f64 {
        self.dispersivity * self.hydraulic_conductivity / self.porosity
    }

    /// Darcy flux along the flow axis: K x gradient.
    pub fn darcy_velocity(&self, hydraulic_gradient: f64) -> f64 {
        self.hydraulic_conductivity * hydraulic_gradient
    }

    /// Average linear (seepage) velocity: K x gradient / porosity.
    pub fn seepage_velocity(&self, hydraulic_gradient: f64) -> f64 {
        self.darcy_velocity(hydraulic_gradient) / self.porosity
    }
}

/// Plume migration estimate.
///
/// Direction is fixed along the modelled flow axis (+x, reported as 0°
/// clockwise from east); a general direction would need a hydraulic-head field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PlumeVelocity {
    /// Seepage speed in the conductivity's length/time unit
    pub speed: f64,
    pub direction_deg: f64,
    /// Horizontal centroid of the detected plume (m from the grid origin)
    pub centroid_m: Option<[f64; 2]>,
}

/// Statistics extracted from one (corrected) concentration field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlumePrediction {
    /// Detected cells x horizontal cell area (m²)
    pub extent_m2: f64,
    /// mg/L
    pub max_concentration: f64,
    /// Mean over cells with positive concentration (mg/L), 0 for an empty field
    pub avg_concentration: f64,
    pub detected_cells: usize,
    /// Cells on the detection-threshold contour, as `[i, j, k]`
    pub boundary: Vec<[usize; 3]>,
    pub velocity: PlumeVelocity,
    pub confidence: f64,
}

impl PlumePrediction {
    pub fn is_empty(&self) -> bool {
        self.detected_cells == 0
    }
}

/// Plume of a single contaminant after its own transport run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContaminantPlume {
    pub contaminant: String,
    pub source_concentration: f64,
    pub prediction: PlumePrediction,
    pub steps: usize,
    pub dt_days: f64,
}
