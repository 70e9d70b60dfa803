//! Site types: SiteProfile, AquiferType, SamplingMethod, AnalysisRequest

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{AnalysisError, Result};

// ============================================================================
// Aquifer
// ============================================================================

/// Hydrogeological setting of the monitored aquifer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AquiferType {
    Confined,
    Unconfined,
    Karst,
}

impl AquiferType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AquiferType::Confined => "confined",
            AquiferType::Unconfined => "unconfined",
            AquiferType::Karst => "karst",
        }
    }
}

impl FromStr for AquiferType {
    type Err = AnalysisError;

    /// Unrecognized names are a configuration failure; no aquifer type is
    /// assumed on the caller's behalf.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "confined" => Ok(AquiferType::Confined),
            "unconfined" => Ok(AquiferType::Unconfined),
            "karst" => Ok(AquiferType::Karst),
            other => Err(AnalysisError::Configuration(format!(
                "unrecognized aquifer_type '{other}' (expected confined, unconfined or karst)"
            ))),
        }
    }
}

impl std::fmt::Display for AquiferType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Groundwater sampling method used in the field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMethod {
    GrabSample,
    CompositeSample,
    ContinuousMonitoring,
    PassiveSampling,
}

// ============================================================================
// Site Profile
// ============================================================================

/// WGS84 site location (degrees).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Validated description of the monitored site. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteProfile {
    pub name: String,
    pub coordinates: Coordinates,
    pub aquifer_type: AquiferType,
    /// Depth to water table (m, >= 0)
    pub depth_to_water: f64,
    pub sampling_method: SamplingMethod,
    /// People per km² around the site, when known
    pub population_density: Option<f64>,
}

// ============================================================================
// Request
// ============================================================================

/// Raw analysis request as submitted by the transport layer.
///
/// `aquifer_type` stays a string here so that an unknown value surfaces as a
/// configuration failure instead of a deserialization error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub site_name: String,
    pub coordinates: Coordinates,
    pub aquifer_type: String,
    pub depth_to_water: f64,
    pub sampling_method: SamplingMethod,
    #[serde(default)]
    pub contaminants_of_concern: Vec<String>,
    /// Contaminant name -> measured concentration (mg/L)
    #[serde(default)]
    pub sampling_data: BTreeMap<String, f64>,
    #[serde(default)]
    pub population_density: Option<f64>,
}

/// A request that passed validation and is ready for the pipeline.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub analysis_id: String,
    pub site: SiteProfile,
    /// (name, concentration mg/L) in name order
    pub measurements: Vec<(String, f64)>,
    pub contaminants_of_concern: Vec<String>,
}

impl AnalysisRequest {
    /// Check every field and produce the typed site profile.
    pub fn validate(&self) -> Result<ValidatedRequest> {
        if self.site_name.trim().is_empty() {
            return Err(AnalysisError::Validation("site_name is required".to_string()));
        }

        let Coordinates { lat, lon } = self.coordinates;
        if !(-90.0..=90.0).contains(&lat) {
            return Err(AnalysisError::Validation(format!(
                "latitude {lat} must be between -90 and 90"
            )));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(AnalysisError::Validation(format!(
                "longitude {lon} must be between -180 and 180"
            )));
        }

        if !(self.depth_to_water.is_finite() && self.depth_to_water >= 0.0) {
            return Err(AnalysisError::Validation(format!(
                "depth_to_water {} must be a non-negative number",
                self.depth_to_water
            )));
        }

        if let Some(density) = self.population_density {
            if !(density.is_finite() && density >= 0.0) {
                return Err(AnalysisError::Validation(format!(
                    "population_density {density} must be a non-negative number"
                )));
            }
        }

        let mut measurements = Vec::with_capacity(self.sampling_data.len());
        for (name, &concentration) in &self.sampling_data {
            if name.trim().is_empty() {
                return Err(AnalysisError::Validation(
                    "sampling_data contains an empty contaminant name".to_string(),
                ));
            }
            if !concentration.is_finite() {
                return Err(AnalysisError::Validation(format!(
                    "concentration for '{name}' is not a finite number"
                )));
            }
            if concentration < 0.0 {
                return Err(AnalysisError::Validation(format!(
                    "concentration for '{name}' is negative ({concentration} mg/L)"
                )));
            }
            measurements.push((name.clone(), concentration));
        }

        let aquifer_type = self.aquifer_type.parse::<AquiferType>()?;

        let analysis_id = self
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Ok(ValidatedRequest {
            analysis_id,
            site: SiteProfile {
                name: self.site_name.clone(),
                coordinates: self.coordinates,
                aquifer_type,
                depth_to_water: self.depth_to_water,
                sampling_method: self.sampling_method,
                population_density: self.population_density,
            },
            measurements,
            contaminants_of_concern: self.contaminants_of_concern.clone(),
        })
    }
}
