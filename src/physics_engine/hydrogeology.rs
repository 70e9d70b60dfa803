//! Hydrogeological parameter resolution.
//!
//! Maps an aquifer type onto transport parameters by scaling the configured
//! base values. Called once per run; the result is never re-derived.

use tracing::debug;

use crate::config::HydrogeologyConfig;
use crate::types::{AquiferType, HydrogeologicalParameters};

/// Confined aquifers: conductivity x0.1, porosity x0.8.
const CONFINED_CONDUCTIVITY_FACTOR: f64 = 0.1;
const CONFINED_POROSITY_FACTOR: f64 = 0.8;

/// Karst: conductivity x10, dispersivity x5.
const KARST_CONDUCTIVITY_FACTOR: f64 = 10.0;
const KARST_DISPERSIVITY_FACTOR: f64 = 5.0;

pub struct HydrogeologicalParameterResolver {
    base: HydrogeologyConfig,
}

impl HydrogeologicalParameterResolver {
    pub fn new(base: &HydrogeologyConfig) -> Self {
        Self { base: base.clone() }
    }

    pub fn resolve(&self, aquifer_type: AquiferType) -> HydrogeologicalParameters {
        let b = &self.base;
        let mut params = HydrogeologicalParameters {
            aquifer_type,
            hydraulic_conductivity: b.hydraulic_conductivity,
            porosity: b.porosity,
            dispersivity: b.dispersivity,
            retardation_factor: b.retardation_factor,
        };

        match aquifer_type {
            AquiferType::Confined => {
                params.hydraulic_conductivity *= CONFINED_CONDUCTIVITY_FACTOR;
                params.porosity *= CONFINED_POROSITY_FACTOR;
            }
            AquiferType::Unconfined => {}
            AquiferType::Karst => {
                params.hydraulic_conductivity *= KARST_CONDUCTIVITY_FACTOR;
                params.dispersivity *= KARST_DISPERSIVITY_FACTOR;
            }
        }

        debug!(
            aquifer = %aquifer_type,
            conductivity = params.hydraulic_conductivity,
            porosity = params.porosity,
            dispersivity = params.dispersivity,
            "Resolved hydrogeological parameters"
        );
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    fn resolver() -> HydrogeologicalParameterResolver {
        HydrogeologicalParameterResolver::new(&HydrogeologyConfig::default())
    }

    #[test]
    fn test_unconfined_keeps_base() {
        let p = resolver().resolve(AquiferType::Unconfined);
        let base = HydrogeologyConfig::default();
        assert_eq!(p.hydraulic_conductivity, base.hydraulic_conductivity);
        assert_eq!(p.porosity, base.porosity);
        assert_eq!(p.dispersivity, base.dispersivity);
        assert_eq!(p.retardation_factor, base.retardation_factor);
    }

    #[test]
    fn test_confined_scaling() {
        let p = resolver().resolve(AquiferType::Confined);
        let base = HydrogeologyConfig::default();
        assert_eq!(p.hydraulic_conductivity, base.hydraulic_conductivity * 0.1);
        assert_eq!(p.porosity, base.porosity * 0.8);
        assert_eq!(p.dispersivity, base.dispersivity);
    }

    #[test]
    fn test_karst_scaling_exact() {
        let p = resolver().resolve(AquiferType::Karst);
        let base = HydrogeologyConfig::default();
        assert_eq!(p.hydraulic_conductivity, base.hydraulic_conductivity * 10.0);
        assert_eq!(p.dispersivity, base.dispersivity * 5.0);
        assert_eq!(p.porosity, base.porosity);
    }

    #[test]
    fn test_unknown_name_fails() {
        assert!(matches!(
            "alluvial".parse::<AquiferType>(),
            Err(AnalysisError::Configuration(_))
        ));
    }
}
