//! Economic Impact Estimator
//!
//! remediation = extent · base_cost · (1 + 2·max_conc) · risk_multiplier,
//! with property loss by area and monitoring/legal as fractions of
//! remediation.

use tracing::info;

use crate::config::{EconomicsConfig, RiskMultipliers};
use crate::types::{EconomicAssessment, PlumePrediction, RiskLevel};

/// Look up the multiplier for one risk level.
pub fn multiplier_for(multipliers: &RiskMultipliers, level: RiskLevel) -> f64 {
    match level {
        RiskLevel::Low => multipliers.low,
        RiskLevel::Moderate => multipliers.moderate,
        RiskLevel::High => multipliers.high,
        RiskLevel::Critical => multipliers.critical,
    }
}

pub struct EconomicImpactEstimator<'a> {
    config: &'a EconomicsConfig,
}

impl<'a> EconomicImpactEstimator<'a> {
    pub fn new(config: &'a EconomicsConfig) -> Self {
        Self { config }
    }

    pub fn estimate(&self, plume: &PlumePrediction, overall_risk: RiskLevel) -> EconomicAssessment {
        let c = self.config;
        let base_cost = plume.extent_m2 * c.base_cost_per_m2;
        let concentration_factor = 1.0 + 2.0 * plume.max_concentration;
        let risk_factor = multiplier_for(&c.risk_multipliers, overall_risk);

        let remediation_cost = base_cost * concentration_factor * risk_factor;
        let property_value_loss = plume.extent_m2 * c.property_loss_per_m2;
        let monitoring_costs = remediation_cost * c.monitoring_fraction;
        let legal_costs = remediation_cost * c.legal_fraction;
        let total_loss = remediation_cost + property_value_loss + monitoring_costs + legal_costs;

        info!(
            remediation_cost,
            total_loss,
            risk = %overall_risk,
            "Economic impact estimated"
        );

        EconomicAssessment {
            remediation_cost,
            property_value_loss,
            monitoring_costs,
            legal_costs,
            total_loss,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlumeVelocity;

    fn plume(max: f64, extent: f64) -> PlumePrediction {
        PlumePrediction {
            extent_m2: extent,
            max_concentration: max,
            avg_concentration: max / 2.0,
            detected_cells: 0,
            boundary: Vec::new(),
            velocity: PlumeVelocity {
                speed: 0.0,
                direction_deg: 0.0,
                centroid_m: None,
            },
            confidence: 0.85,
        }
    }

    #[test]
    fn test_cost_breakdown() {
        let config = EconomicsConfig::default();
        let e = EconomicImpactEstimator::new(&config).estimate(&plume(2.0, 1_000.0), RiskLevel::High);
        // 1000 m² · $100 · (1 + 4) · 2.5
        assert!((e.remediation_cost - 1_250_000.0).abs() < 1e-6);
        assert!((e.property_value_loss - 50_000.0).abs() < 1e-6);
        assert!((e.monitoring_costs - 125_000.0).abs() < 1e-6);
        assert!((e.legal_costs - 250_000.0).abs() < 1e-6);
        assert!((e.total_loss - 1_675_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_plume_costs_nothing() {
        let config = EconomicsConfig::default();
        let e = EconomicImpactEstimator::new(&config).estimate(&plume(0.0, 0.0), RiskLevel::Low);
        assert_eq!(e.total_loss, 0.0);
    }

    #[test]
    fn test_total_monotonic_in_concentration() {
        let config = EconomicsConfig::default();
        let est = EconomicImpactEstimator::new(&config);
        let mut prev = 0.0;
        for step in 0..30 {
            let e = est.estimate(&plume(f64::from(step) * 0.5, 5_000.0), RiskLevel::Moderate);
            assert!(e.total_loss >= prev);
            prev = e.total_loss;
        }
    }
}
