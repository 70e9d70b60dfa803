//! Remediation Planner
//!
//! Picks a method pair from plume severity, then sizes the timeline,
//! success probability, cost and the monitoring programme.

use tracing::info;

use crate::config::defaults::{
    MIN_MONITORING_POINTS, MONITORING_AREA_PER_POINT_M2, MONITORING_BASE_DEPTH_M,
    MONITORING_DEPTH_STEP_M, MONITORING_SPACING_DEG,
};
use crate::config::RemediationConfig;
use crate::economics::multiplier_for;
use crate::types::{
    Coordinates, MonitoredParameter, MonitoringFrequency, MonitoringParameter, MonitoringPlan,
    PlumePrediction, RemediationMethod, RemediationPlan, RiskLevel, SamplingLocation,
};

pub struct RemediationPlanner<'a> {
    config: &'a RemediationConfig,
}

impl<'a> RemediationPlanner<'a> {
    pub fn new(config: &'a RemediationConfig) -> Self {
        Self { config }
    }

    /// (primary, secondary) by max concentration first, then extent.
    pub fn select_methods(&self, plume: &PlumePrediction) -> (RemediationMethod, RemediationMethod) {
        if plume.max_concentration > self.config.high_concentration_mg_l {
            (
                RemediationMethod::PumpAndTreat,
                RemediationMethod::InSituChemicalOxidation,
            )
        } else if plume.extent_m2 > self.config.large_plume_m2 {
            (
                RemediationMethod::MonitoredNaturalAttenuation,
                RemediationMethod::EnhancedBioaugmentation,
            )
        } else {
            (
                RemediationMethod::Phytoremediation,
                RemediationMethod::SoilVaporExtraction,
            )
        }
    }

    /// `(12 + extent/10000 + max/5) · risk factor`, clamped to
    /// `[1, max_timeline_months]` and truncated to whole months.
    pub fn timeline_months(&self, plume: &PlumePrediction, overall_risk: RiskLevel) -> u32 {
        let factor = multiplier_for(&self.config.timeline_risk_factors, overall_risk);
        let months =
            (12.0 + plume.extent_m2 / 10_000.0 + plume.max_concentration / 5.0) * factor;
        let upper = f64::from(self.config.max_timeline_months.max(1));
        months.clamp(1.0, upper).floor() as u32
    }

    pub fn success_probability(&self, method: RemediationMethod, plume: &PlumePrediction) -> f64 {
        let p = method.base_success_rate()
            * (1.0 - 0.2 * plume.max_concentration / 20.0)
            * (1.0 - 0.1 * plume.extent_m2 / 100_000.0);
        p.clamp(
            self.config.min_success_probability,
            self.config.max_success_probability,
        )
    }

    pub fn monitoring_frequency(overall_risk: RiskLevel) -> MonitoringFrequency {
        match overall_risk {
            RiskLevel::High | RiskLevel::Critical => MonitoringFrequency::Weekly,
            RiskLevel::Moderate => MonitoringFrequency::Monthly,
            RiskLevel::Low => MonitoringFrequency::Quarterly,
        }
    }

    pub fn monitoring_plan(
        &self,
        plume: &PlumePrediction,
        overall_risk: RiskLevel,
        site: &Coordinates,
    ) -> MonitoringPlan {
        let frequency = Self::monitoring_frequency(overall_risk);
        let parameters: &[MonitoringParameter] = match frequency {
            MonitoringFrequency::Weekly => &[
                MonitoringParameter::ContaminantConcentration,
                MonitoringParameter::GroundwaterLevel,
                MonitoringParameter::FlowDirection,
                MonitoringParameter::WaterQuality,
            ],
            MonitoringFrequency::Monthly => &[
                MonitoringParameter::ContaminantConcentration,
                MonitoringParameter::GroundwaterLevel,
            ],
            MonitoringFrequency::Quarterly => &[MonitoringParameter::ContaminantConcentration],
        };

        MonitoringPlan {
            frequency,
            parameters: parameters
                .iter()
                .map(|&p| MonitoredParameter {
                    parameter: p,
                    analytical_method: p.analytical_method().to_string(),
                })
                .collect(),
            sampling_locations: sampling_locations(plume.extent_m2, site),
        }
    }

    pub fn plan(
        &self,
        plume: &PlumePrediction,
        overall_risk: RiskLevel,
        site: &Coordinates,
    ) -> RemediationPlan {
        let (primary, secondary) = self.select_methods(plume);
        let timeline_months = self.timeline_months(plume, overall_risk);
        let success_probability = self.success_probability(primary, plume);
        let cost_estimate = plume.extent_m2 * primary.unit_cost();

        info!(
            primary = ?primary,
            timeline_months,
            success_probability,
            cost_estimate,
            "Remediation planned"
        );

        RemediationPlan {
            primary_method: primary,
            secondary_method: secondary,
            timeline_months,
            success_probability,
            monitoring_plan: self.monitoring_plan(plume, overall_risk, site),
            cost_estimate,
            implementation_steps: primary
                .implementation_steps()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// One well per `MONITORING_AREA_PER_POINT_M2` of plume (at least
/// `MIN_MONITORING_POINTS`), stepped east (downgradient) and deeper.
pub fn sampling_locations(extent_m2: f64, site: &Coordinates) -> Vec<SamplingLocation> {
    let by_area = (extent_m2 / MONITORING_AREA_PER_POINT_M2).floor() as usize;
    let count = by_area.max(MIN_MONITORING_POINTS);
    (0..count)
        .map(|i| SamplingLocation {
            lat: site.lat,
            lon: site.lon + (i + 1) as f64 * MONITORING_SPACING_DEG,
            depth_m: MONITORING_BASE_DEPTH_M + i as f64 * MONITORING_DEPTH_STEP_M,
        })
        .collect()
}
