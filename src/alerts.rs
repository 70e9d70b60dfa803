//! Alert Generator
//!
//! Threshold checks only; delivery belongs to the caller.

use tracing::{info, warn};

use crate::config::AlertConfig;
use crate::types::{Alert, AlertType, PlumePrediction, RiskAssessment};

const M2_PER_HECTARE: f64 = 10_000.0;

pub struct AlertGenerator<'a> {
    config: &'a AlertConfig,
}

impl<'a> AlertGenerator<'a> {
    pub fn new(config: &'a AlertConfig) -> Self {
        Self { config }
    }

    /// Alerts in fixed order: critical pollution, high concentration, large plume.
    pub fn generate(&self, plume: &PlumePrediction, risk: &RiskAssessment) -> Vec<Alert> {
        let severity = risk.overall_risk;
        let mut alerts = Vec::new();

        if risk.overall_risk.is_elevated() {
            alerts.push(Alert {
                alert_type: AlertType::CriticalPollution,
                severity,
                message: format!(
                    "Critical groundwater pollution detected with risk score {:.1}",
                    risk.risk_score
                ),
                affected_area: plume.extent_m2,
                recommendation: "Immediate containment and remediation required".to_string(),
            });
        }

        if plume.max_concentration > self.config.high_concentration_mg_l {
            alerts.push(Alert {
                alert_type: AlertType::HighConcentration,
                severity,
                message: format!(
                    "High contaminant concentration detected: {:.2} mg/L",
                    plume.max_concentration
                ),
                affected_area: plume.extent_m2,
                recommendation: "Implement source control and containment measures".to_string(),
            });
        }

        if plume.extent_m2 > self.config.large_plume_m2 {
            alerts.push(Alert {
                alert_type: AlertType::LargePlume,
                severity,
                message: format!(
                    "Large contaminant plume detected: {:.1} hectares",
                    plume.extent_m2 / M2_PER_HECTARE
                ),
                affected_area: plume.extent_m2,
                recommendation: "Comprehensive plume characterization and monitoring required"
                    .to_string(),
            });
        }

        for alert in &alerts {
            warn!(alert_type = ?alert.alert_type, severity = %alert.severity, "{}", alert.message);
        }
        info!(count = alerts.len(), "Alerts generated");
        alerts
    }
}
