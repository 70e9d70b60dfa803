//! Per-domain sub-assessments, all fixed thresholds on max concentration.

use crate::types::{
    ComplianceStatus, ContaminantProfile, EcologicalRisk, HumanHealthRisk, InfrastructureRisk,
    RegulatoryCompliance, RiskLevel,
};

const NO_LIMIT_VIOLATION: &str = "no_regulatory_limit_defined";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn human_health(max_concentration: f64) -> HumanHealthRisk {
    let (risk_level, pathways): (RiskLevel, &[&str]) = if max_concentration > 10.0 {
        (RiskLevel::High, &["drinking_water", "inhalation", "dermal"])
    } else if max_concentration > 1.0 {
        (RiskLevel::Moderate, &["drinking_water", "dermal"])
    } else {
        (RiskLevel::Low, &["drinking_water"])
    };

    HumanHealthRisk {
        risk_level,
        exposure_pathways: strings(pathways),
        vulnerable_populations: strings(&["children", "elderly", "pregnant_women"]),
    }
}

pub fn ecological(max_concentration: f64) -> EcologicalRisk {
    let (risk_level, species): (RiskLevel, &[&str]) = if max_concentration > 5.0 {
        (RiskLevel::High, &["aquatic_organisms", "soil_fauna", "plants"])
    } else if max_concentration > 1.0 {
        (RiskLevel::Moderate, &["aquatic_organisms", "soil_fauna"])
    } else {
        (RiskLevel::Low, &["sensitive_aquatic_organisms"])
    };

    let ecosystem_services_impact = if risk_level == RiskLevel::Low {
        RiskLevel::Low
    } else {
        RiskLevel::Moderate
    };

    EcologicalRisk {
        risk_level,
        affected_species: strings(species),
        ecosystem_services_impact,
    }
}

pub fn infrastructure(max_concentration: f64) -> InfrastructureRisk {
    let (risk_level, affected): (RiskLevel, &[&str]) = if max_concentration > 5.0 {
        (RiskLevel::High, &["wells", "utilities", "foundations"])
    } else if max_concentration > 1.0 {
        (RiskLevel::Moderate, &["wells", "utilities"])
    } else {
        (RiskLevel::Low, &["wells"])
    };

    InfrastructureRisk {
        risk_level,
        affected_infrastructure: strings(affected),
        corrosion_risk: if max_concentration > 2.0 {
            RiskLevel::High
        } else {
            RiskLevel::Low
        },
    }
}

/// Status implied by the simulated plume concentration.
pub fn plume_compliance_status(max_concentration: f64) -> ComplianceStatus {
    if max_concentration > 10.0 {
        ComplianceStatus::NonCompliant
    } else if max_concentration > 1.0 {
        ComplianceStatus::Marginal
    } else {
        ComplianceStatus::Compliant
    }
}

/// Status implied by the measured samples against their limits.
///
/// A detected contaminant with no defined limit cannot be judged compliant,
/// so it holds the verdict at `Marginal` or worse.
pub fn sample_compliance_status(profile: &ContaminantProfile) -> ComplianceStatus {
    let worst = profile.max_exceedance();
    if worst >= 10.0 {
        ComplianceStatus::NonCompliant
    } else if worst > 1.0 || profile.has_unlimited_detections() {
        ComplianceStatus::Marginal
    } else {
        ComplianceStatus::Compliant
    }
}

/// The worse of the plume and sample verdicts, with its violations and actions.
pub fn regulatory_compliance(max_concentration: f64, profile: &ContaminantProfile) -> RegulatoryCompliance {
    let status = plume_compliance_status(max_concentration).max(sample_compliance_status(profile));

    let (violations, actions): (&[&str], &[&str]) = match status {
        ComplianceStatus::NonCompliant => (
            &["exceeds_maximum_contaminant_levels", "requires_immediate_action"],
            &["immediate_notification", "emergency_response", "regulatory_reporting"],
        ),
        ComplianceStatus::Marginal => (
            &["approaching_regulatory_limits"],
            &["enhanced_monitoring", "corrective_action_plan"],
        ),
        ComplianceStatus::Compliant => (&[], &["routine_monitoring", "compliance_reporting"]),
    };

    let mut violations = strings(violations);
    if profile.has_unlimited_detections() {
        violations.push(NO_LIMIT_VIOLATION.to_string());
    }

    RegulatoryCompliance {
        status,
        violations,
        required_actions: strings(actions),
    }
}
