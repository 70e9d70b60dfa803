//! Decision-support types: RiskAssessment, EconomicAssessment,
//! RemediationPlan, Alert, AnalysisResult

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    ContaminantPlume, ContaminantProfile, HydrogeologicalParameters, PlumePrediction, RiskLevel,
};

// ============================================================================
// Risk
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant = 0,
    Marginal = 1,
    NonCompliant = 2,
}

impl ComplianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "compliant",
            ComplianceStatus::Marginal => "marginal",
            ComplianceStatus::NonCompliant => "non_compliant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HumanHealthRisk {
    pub risk_level: RiskLevel,
    pub exposure_pathways: Vec<String>,
    pub vulnerable_populations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EcologicalRisk {
    pub risk_level: RiskLevel,
    pub affected_species: Vec<String>,
    pub ecosystem_services_impact: RiskLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InfrastructureRisk {
    pub risk_level: RiskLevel,
    pub affected_infrastructure: Vec<String>,
    pub corrosion_risk: RiskLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegulatoryCompliance {
    pub status: ComplianceStatus,
    pub violations: Vec<String>,
    pub required_actions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainAssessments {
    pub human_health: HumanHealthRisk,
    pub ecological: EcologicalRisk,
    pub infrastructure: InfrastructureRisk,
    pub regulatory_compliance: RegulatoryCompliance,
}

/// Trigger that raised the risk picture.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    HighConcentration,
    LargePlume,
    SignificantHealthRisk,
    HighEcologicalRisk,
    HighInfrastructureRisk,
    RegulatoryViolation,
}

impl RiskFactor {
    pub fn description(&self) -> &'static str {
        match self {
            RiskFactor::HighConcentration => "High contaminant concentrations detected",
            RiskFactor::LargePlume => "Large contaminant plume extent",
            RiskFactor::SignificantHealthRisk => "Significant human health risk",
            RiskFactor::HighEcologicalRisk => "High ecological risk",
            RiskFactor::HighInfrastructureRisk => "High infrastructure risk",
            RiskFactor::RegulatoryViolation => "Regulatory violations detected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub domains: DomainAssessments,
    pub overall_risk: RiskLevel,
    /// Always within [0, 100]
    pub risk_score: f64,
    /// Name of the scorer that produced `risk_score`
    pub scorer: String,
    pub risk_factors: Vec<RiskFactor>,
    pub recommendations: Vec<String>,
}

// ============================================================================
// Economics
// ============================================================================

/// Cost breakdown in USD.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EconomicAssessment {
    pub remediation_cost: f64,
    pub property_value_loss: f64,
    pub monitoring_costs: f64,
    pub legal_costs: f64,
    pub total_loss: f64,
}

// ============================================================================
// Remediation
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RemediationMethod {
    PumpAndTreat,
    InSituChemicalOxidation,
    MonitoredNaturalAttenuation,
    EnhancedBioaugmentation,
    Phytoremediation,
    SoilVaporExtraction,
}

impl RemediationMethod {
    /// Success rate before plume adjustments.
    pub fn base_success_rate(&self) -> f64 {
        match self {
            RemediationMethod::PumpAndTreat => 0.85,
            RemediationMethod::InSituChemicalOxidation => 0.90,
            RemediationMethod::MonitoredNaturalAttenuation => 0.70,
            RemediationMethod::EnhancedBioaugmentation => 0.80,
            RemediationMethod::Phytoremediation => 0.60,
            RemediationMethod::SoilVaporExtraction => 0.75,
        }
    }

    /// Treatment cost ($/m² of plume).
    pub fn unit_cost(&self) -> f64 {
        match self {
            RemediationMethod::PumpAndTreat => 200.0,
            RemediationMethod::InSituChemicalOxidation => 300.0,
            RemediationMethod::MonitoredNaturalAttenuation => 50.0,
            RemediationMethod::EnhancedBioaugmentation => 150.0,
            RemediationMethod::Phytoremediation => 100.0,
            RemediationMethod::SoilVaporExtraction => 250.0,
        }
    }

    pub fn implementation_steps(&self) -> &'static [&'static str] {
        match self {
            RemediationMethod::PumpAndTreat => &[
                "Install extraction wells",
                "Set up treatment system",
                "Begin extraction and treatment",
                "Monitor treatment efficiency",
                "Adjust system as needed",
            ],
            RemediationMethod::InSituChemicalOxidation => &[
                "Characterize subsurface conditions",
                "Design injection system",
                "Inject oxidizing agents",
                "Monitor reaction progress",
                "Assess treatment effectiveness",
            ],
            _ => &[
                "Site characterization",
                "System design",
                "Implementation",
                "Monitoring",
                "Performance assessment",
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MonitoringFrequency {
    Weekly,
    Monthly,
    Quarterly,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MonitoringParameter {
    ContaminantConcentration,
    GroundwaterLevel,
    FlowDirection,
    WaterQuality,
}

impl MonitoringParameter {
    pub fn analytical_method(&self) -> &'static str {
        match self {
            MonitoringParameter::ContaminantConcentration => "GC-MS",
            MonitoringParameter::GroundwaterLevel => "pressure_transducer",
            MonitoringParameter::FlowDirection => "tracer_test",
            MonitoringParameter::WaterQuality => "multi_parameter_probe",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitoredParameter {
    pub parameter: MonitoringParameter,
    pub analytical_method: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SamplingLocation {
    pub lat: f64,
    pub lon: f64,
    pub depth_m: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitoringPlan {
    pub frequency: MonitoringFrequency,
    pub parameters: Vec<MonitoredParameter>,
    pub sampling_locations: Vec<SamplingLocation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemediationPlan {
    pub primary_method: RemediationMethod,
    pub secondary_method: RemediationMethod,
    pub timeline_months: u32,
    pub success_probability: f64,
    pub monitoring_plan: MonitoringPlan,
    /// USD, extent x primary method unit cost
    pub cost_estimate: f64,
    pub implementation_steps: Vec<String>,
}

// ============================================================================
// Alerts
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    CriticalPollution,
    HighConcentration,
    LargePlume,
}

/// Alert value object; delivery is the caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub alert_type: AlertType,
    pub severity: RiskLevel,
    pub message: String,
    /// m²
    pub affected_area: f64,
    pub recommendation: String,
}

// ============================================================================
// Aggregate Result
// ============================================================================

/// Everything one analysis produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis_id: String,
    pub site_name: String,
    pub contaminants_of_concern: Vec<String>,
    pub profile: ContaminantProfile,
    pub hydrogeology: HydrogeologicalParameters,
    pub contaminant_plumes: Vec<ContaminantPlume>,
    /// Plume of the summed field over all contaminants
    pub plume: PlumePrediction,
    pub risk: RiskAssessment,
    pub economics: EconomicAssessment,
    pub remediation: RemediationPlan,
    pub alerts: Vec<Alert>,
    pub processing_time_secs: f64,
    pub analyzed_at: DateTime<Utc>,
}
