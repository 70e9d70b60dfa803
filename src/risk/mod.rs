//! Risk Assessment Engine
//!
//! Combines the plume prediction, site profile and contaminant profile into
//! domain sub-assessments, a scored overall verdict, the triggers behind it
//! and a fixed recommendation set.

pub mod domains;
pub mod scorer;

pub use scorer::{scorer_from_config, RiskFeatures, RiskScorer, RuleBasedScorer, TrainedScorer};

use tracing::info;

use crate::config::RiskConfig;
use crate::types::{
    ComplianceStatus, ContaminantProfile, DomainAssessments, PlumePrediction, RiskAssessment,
    RiskFactor, RiskLevel, SiteProfile,
};

/// Max concentration (mg/L) above which `HighConcentration` is raised.
const HIGH_CONCENTRATION_FACTOR_MG_L: f64 = 5.0;
/// Extent (m²) above which `LargePlume` is raised.
const LARGE_PLUME_FACTOR_M2: f64 = 10_000.0;

/// score < 25 low, < 50 moderate, < 75 high, else critical.
pub fn overall_risk(score: f64) -> RiskLevel {
    if score < 25.0 {
        RiskLevel::Low
    } else if score < 50.0 {
        RiskLevel::Moderate
    } else if score < 75.0 {
        RiskLevel::High
    } else {
        RiskLevel::Critical
    }
}

pub fn risk_factors(plume: &PlumePrediction, domains: &DomainAssessments) -> Vec<RiskFactor> {
    let mut factors = Vec::new();
    if plume.max_concentration > HIGH_CONCENTRATION_FACTOR_MG_L {
        factors.push(RiskFactor::HighConcentration);
    }
    if plume.extent_m2 > LARGE_PLUME_FACTOR_M2 {
        factors.push(RiskFactor::LargePlume);
    }
    if domains.human_health.risk_level == RiskLevel::High {
        factors.push(RiskFactor::SignificantHealthRisk);
    }
    if domains.ecological.risk_level == RiskLevel::High {
        factors.push(RiskFactor::HighEcologicalRisk);
    }
    if domains.infrastructure.risk_level == RiskLevel::High {
        factors.push(RiskFactor::HighInfrastructureRisk);
    }
    if domains.regulatory_compliance.status == ComplianceStatus::NonCompliant {
        factors.push(RiskFactor::RegulatoryViolation);
    }
    factors
}

pub fn recommendations(overall: RiskLevel, factors: &[RiskFactor]) -> Vec<String> {
    let base: &[&str] = match overall {
        RiskLevel::High | RiskLevel::Critical => &[
            "Implement immediate containment measures",
            "Establish emergency response protocols",
            "Conduct detailed site characterization",
            "Develop comprehensive remediation plan",
            "Implement real-time monitoring system",
        ],
        RiskLevel::Moderate => &[
            "Enhance monitoring program",
            "Implement source control measures",
            "Develop long-term remediation strategy",
            "Conduct risk assessment updates",
        ],
        RiskLevel::Low => &[
            "Continue routine monitoring",
            "Document baseline conditions",
            "Prepare contingency plans",
        ],
    };

    let mut out: Vec<String> = base.iter().map(|s| s.to_string()).collect();
    for factor in factors {
        let extra = match factor {
            RiskFactor::HighConcentration => "Implement source identification and control",
            RiskFactor::LargePlume => "Conduct comprehensive plume characterization",
            RiskFactor::SignificantHealthRisk => "Implement public health protection measures",
            _ => continue,
        };
        out.push(extra.to_string());
    }
    out
}

pub struct RiskAssessmentEngine<'a> {
    scorer: &'a dyn RiskScorer,
    config: &'a RiskConfig,
}

impl<'a> RiskAssessmentEngine<'a> {
    pub fn new(scorer: &'a dyn RiskScorer, config: &'a RiskConfig) -> Self {
        Self { scorer, config }
    }

    pub fn features(
        &self,
        plume: &PlumePrediction,
        site: &SiteProfile,
        profile: &ContaminantProfile,
    ) -> RiskFeatures {
        RiskFeatures {
            max_concentration: plume.max_concentration,
            avg_concentration: plume.avg_concentration,
            extent_m2: plume.extent_m2,
            depth_to_water: site.depth_to_water,
            aquifer_type: site.aquifer_type,
            contaminant_count: profile.samples.len(),
            population_density: site
                .population_density
                .unwrap_or(self.config.default_population_density),
        }
    }

    pub fn assess(
        &self,
        plume: &PlumePrediction,
        site: &SiteProfile,
        profile: &ContaminantProfile,
    ) -> RiskAssessment {
        let max = plume.max_concentration;
        let domains = DomainAssessments {
            human_health: domains::human_health(max),
            ecological: domains::ecological(max),
            infrastructure: domains::infrastructure(max),
            regulatory_compliance: domains::regulatory_compliance(max, profile),
        };

        let features = self.features(plume, site, profile);
        let risk_score = self.scorer.score(&features);
        let overall = overall_risk(risk_score);
        let factors = risk_factors(plume, &domains);
        let recommendations = recommendations(overall, &factors);

        info!(
            site = %site.name,
            scorer = self.scorer.name(),
            risk_score,
            overall = %overall,
            compliance = domains.regulatory_compliance.status.as_str(),
            factors = factors.len(),
            "Risk assessed"
        );

        RiskAssessment {
            domains,
            overall_risk: overall,
            risk_score,
            scorer: self.scorer.name().to_string(),
            risk_factors: factors,
            recommendations,
        }
    }
}
