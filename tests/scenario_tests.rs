//! End-to-end Analysis Tests
//!
//! Drives `PollutionAnalyzer` with complete requests on a small grid and
//! checks the decision-support output against known site scenarios.

use std::collections::BTreeMap;
use std::sync::Arc;

use plumewatch::config::AnalysisConfig;
use plumewatch::physics_engine::HydrogeologicalParameterResolver;
use plumewatch::plume::IdentityCorrection;
use plumewatch::risk::{RiskFeatures, RiskScorer};
use plumewatch::types::{ContaminantSource, Coordinates, LimitSource, SamplingMethod};
use plumewatch::{
    analyze_async, AlertType, AnalysisError, AnalysisRequest, AnalysisResult, AquiferType,
    ComplianceStatus, PollutionAnalyzer, RiskLevel,
};
use tokio_util::sync::CancellationToken;

// ============================================================================
// Fixtures
// ============================================================================

fn small_config() -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    config.grid.nx = 21;
    config.grid.ny = 21;
    config.grid.nz = 5;
    config
}

fn request(samples: &[(&str, f64)]) -> AnalysisRequest {
    AnalysisRequest {
        id: Some("scenario".to_string()),
        site_name: "Municipal Well Field".to_string(),
        coordinates: Coordinates { lat: 40.0, lon: -75.0 },
        aquifer_type: "unconfined".to_string(),
        depth_to_water: 10.0,
        sampling_method: SamplingMethod::GrabSample,
        contaminants_of_concern: vec!["heavy_metals".to_string()],
        sampling_data: samples
            .iter()
            .map(|(name, c)| (name.to_string(), *c))
            .collect::<BTreeMap<_, _>>(),
        population_density: None,
    }
}

fn analyze(samples: &[(&str, f64)]) -> AnalysisResult {
    let analyzer = PollutionAnalyzer::new(small_config()).unwrap();
    analyzer
        .analyze(&request(samples), &CancellationToken::new())
        .unwrap()
}

// ============================================================================
// Site Scenarios
// ============================================================================

#[test]
fn arsenic_at_five_times_limit_is_high_and_not_compliant() {
    let result = analyze(&[("arsenic", 0.05)]);

    let sample = &result.profile.samples[0];
    assert_eq!(sample.name, "arsenic");
    assert!((sample.exceedance_factor - 5.0).abs() < 1e-9);
    assert_eq!(sample.risk_level, RiskLevel::High);

    assert_eq!(result.contaminant_plumes.len(), 1);
    assert!(result.plume.max_concentration > 0.0);
    assert_ne!(
        result.risk.domains.regulatory_compliance.status,
        ComplianceStatus::Compliant
    );
    assert!(!result.risk.domains.regulatory_compliance.violations.is_empty());
}

#[test]
fn no_samples_yields_empty_plume_and_no_alerts() {
    let result = analyze(&[]);

    assert!(result.profile.is_empty());
    assert!(result.contaminant_plumes.is_empty());
    assert_eq!(result.plume.extent_m2, 0.0);
    assert_eq!(result.plume.max_concentration, 0.0);
    assert_eq!(result.risk.risk_score, 0.0);
    assert_eq!(result.risk.overall_risk, RiskLevel::Low);
    assert!(result.alerts.is_empty());
}

#[test]
fn heavy_source_raises_critical_and_concentration_alerts() {
    let result = analyze(&[("benzene", 20.0)]);

    assert_eq!(result.risk.overall_risk, RiskLevel::Critical);
    let kinds: Vec<AlertType> = result.alerts.iter().map(|a| a.alert_type).collect();
    assert_eq!(kinds[0], AlertType::CriticalPollution);
    assert!(kinds.contains(&AlertType::HighConcentration));
    assert!(result.alerts.iter().all(|a| a.severity == RiskLevel::Critical));
}

#[test]
fn karst_parameters_scale_from_base() {
    let config = small_config();
    let base = &config.hydrogeology;
    let karst = HydrogeologicalParameterResolver::new(base).resolve(AquiferType::Karst);

    assert!((karst.hydraulic_conductivity - base.hydraulic_conductivity * 10.0).abs() < 1e-15);
    assert!((karst.dispersivity - base.dispersivity * 5.0).abs() < 1e-12);
    assert_eq!(karst.porosity, base.porosity);
    assert_eq!(karst.retardation_factor, base.retardation_factor);
}

#[test]
fn zero_concentration_sample_is_profiled_but_not_simulated() {
    let result = analyze(&[("lead", 0.0), ("arsenic", 0.02)]);
    assert_eq!(result.profile.samples.len(), 2);
    assert_eq!(result.contaminant_plumes.len(), 1);
    assert_eq!(result.contaminant_plumes[0].contaminant, "arsenic");
}

#[test]
fn unlimited_contaminant_is_never_reported_compliant() {
    let mut config = small_config();
    config.regulatory.default_limit_mg_l = 0.0;
    let analyzer = PollutionAnalyzer::new(config).unwrap();
    let result = analyzer
        .analyze(&request(&[("perchlorate", 0.5)]), &CancellationToken::new())
        .unwrap();

    assert_eq!(
        result.profile.samples[0].regulatory_limit.source,
        LimitSource::NoLimit
    );
    let compliance = &result.risk.domains.regulatory_compliance;
    assert_ne!(compliance.status, ComplianceStatus::Compliant);
    assert!(compliance
        .violations
        .contains(&"no_regulatory_limit_defined".to_string()));
}

#[test]
fn volatile_and_generic_chemicals_share_petroleum_source() {
    let result = analyze(&[("benzene", 0.02), ("nitrate", 5.0)]);

    assert!(result
        .profile
        .samples
        .iter()
        .all(|s| s.source == ContaminantSource::PetroleumSpill));
    assert!((result.profile.correlations[0].affinity - 0.7).abs() < 1e-12);
}

// ============================================================================
// Determinism and Monotonicity
// ============================================================================

#[test]
fn repeated_runs_produce_identical_plumes() {
    let a = analyze(&[("arsenic", 0.05), ("benzene", 0.02)]);
    let b = analyze(&[("arsenic", 0.05), ("benzene", 0.02)]);

    assert_eq!(a.plume, b.plume);
    assert_eq!(a.risk.risk_score, b.risk.risk_score);
    assert_eq!(a.economics.total_loss, b.economics.total_loss);
}

#[test]
fn higher_source_never_lowers_risk_or_cost() {
    let low = analyze(&[("arsenic", 0.05)]);
    let high = analyze(&[("arsenic", 0.5)]);

    assert!(high.plume.max_concentration >= low.plume.max_concentration);
    assert!(high.plume.extent_m2 >= low.plume.extent_m2);
    assert!(high.risk.risk_score >= low.risk.risk_score);
    assert!(high.risk.overall_risk >= low.risk.overall_risk);
    assert!(high.economics.total_loss >= low.economics.total_loss);
}

#[test]
fn aggregate_plume_covers_every_contaminant() {
    let result = analyze(&[("arsenic", 0.05), ("benzene", 0.02)]);
    for plume in &result.contaminant_plumes {
        assert!(result.plume.max_concentration >= plume.prediction.max_concentration);
        assert!(result.plume.detected_cells >= plume.prediction.detected_cells);
    }
}

// ============================================================================
// Failure Modes
// ============================================================================

#[test]
fn negative_concentration_rejected_before_simulation() {
    let analyzer = PollutionAnalyzer::new(small_config()).unwrap();
    let err = analyzer
        .analyze(&request(&[("lead", -0.1)]), &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Validation(_)));
}

#[test]
fn unknown_aquifer_type_is_configuration_error() {
    let analyzer = PollutionAnalyzer::new(small_config()).unwrap();
    let mut req = request(&[("arsenic", 0.05)]);
    req.aquifer_type = "fractured_basalt".to_string();
    let err = analyzer
        .analyze(&req, &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Configuration(_)));
}

#[test]
fn cancelled_token_aborts_without_result() {
    let analyzer = PollutionAnalyzer::new(small_config()).unwrap();
    let token = CancellationToken::new();
    token.cancel();
    let err = analyzer
        .analyze(&request(&[("arsenic", 0.05)]), &token)
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Cancelled { .. }));
    assert_eq!(err.status(), "cancelled");
}

#[test]
fn invalid_config_rejected_at_construction() {
    let mut config = small_config();
    config.hydrogeology.porosity = 0.0;
    assert!(PollutionAnalyzer::new(config).is_err());
}

// ============================================================================
// Pluggable Models
// ============================================================================

struct FixedScorer(f64);

impl RiskScorer for FixedScorer {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn score(&self, _features: &RiskFeatures) -> f64 {
        self.0
    }
}

#[test]
fn injected_scorer_drives_overall_risk() {
    let analyzer = PollutionAnalyzer::with_models(
        small_config(),
        Box::new(FixedScorer(60.0)),
        Box::new(IdentityCorrection),
    )
    .unwrap();
    let result = analyzer
        .analyze(&request(&[("arsenic", 0.05)]), &CancellationToken::new())
        .unwrap();

    assert_eq!(result.risk.scorer, "fixed");
    assert_eq!(result.risk.risk_score, 60.0);
    assert_eq!(result.risk.overall_risk, RiskLevel::High);
    assert_eq!(result.alerts[0].alert_type, AlertType::CriticalPollution);
}

// ============================================================================
// Async Wrapper
// ============================================================================

#[tokio::test]
async fn async_analysis_matches_blocking_analysis() {
    let analyzer = Arc::new(PollutionAnalyzer::new(small_config()).unwrap());
    let req = request(&[("arsenic", 0.05)]);

    let blocking = analyzer.analyze(&req, &CancellationToken::new()).unwrap();
    let awaited = analyze_async(Arc::clone(&analyzer), req, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(awaited.analysis_id, "scenario");
    assert_eq!(awaited.plume, blocking.plume);
    assert_eq!(awaited.risk.overall_risk, blocking.risk.overall_risk);
}
