//! Risk scoring: the typed feature contract and the two scorer variants.

use crate::config::validation::MONOTONIC_RISK_FEATURES;
use crate::config::defaults::{
    SCORE_CONCENTRATION_WEIGHT, SCORE_CONTAMINANT_WEIGHT, SCORE_EXTENT_DIVISOR,
};
use crate::config::{RiskConfig, ScorerKind, TrainedModelParams};
use crate::error::{AnalysisError, Result};
use crate::types::AquiferType;

/// Length of `RiskFeatures::to_vector`.
pub const RISK_FEATURE_COUNT: usize = 9;

/// Inputs to risk scoring, one named field per feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskFeatures {
    /// mg/L
    pub max_concentration: f64,
    /// mg/L
    pub avg_concentration: f64,
    /// m²
    pub extent_m2: f64,
    /// m
    pub depth_to_water: f64,
    pub aquifer_type: AquiferType,
    /// Number of measured contaminants
    pub contaminant_count: usize,
    /// people/km²
    pub population_density: f64,
}

impl RiskFeatures {
    /// Fixed feature order consumed by trained models:
    /// `[max, avg, extent, depth, confined, unconfined, karst, count, population]`.
    /// The aquifer type is one-hot encoded.
    pub fn to_vector(&self) -> [f64; RISK_FEATURE_COUNT] {
        let one_hot = |t: AquiferType| if self.aquifer_type == t { 1.0 } else { 0.0 };
        [
            self.max_concentration,
            self.avg_concentration,
            self.extent_m2,
            self.depth_to_water,
            one_hot(AquiferType::Confined),
            one_hot(AquiferType::Unconfined),
            one_hot(AquiferType::Karst),
            self.contaminant_count as f64,
            self.population_density,
        ]
    }
}

/// Produces a risk score in [0, 100]. Implementations must be non-decreasing
/// in max concentration, extent and contaminant count.
pub trait RiskScorer: Send + Sync {
    fn name(&self) -> &'static str;

    fn score(&self, features: &RiskFeatures) -> f64;
}

/// `clamp(0, 100, 10·max_conc + extent/1000 + 5·contaminant_count)`
pub struct RuleBasedScorer;

impl RiskScorer for RuleBasedScorer {
    fn name(&self) -> &'static str {
        "rule_based"
    }

    fn score(&self, f: &RiskFeatures) -> f64 {
        let raw = SCORE_CONCENTRATION_WEIGHT * f.max_concentration
            + f.extent_m2 / SCORE_EXTENT_DIVISOR
            + SCORE_CONTAMINANT_WEIGHT * f.contaminant_count as f64;
        clamp_score(raw)
    }
}

/// Linear model trained offline, standardized with fixed reference statistics.
#[derive(Debug, Clone)]
pub struct TrainedScorer {
    intercept: f64,
    weights: [f64; RISK_FEATURE_COUNT],
    means: [f64; RISK_FEATURE_COUNT],
    scales: [f64; RISK_FEATURE_COUNT],
}

impl TrainedScorer {
    /// Rejects parameters that would break the monotonicity contract or
    /// divide by a non-positive scale.
    pub fn from_params(params: &TrainedModelParams) -> Result<Self> {
        for &idx in MONOTONIC_RISK_FEATURES.iter() {
            if params.weights[idx] < 0.0 {
                return Err(AnalysisError::Configuration(format!(
                    "trained risk model weight {idx} is negative ({})",
                    params.weights[idx]
                )));
            }
        }
        if let Some(idx) = params.scales.iter().position(|s| !(s.is_finite() && *s > 0.0)) {
            return Err(AnalysisError::Configuration(format!(
                "trained risk model scale {idx} must be positive ({})",
                params.scales[idx]
            )));
        }
        Ok(Self {
            intercept: params.intercept,
            weights: params.weights,
            means: params.means,
            scales: params.scales,
        })
    }
}

impl RiskScorer for TrainedScorer {
    fn name(&self) -> &'static str {
        "trained"
    }

    fn score(&self, f: &RiskFeatures) -> f64 {
        let x = f.to_vector();
        let raw = self.intercept
            + (0..RISK_FEATURE_COUNT)
                .map(|i| self.weights[i] * (x[i] - self.means[i]) / self.scales[i])
                .sum::<f64>();
        clamp_score(raw)
    }
}

fn clamp_score(raw: f64) -> f64 {
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 100.0)
    }
}

/// Build the configured scorer. Selecting `trained` without parameters is an error.
pub fn scorer_from_config(config: &RiskConfig) -> Result<Box<dyn RiskScorer>> {
    match config.scorer {
        ScorerKind::RuleBased => Ok(Box::new(RuleBasedScorer)),
        ScorerKind::Trained => {
            let params = config.trained_model.as_ref().ok_or_else(|| {
                AnalysisError::Configuration(
                    "risk.scorer = \"trained\" requires [risk.trained_model]".to_string(),
                )
            })?;
            Ok(Box::new(TrainedScorer::from_params(params)?))
        }
    }
}
