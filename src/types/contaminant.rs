//! Contaminant types: ContaminantSample, ContaminantCategory, RiskLevel,
//! exceedance and correlation records, ContaminantProfile

use serde::{Deserialize, Serialize};

// ============================================================================
// Risk Level
// ============================================================================

/// Four-step risk scale shared by samples, domains and the overall verdict.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low = 0,
    Moderate = 1,
    High = 2,
    Critical = 3,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    /// High or critical.
    pub fn is_elevated(&self) -> bool {
        *self >= RiskLevel::High
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Category / Source
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContaminantCategory {
    HeavyMetals,
    VolatileChemicals,
    Bacterial,
    Viral,
    /// Fallback for names outside the fixed vocabulary
    Chemical,
}

impl ContaminantCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContaminantCategory::HeavyMetals => "heavy_metals",
            ContaminantCategory::VolatileChemicals => "volatile_chemicals",
            ContaminantCategory::Bacterial => "bacterial",
            ContaminantCategory::Viral => "viral",
            ContaminantCategory::Chemical => "chemical",
        }
    }
}

/// Likely origin inferred from the contaminant category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContaminantSource {
    IndustrialWaste,
    PetroleumSpill,
    SepticSystem,
    WastewaterDischarge,
    UnknownSource,
}

// ============================================================================
// Regulatory Limit
// ============================================================================

/// Where a sample's limit came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LimitSource {
    /// Listed in the regulatory reference table
    Regulatory,
    /// Table miss; the configured fallback limit was applied
    DefaultFallback,
    /// No limit defined; exceedance is reported as 0 and is not compliance
    NoLimit,
}

/// Resolved limit for one contaminant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RegulatoryLimit {
    /// mg/L; 0 when `source` is `NoLimit`
    pub value_mg_l: f64,
    pub source: LimitSource,
}

// ============================================================================
// Sample
// ============================================================================

/// One measured contaminant. Created from raw sampling data, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContaminantSample {
    pub name: String,
    /// mg/L, >= 0
    pub concentration: f64,
    pub category: ContaminantCategory,
    pub regulatory_limit: RegulatoryLimit,
    /// concentration / limit, 0 when no limit is defined
    pub exceedance_factor: f64,
    pub risk_level: RiskLevel,
    pub source: ContaminantSource,
}

impl ContaminantSample {
    /// True only when a real or fallback limit exists and is exceeded.
    pub fn exceeds_limit(&self) -> bool {
        self.regulatory_limit.source != LimitSource::NoLimit && self.exceedance_factor > 1.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ExceedanceSeverity {
    Minor,
    Moderate,
    Major,
    Severe,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exceedance {
    pub contaminant: String,
    pub factor: f64,
    pub severity: ExceedanceSeverity,
}

/// Deterministic affinity between two measured contaminants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContaminantCorrelation {
    pub first: String,
    pub second: String,
    pub affinity: f64,
}

/// Output of the profile analyzer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContaminantProfile {
    pub samples: Vec<ContaminantSample>,
    pub exceedances: Vec<Exceedance>,
    pub correlations: Vec<ContaminantCorrelation>,
}

impl ContaminantProfile {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Any sample measured above zero that has no regulatory limit.
    pub fn has_unlimited_detections(&self) -> bool {
        self.samples
            .iter()
            .any(|s| s.regulatory_limit.source == LimitSource::NoLimit && s.concentration > 0.0)
    }

    /// Highest exceedance factor among samples that have a limit.
    pub fn max_exceedance(&self) -> f64 {
        self.samples
            .iter()
            .filter(|s| s.regulatory_limit.source != LimitSource::NoLimit)
            .map(|s| s.exceedance_factor)
            .fold(0.0, f64::max)
    }
}
