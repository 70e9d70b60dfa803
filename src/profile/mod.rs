//! Contaminant Profile Analyzer
//!
//! Turns raw `name -> concentration` measurements into typed samples:
//! category by fixed vocabulary, regulatory limit, exceedance factor,
//! per-contaminant risk level, likely source and pairwise affinity.
//! Everything here is deterministic.

mod regulatory;

pub use regulatory::RegulatoryTable;

use tracing::{debug, info};

use crate::config::defaults::{CROSS_CATEGORY_AFFINITY, SAME_CATEGORY_AFFINITY};
use crate::types::{
    ContaminantCategory, ContaminantCorrelation, ContaminantProfile, ContaminantSample,
    ContaminantSource, Exceedance, ExceedanceSeverity, LimitSource, RiskLevel,
};

const HEAVY_METALS: &[&str] = &["arsenic", "lead", "mercury", "cadmium", "chromium"];
const VOLATILE_CHEMICALS: &[&str] = &["benzene", "toluene", "xylene", "pce", "tce"];
const BACTERIAL: &[&str] = &["e.coli", "coliform", "bacteria"];
const VIRAL: &[&str] = &["norovirus", "hepatitis", "rotavirus"];

/// Classify a contaminant by name fragment. Unmatched names are `Chemical`.
pub fn categorize(name: &str) -> ContaminantCategory {
    let lower = name.to_lowercase();
    let matches = |vocab: &[&str]| vocab.iter().any(|v| lower.contains(v));

    if matches(HEAVY_METALS) {
        ContaminantCategory::HeavyMetals
    } else if matches(VOLATILE_CHEMICALS) {
        ContaminantCategory::VolatileChemicals
    } else if matches(BACTERIAL) {
        ContaminantCategory::Bacterial
    } else if matches(VIRAL) {
        ContaminantCategory::Viral
    } else {
        ContaminantCategory::Chemical
    }
}

/// Per-contaminant risk bucket: <1 low, [1,5) moderate, [5,10) high, >=10 critical.
pub fn risk_level(exceedance_factor: f64) -> RiskLevel {
    if exceedance_factor < 1.0 {
        RiskLevel::Low
    } else if exceedance_factor < 5.0 {
        RiskLevel::Moderate
    } else if exceedance_factor < 10.0 {
        RiskLevel::High
    } else {
        RiskLevel::Critical
    }
}

pub fn exceedance_severity(exceedance_factor: f64) -> ExceedanceSeverity {
    if exceedance_factor < 2.0 {
        ExceedanceSeverity::Minor
    } else if exceedance_factor < 5.0 {
        ExceedanceSeverity::Moderate
    } else if exceedance_factor < 10.0 {
        ExceedanceSeverity::Major
    } else {
        ExceedanceSeverity::Severe
    }
}

/// Likely origin of a contaminant category. Volatiles are chemicals here.
pub fn identify_source(category: ContaminantCategory) -> ContaminantSource {
    match category {
        ContaminantCategory::HeavyMetals => ContaminantSource::IndustrialWaste,
        ContaminantCategory::Chemical | ContaminantCategory::VolatileChemicals => {
            ContaminantSource::PetroleumSpill
        }
        ContaminantCategory::Bacterial => ContaminantSource::SepticSystem,
        ContaminantCategory::Viral => ContaminantSource::WastewaterDischarge,
    }
}

/// Volatile chemicals and unmatched chemicals share one family.
fn same_family(a: ContaminantCategory, b: ContaminantCategory) -> bool {
    let family = |c| match c {
        ContaminantCategory::VolatileChemicals => ContaminantCategory::Chemical,
        other => other,
    };
    family(a) == family(b)
}

/// Pairwise affinity for every unordered sample pair, in input order.
///
/// Same category family scores `SAME_CATEGORY_AFFINITY`, otherwise
/// `CROSS_CATEGORY_AFFINITY`.
pub fn correlate(samples: &[ContaminantSample]) -> Vec<ContaminantCorrelation> {
    let mut out = Vec::with_capacity(samples.len() * samples.len().saturating_sub(1) / 2);
    for (i, a) in samples.iter().enumerate() {
        for b in &samples[i + 1..] {
            let affinity = if same_family(a.category, b.category) {
                SAME_CATEGORY_AFFINITY
            } else {
                CROSS_CATEGORY_AFFINITY
            };
            out.push(ContaminantCorrelation {
                first: a.name.clone(),
                second: b.name.clone(),
                affinity,
            });
        }
    }
    out
}

/// Builds a `ContaminantProfile` against a regulatory table.
pub struct ContaminantProfileAnalyzer<'a> {
    table: &'a RegulatoryTable,
}

impl<'a> ContaminantProfileAnalyzer<'a> {
    pub fn new(table: &'a RegulatoryTable) -> Self {
        Self { table }
    }

    /// Build one immutable sample from a validated measurement.
    pub fn sample(&self, name: &str, concentration: f64) -> ContaminantSample {
        let category = categorize(name);
        let regulatory_limit = self.table.limit_for(name);
        let exceedance_factor = match regulatory_limit.source {
            LimitSource::NoLimit => 0.0,
            _ => concentration / regulatory_limit.value_mg_l,
        };

        ContaminantSample {
            name: name.to_string(),
            concentration,
            category,
            regulatory_limit,
            exceedance_factor,
            risk_level: risk_level(exceedance_factor),
            source: identify_source(category),
        }
    }

    /// Analyze all measurements (already validated non-negative and finite).
    pub fn analyze(&self, measurements: &[(String, f64)]) -> ContaminantProfile {
        info!(count = measurements.len(), "Analyzing contaminant profile");

        let samples: Vec<ContaminantSample> = measurements
            .iter()
            .map(|(name, c)| self.sample(name, *c))
            .collect();

        let exceedances = samples
            .iter()
            .filter(|s| s.exceeds_limit())
            .map(|s| Exceedance {
                contaminant: s.name.clone(),
                factor: s.exceedance_factor,
                severity: exceedance_severity(s.exceedance_factor),
            })
            .collect::<Vec<_>>();

        for s in &samples {
            debug!(
                contaminant = %s.name,
                category = s.category.as_str(),
                exceedance = s.exceedance_factor,
                risk = %s.risk_level,
                "Sample classified"
            );
        }

        let correlations = correlate(&samples);

        ContaminantProfile {
            samples,
            exceedances,
            correlations,
        }
    }
}
