//! Shared data structures for the groundwater pollution pipeline
//!
//! - Site: SiteProfile, AnalysisRequest (validated into ValidatedRequest)
//! - Contaminant: ContaminantSample, ContaminantProfile
//! - Plume: HydrogeologicalParameters, PlumePrediction
//! - Assessment: RiskAssessment, EconomicAssessment, RemediationPlan, Alert,
//!   AnalysisResult

mod assessment;
mod contaminant;
mod plume;
mod site;

pub use assessment::*;
pub use contaminant::*;
pub use plume::*;
pub use site::*;
