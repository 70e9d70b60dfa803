//! plumewatch: Groundwater Contaminant Transport and Risk Engine
//!
//! Simulates a pollutant spreading through an aquifer and turns the result
//! into a decision-support package.
//!
//! ## Architecture
//!
//! - **Profile**: per-contaminant category, regulatory exceedance and risk level
//! - **Physics Engine**: aquifer parameters and the 3-D advection-dispersion solver
//! - **Plume**: correction model, plume statistics and contour
//! - **Risk**: domain sub-assessments and pluggable scoring
//! - **Economics / Remediation / Alerts**: downstream decision support
//! - **Pipeline**: `PollutionAnalyzer`, which runs all of the above for one request

pub mod alerts;
pub mod config;
pub mod economics;
pub mod error;
pub mod physics_engine;
pub mod pipeline;
pub mod plume;
pub mod profile;
pub mod remediation;
pub mod risk;
pub mod types;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
pub use pipeline::{analyze_async, PollutionAnalyzer};

pub use types::{
    Alert, AlertType, AnalysisRequest, AnalysisResult, AquiferType, ComplianceStatus,
    ContaminantProfile, EconomicAssessment, PlumePrediction, RemediationPlan, RiskAssessment,
    RiskLevel, SiteProfile,
};
