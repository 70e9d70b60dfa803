//! End-to-end analysis of one request.
//!
//! ```text
//! request ─► validate ─► profile ─► resolve aquifer ─► per-contaminant transport
//!        ─► plume (per contaminant + summed field) ─► risk ─► economics
//!        ─► remediation ─► alerts ─► AnalysisResult
//! ```
//!
//! Nothing is shared between requests except the read-only config and
//! models, so one `PollutionAnalyzer` can serve many workers.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::alerts::AlertGenerator;
use crate::config::AnalysisConfig;
use crate::economics::EconomicImpactEstimator;
use crate::error::{AnalysisError, Result};
use crate::physics_engine::{
    ConcentrationField, HydrogeologicalParameterResolver, TransportSimulator,
};
use crate::plume::{correction_from_config, CorrectionModel, PlumePredictor};
use crate::profile::{ContaminantProfileAnalyzer, RegulatoryTable};
use crate::remediation::RemediationPlanner;
use crate::risk::{scorer_from_config, RiskAssessmentEngine, RiskScorer};
use crate::types::{AnalysisRequest, AnalysisResult, ContaminantPlume};

/// Owns the validated configuration and the pluggable models.
pub struct PollutionAnalyzer {
    config: AnalysisConfig,
    table: RegulatoryTable,
    scorer: Box<dyn RiskScorer>,
    correction: Box<dyn CorrectionModel>,
}

impl PollutionAnalyzer {
    /// Validate the config and build the configured scorer and correction model.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        let scorer = scorer_from_config(&config.risk)?;
        let correction = correction_from_config(&config.plume.correction);
        Self::with_models(config, scorer, correction)
    }

    /// Build with caller-supplied models in place of the configured ones.
    pub fn with_models(
        config: AnalysisConfig,
        scorer: Box<dyn RiskScorer>,
        correction: Box<dyn CorrectionModel>,
    ) -> Result<Self> {
        config.validate()?;
        let table = RegulatoryTable::from_config(&config.regulatory)?;
        info!(
            scorer = scorer.name(),
            correction = correction.name(),
            limits = table.len(),
            "Pollution analyzer ready"
        );
        Ok(Self {
            config,
            table,
            scorer,
            correction,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the full pipeline. Any failure aborts the whole analysis; no
    /// partial result is produced.
    pub fn analyze(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult> {
        let started = Instant::now();
        let validated = request.validate()?;
        let site = &validated.site;

        info!(
            analysis_id = %validated.analysis_id,
            site = %site.name,
            aquifer = %site.aquifer_type,
            samples = validated.measurements.len(),
            "Starting groundwater analysis"
        );

        if cancel.is_cancelled() {
            return Err(AnalysisError::Cancelled { step: 0 });
        }

        let profile = ContaminantProfileAnalyzer::new(&self.table).analyze(&validated.measurements);

        let params = HydrogeologicalParameterResolver::new(&self.config.hydrogeology)
            .resolve(site.aquifer_type);
        let simulator = TransportSimulator::new(&self.config, params)?;
        let predictor = PlumePredictor::new(
            &self.config.plume,
            self.correction.as_ref(),
            self.config.simulation.hydraulic_gradient,
        );

        let mut aggregate = ConcentrationField::zeros(simulator.dims(), simulator.spacing());
        let mut contaminant_plumes = Vec::new();

        for sample in profile.samples.iter().filter(|s| s.concentration > 0.0) {
            info!(contaminant = %sample.name, concentration = sample.concentration, "Simulating transport");
            let outcome = simulator.simulate(sample.concentration, cancel)?;
            let prediction = predictor.predict(&outcome.field, &params)?;
            aggregate.accumulate(&outcome.field)?;
            contaminant_plumes.push(ContaminantPlume {
                contaminant: sample.name.clone(),
                source_concentration: sample.concentration,
                prediction,
                steps: outcome.steps,
                dt_days: outcome.dt_days,
            });
        }
        debug!(runs = contaminant_plumes.len(), "Transport runs complete");

        let plume = predictor.predict(&aggregate, &params)?;
        drop(aggregate);

        let risk = RiskAssessmentEngine::new(self.scorer.as_ref(), &self.config.risk)
            .assess(&plume, site, &profile);
        let economics =
            EconomicImpactEstimator::new(&self.config.economics).estimate(&plume, risk.overall_risk);
        let remediation = RemediationPlanner::new(&self.config.remediation).plan(
            &plume,
            risk.overall_risk,
            &site.coordinates,
        );
        let alerts = AlertGenerator::new(&self.config.alerts).generate(&plume, &risk);

        let processing_time_secs = started.elapsed().as_secs_f64();
        info!(
            analysis_id = %validated.analysis_id,
            overall = %risk.overall_risk,
            total_loss = economics.total_loss,
            alerts = alerts.len(),
            processing_time_secs,
            "Analysis complete"
        );

        Ok(AnalysisResult {
            analysis_id: validated.analysis_id,
            site_name: site.name.clone(),
            contaminants_of_concern: validated.contaminants_of_concern,
            profile,
            hydrogeology: params,
            contaminant_plumes,
            plume,
            risk,
            economics,
            remediation,
            alerts,
            processing_time_secs,
            analyzed_at: Utc::now(),
        })
    }
}

/// Run `analyze` on tokio's blocking pool so async hosts never stall.
pub async fn analyze_async(
    analyzer: Arc<PollutionAnalyzer>,
    request: AnalysisRequest,
    cancel: CancellationToken,
) -> Result<AnalysisResult> {
    let handle = tokio::task::spawn_blocking(move || analyzer.analyze(&request, &cancel));
    match handle.await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(_) => Err(AnalysisError::Cancelled { step: 0 }),
    }
}
