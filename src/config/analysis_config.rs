//! Analysis Configuration - every simulation and scoring constant as a TOML value
//!
//! Each struct implements `Default` with the reference values of the
//! groundwater transport model, so a missing config file yields the standard
//! 100 x 100 x 20 grid, 0.1-day step and 365-day horizon.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one analysis deployment.
///
/// Load with `AnalysisConfig::load()` which searches:
/// 1. `$PLUMEWATCH_CONFIG` env var
/// 2. `./plumewatch.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Transport grid geometry
    #[serde(default)]
    pub grid: GridConfig,

    /// Time stepping and stability policy
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Base aquifer parameters before aquifer-type adjustment
    #[serde(default)]
    pub hydrogeology: HydrogeologyConfig,

    /// Regulatory limit reference table
    #[serde(default)]
    pub regulatory: RegulatoryConfig,

    /// Plume extraction and correction model
    #[serde(default)]
    pub plume: PlumeConfig,

    /// Risk scorer selection
    #[serde(default)]
    pub risk: RiskConfig,

    /// Cost model
    #[serde(default)]
    pub economics: EconomicsConfig,

    /// Remediation planning bounds
    #[serde(default)]
    pub remediation: RemediationConfig,

    /// Alert thresholds
    #[serde(default)]
    pub alerts: AlertConfig,
}

impl AnalysisConfig {
    /// Load configuration using the standard search order:
    /// 1. `$PLUMEWATCH_CONFIG` environment variable
    /// 2. `./plumewatch.toml` in the current working directory
    /// 3. Built-in defaults
    ///
    /// A missing file falls through to the next source. A file that exists
    /// but fails to parse or validate is an error; defaults never stand in
    /// for a config the user supplied.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                let config = Self::load_from_file(&p)?;
                info!(path = %p.display(), "Loaded analysis config from PLUMEWATCH_CONFIG");
                return Ok(config);
            }
            warn!(path = %path, "PLUMEWATCH_CONFIG points to non-existent file, falling back");
        }

        let local = PathBuf::from(defaults::LOCAL_CONFIG_FILE);
        if local.exists() {
            let config = Self::load_from_file(&local)?;
            info!("Loaded analysis config from ./plumewatch.toml");
            return Ok(config);
        }

        info!("No plumewatch.toml found, using built-in defaults");
        Ok(Self::default())
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys produce warnings only; range violations are errors.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Analysis config saved");
        Ok(())
    }

    /// Validate all values for physical plausibility and internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if self.remediation.min_success_probability > self.remediation.max_success_probability {
            errors.push(format!(
                "remediation.min_success_probability ({:.2}) must be <= max_success_probability ({:.2})",
                self.remediation.min_success_probability, self.remediation.max_success_probability
            ));
        }

        for key in super::validation::non_finite_keys(self) {
            errors.push(format!("{key} must be a finite number"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {e}"),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {e}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Grid
// ============================================================================

/// Finite-difference grid geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_nx")]
    pub nx: usize,
    #[serde(default = "default_ny")]
    pub ny: usize,
    #[serde(default = "default_nz")]
    pub nz: usize,

    /// Cell spacing along the flow axis (m)
    #[serde(default = "default_dx")]
    pub dx_m: f64,
    /// Transverse cell spacing (m)
    #[serde(default = "default_dy")]
    pub dy_m: f64,
    /// Vertical cell spacing (m)
    #[serde(default = "default_dz")]
    pub dz_m: f64,
}

fn default_nx() -> usize { 100 }
fn default_ny() -> usize { 100 }
fn default_nz() -> usize { 20 }
fn default_dx() -> f64 { 10.0 }
fn default_dy() -> f64 { 10.0 }
fn default_dz() -> f64 { 1.0 }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            nx: default_nx(),
            ny: default_ny(),
            nz: default_nz(),
            dx_m: default_dx(),
            dy_m: default_dy(),
            dz_m: default_dz(),
        }
    }
}

// ============================================================================
// Simulation
// ============================================================================

/// What to do when the requested time step violates the explicit-scheme bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StabilityPolicy {
    /// Shrink dt to the stable bound (times the safety factor)
    #[default]
    Reduce,
    /// Refuse to run
    Fail,
}

/// Time stepping parameters for the forward-Euler transport solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Time step (days)
    #[serde(default = "default_dt")]
    pub dt_days: f64,

    /// Simulation horizon (days)
    #[serde(default = "default_horizon")]
    pub horizon_days: f64,

    /// Hydraulic gradient along the flow axis (m/m)
    #[serde(default = "default_gradient")]
    pub hydraulic_gradient: f64,

    #[serde(default)]
    pub stability_policy: StabilityPolicy,

    /// Fraction of the stable dt used when reducing (0-1]
    #[serde(default = "default_safety_factor")]
    pub stability_safety_factor: f64,

    /// Upper bound on steps after dt reduction
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Wall-clock budget per transport run; unset = unbounded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Divide the transport operator by the retardation factor
    #[serde(default)]
    pub apply_retardation: bool,

    /// Fail instead of warn when the plume reaches the Dirichlet edge
    #[serde(default)]
    pub strict_domain_boundary: bool,

    /// Steps between debug progress lines
    #[serde(default = "default_progress_interval")]
    pub progress_log_interval: usize,
}

fn default_dt() -> f64 { 0.1 }
fn default_horizon() -> f64 { 365.0 }
fn default_gradient() -> f64 { 0.001 }
fn default_safety_factor() -> f64 { 0.9 }
fn default_max_steps() -> usize { 1_000_000 }
fn default_progress_interval() -> usize { 365 }

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt_days: default_dt(),
            horizon_days: default_horizon(),
            hydraulic_gradient: default_gradient(),
            stability_policy: StabilityPolicy::default(),
            stability_safety_factor: default_safety_factor(),
            max_steps: default_max_steps(),
            timeout_secs: None,
            apply_retardation: false,
            strict_domain_boundary: false,
            progress_log_interval: default_progress_interval(),
        }
    }
}

// ============================================================================
// Hydrogeology
// ============================================================================

/// Base transport parameters, adjusted per aquifer type at resolve time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydrogeologyConfig {
    /// Hydraulic conductivity (m/s)
    #[serde(default = "default_conductivity")]
    pub hydraulic_conductivity: f64,

    /// Effective porosity (fraction)
    #[serde(default = "default_porosity")]
    pub porosity: f64,

    /// Longitudinal dispersivity (m)
    #[serde(default = "default_dispersivity")]
    pub dispersivity: f64,

    /// Sorption retardation (dimensionless, >= 1)
    #[serde(default = "default_retardation")]
    pub retardation_factor: f64,
}

fn default_conductivity() -> f64 { 1e-4 }
fn default_porosity() -> f64 { 0.25 }
fn default_dispersivity() -> f64 { 10.0 }
fn default_retardation() -> f64 { 1.5 }

impl Default for HydrogeologyConfig {
    fn default() -> Self {
        Self {
            hydraulic_conductivity: default_conductivity(),
            porosity: default_porosity(),
            dispersivity: default_dispersivity(),
            retardation_factor: default_retardation(),
        }
    }
}

// ============================================================================
// Regulatory Reference Data
// ============================================================================

/// Contaminant limit table (mg/L), keyed by lowercase contaminant name.
///
/// A limit <= 0 marks the contaminant as having no regulatory limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegulatoryConfig {
    /// Limit applied to contaminants missing from the table; <= 0 disables it
    #[serde(default = "default_limit")]
    pub default_limit_mg_l: f64,

    #[serde(default = "default_limits")]
    pub limits: BTreeMap<String, f64>,
}

fn default_limit() -> f64 { 0.1 }

fn default_limits() -> BTreeMap<String, f64> {
    [
        ("arsenic", 0.01),
        ("lead", 0.015),
        ("mercury", 0.002),
        ("cadmium", 0.005),
        ("chromium", 0.1),
        ("benzene", 0.005),
        ("toluene", 1.0),
        ("xylene", 10.0),
        ("pce", 0.005),
        ("tce", 0.005),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

impl Default for RegulatoryConfig {
    fn default() -> Self {
        Self {
            default_limit_mg_l: default_limit(),
            limits: default_limits(),
        }
    }
}

// ============================================================================
// Plume
// ============================================================================

/// Which correction model post-processes the simulated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionKind {
    #[default]
    Identity,
    Linear,
}

/// Calibrated linear correction over the per-cell feature vector
/// `[concentration, grad_x, grad_y, grad_z, local_mean, local_std]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionConfig {
    #[serde(default)]
    pub model: CorrectionKind,

    #[serde(default)]
    pub intercept: f64,

    #[serde(default = "default_correction_coefficients")]
    pub coefficients: [f64; 6],
}

fn default_correction_coefficients() -> [f64; 6] {
    [1.0, 0.0, 0.0, 0.0, 0.0, 0.0]
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            model: CorrectionKind::default(),
            intercept: 0.0,
            coefficients: default_correction_coefficients(),
        }
    }
}

/// Plume extraction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlumeConfig {
    /// Concentration above which a cell counts as plume (mg/L)
    #[serde(default = "default_detection_threshold")]
    pub detection_threshold_mg_l: f64,

    /// Confidence reported with each prediction (0-1)
    #[serde(default = "default_prediction_confidence")]
    pub prediction_confidence: f64,

    #[serde(default)]
    pub correction: CorrectionConfig,
}

fn default_detection_threshold() -> f64 { 0.01 }
fn default_prediction_confidence() -> f64 { 0.85 }

impl Default for PlumeConfig {
    fn default() -> Self {
        Self {
            detection_threshold_mg_l: default_detection_threshold(),
            prediction_confidence: default_prediction_confidence(),
            correction: CorrectionConfig::default(),
        }
    }
}

// ============================================================================
// Risk
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    #[default]
    RuleBased,
    Trained,
}

/// Externally trained linear risk model bound to the risk feature contract
/// `[max_conc, avg_conc, extent, depth_to_water, confined, unconfined, karst,
/// contaminant_count, population_density]`.
///
/// Normalization is precomputed from reference data, never fit per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModelParams {
    pub intercept: f64,
    pub weights: [f64; 9],
    pub means: [f64; 9],
    pub scales: [f64; 9],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    #[serde(default)]
    pub scorer: ScorerKind,

    /// Used when the request carries no population density (people/km²)
    #[serde(default = "default_population_density")]
    pub default_population_density: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trained_model: Option<TrainedModelParams>,
}

fn default_population_density() -> f64 { 5000.0 }

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            scorer: ScorerKind::default(),
            default_population_density: default_population_density(),
            trained_model: None,
        }
    }
}

// ============================================================================
// Economics
// ============================================================================

/// Per-risk-level multipliers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskMultipliers {
    pub low: f64,
    pub moderate: f64,
    pub high: f64,
    pub critical: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomicsConfig {
    /// Base remediation cost ($/m²)
    #[serde(default = "default_base_cost")]
    pub base_cost_per_m2: f64,

    /// Property value loss ($/m²)
    #[serde(default = "default_property_loss")]
    pub property_loss_per_m2: f64,

    /// Monitoring cost as a fraction of remediation
    #[serde(default = "default_monitoring_fraction")]
    pub monitoring_fraction: f64,

    /// Legal cost as a fraction of remediation
    #[serde(default = "default_legal_fraction")]
    pub legal_fraction: f64,

    #[serde(default = "default_cost_risk_multipliers")]
    pub risk_multipliers: RiskMultipliers,
}

fn default_base_cost() -> f64 { 100.0 }
fn default_property_loss() -> f64 { 50.0 }
fn default_monitoring_fraction() -> f64 { 0.1 }
fn default_legal_fraction() -> f64 { 0.2 }
fn default_cost_risk_multipliers() -> RiskMultipliers {
    RiskMultipliers { low: 1.0, moderate: 1.5, high: 2.5, critical: 4.0 }
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        Self {
            base_cost_per_m2: default_base_cost(),
            property_loss_per_m2: default_property_loss(),
            monitoring_fraction: default_monitoring_fraction(),
            legal_fraction: default_legal_fraction(),
            risk_multipliers: default_cost_risk_multipliers(),
        }
    }
}

// ============================================================================
// Remediation
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationConfig {
    /// Above this max concentration, active treatment is selected (mg/L)
    #[serde(default = "default_remediation_high_concentration")]
    pub high_concentration_mg_l: f64,

    /// Above this extent, attenuation-based methods are selected (m²)
    #[serde(default = "default_remediation_large_plume")]
    pub large_plume_m2: f64,

    #[serde(default = "default_timeline_risk_factors")]
    pub timeline_risk_factors: RiskMultipliers,

    #[serde(default = "default_max_timeline")]
    pub max_timeline_months: u32,

    #[serde(default = "default_min_success")]
    pub min_success_probability: f64,

    #[serde(default = "default_max_success")]
    pub max_success_probability: f64,
}

fn default_remediation_high_concentration() -> f64 { 10.0 }
fn default_remediation_large_plume() -> f64 { 10_000.0 }
fn default_timeline_risk_factors() -> RiskMultipliers {
    RiskMultipliers { low: 0.5, moderate: 1.0, high: 1.5, critical: 2.0 }
}
fn default_max_timeline() -> u32 { 120 }
fn default_min_success() -> f64 { 0.3 }
fn default_max_success() -> f64 { 0.95 }

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            high_concentration_mg_l: default_remediation_high_concentration(),
            large_plume_m2: default_remediation_large_plume(),
            timeline_risk_factors: default_timeline_risk_factors(),
            max_timeline_months: default_max_timeline(),
            min_success_probability: default_min_success(),
            max_success_probability: default_max_success(),
        }
    }
}

// ============================================================================
// Alerts
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// HighConcentration fires above this max concentration (mg/L)
    #[serde(default = "default_alert_concentration")]
    pub high_concentration_mg_l: f64,

    /// LargePlume fires above this extent (m²)
    #[serde(default = "default_alert_extent")]
    pub large_plume_m2: f64,
}

fn default_alert_concentration() -> f64 { 5.0 }
fn default_alert_extent() -> f64 { 50_000.0 }

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            high_concentration_mg_l: default_alert_concentration(),
            large_plume_m2: default_alert_extent(),
        }
    }
}
