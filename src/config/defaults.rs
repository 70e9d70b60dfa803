//! System-wide default constants.
//!
//! Values that are part of the model definition rather than operator tuning
//! live here; tunables live in `AnalysisConfig`.

// ============================================================================
// Config Discovery
// ============================================================================

/// Environment variable holding the path to a TOML config file.
pub const CONFIG_ENV_VAR: &str = "PLUMEWATCH_CONFIG";

/// Config file looked up in the working directory when the env var is unset.
pub const LOCAL_CONFIG_FILE: &str = "plumewatch.toml";

// ============================================================================
// Transport Model
// ============================================================================

/// Transverse dispersion as a fraction of longitudinal (Dy = Dx / 10).
pub const TRANSVERSE_DISPERSION_RATIO: f64 = 0.1;

/// Vertical dispersion as a fraction of transverse (Dz = Dy / 10).
pub const VERTICAL_DISPERSION_RATIO: f64 = 0.1;

/// Largest cell Peclet number for which the central-difference advection
/// stencil keeps every neighbour weight non-negative.
pub const MAX_CELL_PECLET: f64 = 2.0;

/// Relative slack allowed above the initial maximum before a step is
/// treated as divergent (the scheme obeys a discrete maximum principle).
pub const DIVERGENCE_TOLERANCE: f64 = 1e-9;

// ============================================================================
// Risk Scoring
// ============================================================================

/// Rule-based score weight on max concentration (points per mg/L).
pub const SCORE_CONCENTRATION_WEIGHT: f64 = 10.0;

/// Rule-based score divisor on plume extent (m² per point).
pub const SCORE_EXTENT_DIVISOR: f64 = 1000.0;

/// Rule-based score weight per measured contaminant.
pub const SCORE_CONTAMINANT_WEIGHT: f64 = 5.0;

// ============================================================================
// Profile Analysis
// ============================================================================

/// Affinity between two samples of the same category.
pub const SAME_CATEGORY_AFFINITY: f64 = 0.7;

/// Affinity between samples of different categories.
pub const CROSS_CATEGORY_AFFINITY: f64 = 0.2;

// ============================================================================
// Monitoring Plan
// ============================================================================

/// Plume area covered by one monitoring point (m²).
pub const MONITORING_AREA_PER_POINT_M2: f64 = 10_000.0;

/// Minimum number of monitoring points in any plan.
pub const MIN_MONITORING_POINTS: usize = 3;

/// Depth of the shallowest monitoring point (m below water table).
pub const MONITORING_BASE_DEPTH_M: f64 = 5.0;

/// Depth increment between successive monitoring points (m).
pub const MONITORING_DEPTH_STEP_M: f64 = 2.0;

/// Spacing between monitoring points along the flow axis (degrees).
pub const MONITORING_SPACING_DEG: f64 = 0.001;
