//! Config validation: unknown-key detection with Levenshtein suggestions
//! and physical range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

use super::{AnalysisConfig, ScorerKind};

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Tables whose keys are user data (contaminant names), not config fields.
const OPEN_TABLES: &[&str] = &["regulatory.limits"];

/// Indices of the risk feature contract that must carry non-negative weights
/// (max concentration, extent, contaminant count).
pub const MONOTONIC_RISK_FEATURES: [usize; 3] = [0, 2, 7];

/// Returns the complete set of valid dotted key paths for AnalysisConfig.
///
/// Maintained manually to match the struct hierarchy in analysis_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [grid]
        "grid",
        "grid.nx",
        "grid.ny",
        "grid.nz",
        "grid.dx_m",
        "grid.dy_m",
        "grid.dz_m",
        // [simulation]
        "simulation",
        "simulation.dt_days",
        "simulation.horizon_days",
        "simulation.hydraulic_gradient",
        "simulation.stability_policy",
        "simulation.stability_safety_factor",
        "simulation.max_steps",
        "simulation.timeout_secs",
        "simulation.apply_retardation",
        "simulation.strict_domain_boundary",
        "simulation.progress_log_interval",
        // [hydrogeology]
        "hydrogeology",
        "hydrogeology.hydraulic_conductivity",
        "hydrogeology.porosity",
        "hydrogeology.dispersivity",
        "hydrogeology.retardation_factor",
        // [regulatory]
        "regulatory",
        "regulatory.default_limit_mg_l",
        "regulatory.limits",
        // [plume]
        "plume",
        "plume.detection_threshold_mg_l",
        "plume.prediction_confidence",
        "plume.correction",
        "plume.correction.model",
        "plume.correction.intercept",
        "plume.correction.coefficients",
        // [risk]
        "risk",
        "risk.scorer",
        "risk.default_population_density",
        "risk.trained_model",
        "risk.trained_model.intercept",
        "risk.trained_model.weights",
        "risk.trained_model.means",
        "risk.trained_model.scales",
        // [economics]
        "economics",
        "economics.base_cost_per_m2",
        "economics.property_loss_per_m2",
        "economics.monitoring_fraction",
        "economics.legal_fraction",
        "economics.risk_multipliers",
        "economics.risk_multipliers.low",
        "economics.risk_multipliers.moderate",
        "economics.risk_multipliers.high",
        "economics.risk_multipliers.critical",
        // [remediation]
        "remediation",
        "remediation.high_concentration_mg_l",
        "remediation.large_plume_m2",
        "remediation.timeline_risk_factors",
        "remediation.timeline_risk_factors.low",
        "remediation.timeline_risk_factors.moderate",
        "remediation.timeline_risk_factors.high",
        "remediation.timeline_risk_factors.critical",
        "remediation.max_timeline_months",
        "remediation.min_success_probability",
        "remediation.max_success_probability",
        // [alerts]
        "alerts",
        "alerts.high_concentration_mg_l",
        "alerts.large_plume_m2",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() && !OPEN_TABLES.contains(&path.as_str()) {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_len = a.chars().count();
    let b_len = b.chars().count();
    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Ties resolve to the lexicographically smallest key so suggestions are stable.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for &k in known {
        let dist = levenshtein(unknown, k);
        if dist > 3 {
            continue;
        }
        best = match best {
            Some((bk, bd)) if bd < dist || (bd == dist && bk < k) => Some((bk, bd)),
            _ => Some((k, dist)),
        };
    }
    best.map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys, it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| {
            let suggestion = suggest_correction(&key, &known);
            ValidationWarning {
                message: format!("Unknown config key '{key}'"),
                field: key,
                suggestion,
            }
        })
        .collect()
}

// ============================================================================
// Non-finite Sweep
// ============================================================================

/// Dotted paths of every float in the config that is NaN or infinite.
///
/// NaN comparisons silently pass range checks, so floats are swept
/// separately through the serialized value tree.
pub fn non_finite_keys(config: &AnalysisConfig) -> Vec<String> {
    fn walk(value: &toml::Value, path: &str, out: &mut Vec<String>) {
        match value {
            toml::Value::Float(f) if !f.is_finite() => out.push(path.to_string()),
            toml::Value::Table(table) => {
                for (k, v) in table {
                    let child = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                    walk(v, &child, out);
                }
            }
            toml::Value::Array(items) => {
                for (i, v) in items.iter().enumerate() {
                    walk(v, &format!("{path}[{i}]"), out);
                }
            }
            _ => {}
        }
    }

    let mut out = Vec::new();
    if let Ok(value) = toml::Value::try_from(config) {
        walk(&value, "", &mut out);
    }
    out
}

// ============================================================================
// Physical Range Validation
// ============================================================================

/// Validate physical ranges on a parsed AnalysisConfig.
///
/// Returns (errors, warnings). Errors are impossible values that must
/// prevent a run; warnings are suspicious but not fatal.
pub fn validate_physical_ranges(config: &AnalysisConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Grid: at least one interior cell per axis
    let g = &config.grid;
    for (name, n) in [("nx", g.nx), ("ny", g.ny), ("nz", g.nz)] {
        if n < 3 {
            errors.push(format!("grid.{name} = {n} must be >= 3 (needs interior cells)"));
        }
    }
    for (name, h) in [("dx_m", g.dx_m), ("dy_m", g.dy_m), ("dz_m", g.dz_m)] {
        if !(h.is_finite() && h > 0.0) {
            errors.push(format!("grid.{name} = {h} must be a positive finite spacing"));
        }
    }

    // Time stepping
    let s = &config.simulation;
    if !(s.dt_days.is_finite() && s.dt_days > 0.0) {
        errors.push(format!("simulation.dt_days = {} must be > 0", s.dt_days));
    }
    if !(s.horizon_days.is_finite() && s.horizon_days > 0.0) {
        errors.push(format!("simulation.horizon_days = {} must be > 0", s.horizon_days));
    }
    if s.hydraulic_gradient < 0.0 {
        errors.push(format!(
            "simulation.hydraulic_gradient = {} cannot be negative (flow axis is fixed to +x)",
            s.hydraulic_gradient
        ));
    }
    if !(s.stability_safety_factor > 0.0 && s.stability_safety_factor <= 1.0) {
        errors.push(format!(
            "simulation.stability_safety_factor = {} must be in (0, 1]",
            s.stability_safety_factor
        ));
    }
    if s.max_steps == 0 {
        errors.push("simulation.max_steps must be > 0".to_string());
    }

    // Hydrogeology
    let h = &config.hydrogeology;
    if h.hydraulic_conductivity <= 0.0 {
        errors.push(format!(
            "hydrogeology.hydraulic_conductivity = {:e} must be > 0",
            h.hydraulic_conductivity
        ));
    }
    if !(h.porosity > 0.0 && h.porosity <= 1.0) {
        errors.push(format!("hydrogeology.porosity = {} must be in (0, 1]", h.porosity));
    }
    if h.dispersivity < 0.0 {
        errors.push(format!("hydrogeology.dispersivity = {} cannot be negative", h.dispersivity));
    }
    if h.retardation_factor < 1.0 {
        errors.push(format!(
            "hydrogeology.retardation_factor = {} must be >= 1",
            h.retardation_factor
        ));
    }
    // Typical aquifers sit between 1e-9 (clay) and 1e-1 (gravel/karst) m/s
    if h.hydraulic_conductivity > 0.0
        && !(1e-9..=1e-1).contains(&h.hydraulic_conductivity)
    {
        warnings.push(ValidationWarning {
            field: "hydrogeology.hydraulic_conductivity".to_string(),
            message: format!(
                "hydraulic_conductivity = {:e} m/s is outside typical range (1e-9 to 1e-1)",
                h.hydraulic_conductivity
            ),
            suggestion: None,
        });
    }

    // Regulatory reference data
    if config.regulatory.limits.is_empty() {
        errors.push("regulatory.limits is empty; a regulatory limit table is required".to_string());
    }
    if config.regulatory.limits.keys().any(|k| k != &k.to_lowercase()) {
        warnings.push(ValidationWarning {
            field: "regulatory.limits".to_string(),
            message: "regulatory.limits keys are matched lowercase; mixed-case keys never match"
                .to_string(),
            suggestion: None,
        });
    }

    // Plume
    let p = &config.plume;
    if p.detection_threshold_mg_l < 0.0 {
        errors.push(format!(
            "plume.detection_threshold_mg_l = {} cannot be negative",
            p.detection_threshold_mg_l
        ));
    }
    if !(0.0..=1.0).contains(&p.prediction_confidence) {
        errors.push(format!(
            "plume.prediction_confidence = {} must be in [0, 1]",
            p.prediction_confidence
        ));
    }

    // Risk scorer
    let r = &config.risk;
    if r.default_population_density < 0.0 {
        errors.push("risk.default_population_density cannot be negative".to_string());
    }
    match (&r.scorer, &r.trained_model) {
        (ScorerKind::Trained, None) => {
            errors.push("risk.scorer = \"trained\" requires a [risk.trained_model] table".to_string());
        }
        (_, Some(model)) => {
            for idx in MONOTONIC_RISK_FEATURES {
                if model.weights[idx] < 0.0 {
                    errors.push(format!(
                        "risk.trained_model.weights[{idx}] = {} must be >= 0 (score must not decrease with this feature)",
                        model.weights[idx]
                    ));
                }
            }
            if model.scales.iter().any(|s| *s <= 0.0) {
                errors.push("risk.trained_model.scales must all be > 0".to_string());
            }
        }
        (ScorerKind::RuleBased, None) => {}
    }

    // Economics / remediation
    let e = &config.economics;
    for (name, v) in [
        ("base_cost_per_m2", e.base_cost_per_m2),
        ("property_loss_per_m2", e.property_loss_per_m2),
        ("monitoring_fraction", e.monitoring_fraction),
        ("legal_fraction", e.legal_fraction),
    ] {
        if v < 0.0 {
            errors.push(format!("economics.{name} = {v} cannot be negative"));
        }
    }
    let rm = &config.remediation;
    for (name, v) in [
        ("min_success_probability", rm.min_success_probability),
        ("max_success_probability", rm.max_success_probability),
    ] {
        if !(0.0..=1.0).contains(&v) {
            errors.push(format!("remediation.{name} = {v} must be in [0, 1]"));
        }
    }
    if rm.max_timeline_months == 0 {
        errors.push("remediation.max_timeline_months must be >= 1".to_string());
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainedModelParams;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("porosity", "porosity"), 0);
    }

    #[test]
    fn test_levenshtein_one_edit() {
        assert_eq!(levenshtein("porosty", "porosity"), 1);
    }

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [simulation]
            dt_days = 0.05
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"simulation".to_string()));
        assert!(keys.contains(&"simulation.dt_days".to_string()));
    }

    #[test]
    fn test_walk_skips_open_limit_table() {
        let toml: toml::Value = r#"
            [regulatory.limits]
            nitrate = 10.0
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"regulatory.limits".to_string()));
        assert!(!keys.iter().any(|k| k.ends_with("nitrate")));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let toml_str = r#"
[hydrogeology]
porosty = 0.3
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("hydrogeology.porosity")
        );
    }

    #[test]
    fn test_suggest_correction_no_match_for_garbage() {
        let known = known_config_keys();
        assert!(suggest_correction("completely_unrelated_garbage_key_xyz", &known).is_none());
    }

    #[test]
    fn test_physical_range_defaults_clean() {
        let (errors, warnings) = validate_physical_ranges(&AnalysisConfig::default());
        assert!(errors.is_empty(), "Defaults should produce no errors: {errors:?}");
        assert!(warnings.is_empty(), "Defaults should produce no warnings: {warnings:?}");
    }

    #[test]
    fn test_grid_too_small_is_error() {
        let mut config = AnalysisConfig::default();
        config.grid.nz = 2;
        let (errors, _) = validate_physical_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("grid.nz")));
    }

    #[test]
    fn test_empty_regulatory_table_is_error() {
        let mut config = AnalysisConfig::default();
        config.regulatory.limits.clear();
        let (errors, _) = validate_physical_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("regulatory.limits")));
    }

    #[test]
    fn test_trained_scorer_without_model_is_error() {
        let mut config = AnalysisConfig::default();
        config.risk.scorer = ScorerKind::Trained;
        let (errors, _) = validate_physical_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("trained_model")));
    }

    #[test]
    fn test_negative_monotonic_weight_is_error() {
        let mut config = AnalysisConfig::default();
        config.risk.scorer = ScorerKind::Trained;
        let mut weights = [1.0; 9];
        weights[2] = -0.5;
        config.risk.trained_model = Some(TrainedModelParams {
            intercept: 0.0,
            weights,
            means: [0.0; 9],
            scales: [1.0; 9],
        });
        let (errors, _) = validate_physical_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("weights[2]")));
    }

    #[test]
    fn test_non_finite_sweep_names_field() {
        let mut config = AnalysisConfig::default();
        config.plume.correction.coefficients[3] = f64::NAN;
        let keys = non_finite_keys(&config);
        assert_eq!(keys, vec!["plume.correction.coefficients[3]".to_string()]);
    }

    #[test]
    fn test_conductivity_outside_typical_range_warns() {
        let mut config = AnalysisConfig::default();
        config.hydrogeology.hydraulic_conductivity = 5.0;
        let (errors, warnings) = validate_physical_ranges(&config);
        assert!(errors.is_empty());
        assert!(warnings.iter().any(|w| w.field.contains("hydraulic_conductivity")));
    }
}
