//! Regulatory limit reference table.
//!
//! The table is supplied by configuration; this module only reads it.

use std::collections::BTreeMap;

use crate::config::RegulatoryConfig;
use crate::error::{AnalysisError, Result};
use crate::types::{LimitSource, RegulatoryLimit};

/// Contaminant -> limit (mg/L) lookup with an optional fallback limit.
#[derive(Debug, Clone)]
pub struct RegulatoryTable {
    limits: BTreeMap<String, f64>,
    default_limit: Option<f64>,
}

impl RegulatoryTable {
    /// Build from configuration. An empty table is a configuration failure.
    pub fn from_config(config: &RegulatoryConfig) -> Result<Self> {
        let limits = config
            .limits
            .iter()
            .map(|(k, v)| (k.trim().to_lowercase(), *v))
            .filter(|(k, _)| !k.is_empty())
            .collect();
        let default_limit = (config.default_limit_mg_l > 0.0).then_some(config.default_limit_mg_l);
        let table = Self { limits, default_limit };
        if table.is_empty() {
            return Err(AnalysisError::Configuration(
                "regulatory limit table is missing or empty".to_string(),
            ));
        }
        Ok(table)
    }

    /// Resolve the limit for a contaminant name (case-insensitive).
    pub fn limit_for(&self, name: &str) -> RegulatoryLimit {
        match self.limits.get(&name.trim().to_lowercase()) {
            Some(&value) if value > 0.0 => RegulatoryLimit {
                value_mg_l: value,
                source: LimitSource::Regulatory,
            },
            Some(_) => Self::no_limit(),
            None => match self.default_limit {
                Some(value) => RegulatoryLimit {
                    value_mg_l: value,
                    source: LimitSource::DefaultFallback,
                },
                None => Self::no_limit(),
            },
        }
    }

    fn no_limit() -> RegulatoryLimit {
        RegulatoryLimit {
            value_mg_l: 0.0,
            source: LimitSource::NoLimit,
        }
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_contaminant_uses_table() {
        let table = RegulatoryTable::from_config(&RegulatoryConfig::default()).unwrap();
        let limit = table.limit_for("Arsenic");
        assert_eq!(limit.source, LimitSource::Regulatory);
        assert!((limit.value_mg_l - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_contaminant_gets_flagged_fallback() {
        let table = RegulatoryTable::from_config(&RegulatoryConfig::default()).unwrap();
        let limit = table.limit_for("perchlorate");
        assert_eq!(limit.source, LimitSource::DefaultFallback);
        assert!((limit.value_mg_l - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_disabled_fallback_yields_no_limit() {
        let config = RegulatoryConfig {
            default_limit_mg_l: 0.0,
            ..RegulatoryConfig::default()
        };
        let table = RegulatoryTable::from_config(&config).unwrap();
        assert_eq!(table.limit_for("perchlorate").source, LimitSource::NoLimit);
    }

    #[test]
    fn test_empty_table_is_configuration_error() {
        let config = RegulatoryConfig {
            default_limit_mg_l: 0.1,
            limits: BTreeMap::new(),
        };
        assert!(matches!(
            RegulatoryTable::from_config(&config),
            Err(AnalysisError::Configuration(_))
        ));
    }

    #[test]
    fn test_blank_names_only_is_empty_table() {
        let config = RegulatoryConfig {
            default_limit_mg_l: 0.1,
            limits: BTreeMap::from([("  ".to_string(), 0.5)]),
        };
        assert!(RegulatoryTable::from_config(&config).is_err());
    }
}
