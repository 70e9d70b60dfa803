//! Analysis Configuration Module
//!
//! Provides the simulation grid, time stepping, hydrogeology, regulatory
//! limits and scoring constants loaded from TOML, with built-in defaults
//! equal to the reference transport model.
//!
//! ## Loading Order
//!
//! 1. `PLUMEWATCH_CONFIG` environment variable (path to TOML file)
//! 2. `plumewatch.toml` in the current working directory
//! 3. Built-in defaults
//!
//! The config is passed by reference into `PollutionAnalyzer`; every request
//! served by one analyzer sees the same immutable values.

mod analysis_config;
pub mod defaults;
pub mod validation;

pub use analysis_config::*;
