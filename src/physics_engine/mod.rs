//! Physics Engine Module
//!
//! Deterministic groundwater transport. No learned components live here:
//! everything is hydrogeology and finite differences.
//!
//! ## Pipeline
//! - `HydrogeologicalParameterResolver` - aquifer type to transport parameters
//! - `check_stability()` - explicit-scheme bounds, dt reduction or refusal
//! - `TransportSimulator` - 3-D advection-dispersion stepping on a fixed grid

pub mod grid;
pub mod hydrogeology;
pub mod stability;
pub mod transport;

pub use grid::{grid_from_config, ConcentrationField, GridDims, GridSpacing};
pub use hydrogeology::HydrogeologicalParameterResolver;
pub use stability::{check_stability, StabilityReport, TransportCoefficients};
pub use transport::{TransportOutcome, TransportSimulator};
