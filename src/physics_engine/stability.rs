//! Explicit-scheme stability analysis.
//!
//! Checked once before stepping. Two bounds apply to the forward-Euler
//! central-difference scheme:
//!
//! - diffusion number `2·dt·(Dx/dx² + Dy/dy² + Dz/dz²) <= 1`
//! - cell Péclet number `|v|·h/D <= 2` on every axis
//!
//! Together they make every stencil weight non-negative, so the update is a
//! convex combination of neighbours: concentrations stay non-negative and
//! never exceed the initial maximum.
//!
//! # Units
//!
//! Hydraulic conductivity is in m/s, so D (m²/s) and v (m/s) carry seconds,
//! while dt and the horizon are counted in days. The coefficients are used
//! as-is against dt in days, matching the reference transport model. The
//! diffusion number and `max_stable_dt` are therefore numbers for that mixed
//! convention, not dimensionally converted quantities. Converting K to m/day
//! would speed transport up by a factor of 86 400.

use tracing::{info, warn};

use crate::config::defaults::{MAX_CELL_PECLET, TRANSVERSE_DISPERSION_RATIO, VERTICAL_DISPERSION_RATIO};
use crate::config::{SimulationConfig, StabilityPolicy};
use crate::error::{AnalysisError, Result};
use crate::types::HydrogeologicalParameters;

use super::grid::GridSpacing;

/// Effective transport coefficients of the advection-dispersion operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportCoefficients {
    pub dispersion: [f64; 3],
    pub velocity: [f64; 3],
}

impl TransportCoefficients {
    /// Dx = dispersivity·K/porosity, Dy = 0.1·Dx, Dz = 0.1·Dy, vx = K·gradient.
    ///
    /// With `apply_retardation` the whole operator is divided by R.
    pub fn from_parameters(params: &HydrogeologicalParameters, sim: &SimulationConfig) -> Self {
        let dx = params.longitudinal_dispersion();
        let dy = dx * TRANSVERSE_DISPERSION_RATIO;
        let dz = dy * VERTICAL_DISPERSION_RATIO;
        let vx = params.darcy_velocity(sim.hydraulic_gradient);

        let r = if sim.apply_retardation {
            params.retardation_factor
        } else {
            1.0
        };

        Self {
            dispersion: [dx / r, dy / r, dz / r],
            velocity: [vx / r, 0.0, 0.0],
        }
    }
}

/// Outcome of the pre-run stability check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityReport {
    /// Diffusion number at the dt actually used
    pub diffusion_number: f64,
    /// Largest dt satisfying the diffusion bound, in the same day count as
    /// `dt_days` (coefficients are per second, see module docs); infinite
    /// without dispersion
    pub max_stable_dt: f64,
    /// Worst cell Péclet number across axes
    pub cell_peclet: f64,
    pub dt_days: f64,
    pub steps: usize,
    /// dt was shrunk below the configured value
    pub reduced: bool,
}

/// Sum of D/h² over the three axes.
fn dispersion_rate(coeffs: &TransportCoefficients, spacing: &GridSpacing) -> f64 {
    let h = [spacing.dx, spacing.dy, spacing.dz];
    (0..3).map(|a| coeffs.dispersion[a] / (h[a] * h[a])).sum()
}

/// Worst |v|·h/D over the axes. Advection without dispersion is unbounded.
fn cell_peclet(coeffs: &TransportCoefficients, spacing: &GridSpacing) -> f64 {
    let h = [spacing.dx, spacing.dy, spacing.dz];
    (0..3)
        .map(|a| {
            let v = coeffs.velocity[a].abs();
            if v == 0.0 {
                0.0
            } else if coeffs.dispersion[a] <= 0.0 {
                f64::INFINITY
            } else {
                v * h[a] / coeffs.dispersion[a]
            }
        })
        .fold(0.0, f64::max)
}

/// Verify stability and settle dt and the step count.
///
/// Under `Reduce`, dt becomes `max_stable_dt · safety` and is then evened out
/// so the steps land exactly on the horizon. Under `Fail`, any violation is a
/// `NumericalInstability` before the first step.
pub fn check_stability(
    coeffs: &TransportCoefficients,
    spacing: &GridSpacing,
    sim: &SimulationConfig,
) -> Result<StabilityReport> {
    if !(sim.dt_days.is_finite() && sim.dt_days > 0.0) {
        return Err(AnalysisError::Configuration(format!(
            "time step {} must be positive",
            sim.dt_days
        )));
    }
    if !(sim.horizon_days.is_finite() && sim.horizon_days > 0.0) {
        return Err(AnalysisError::Configuration(format!(
            "horizon {} must be positive",
            sim.horizon_days
        )));
    }

    let peclet = cell_peclet(coeffs, spacing);
    if peclet > MAX_CELL_PECLET {
        // dt cannot fix this; only a finer grid or more dispersion can
        return Err(AnalysisError::instability(
            0,
            format!("cell Péclet number {peclet:.3} exceeds {MAX_CELL_PECLET}; refine the grid"),
        ));
    }

    let rate = dispersion_rate(coeffs, spacing);
    let max_stable_dt = if rate > 0.0 {
        1.0 / (2.0 * rate)
    } else {
        f64::INFINITY
    };

    let mut dt = sim.dt_days;
    let mut steps = ((sim.horizon_days / dt).round() as usize).max(1);
    let mut reduced = false;

    if dt > max_stable_dt {
        match sim.stability_policy {
            StabilityPolicy::Fail => {
                return Err(AnalysisError::instability(
                    0,
                    format!(
                        "dt {dt} days exceeds stable bound {max_stable_dt:.6} days (diffusion number {:.3})",
                        2.0 * dt * rate
                    ),
                ));
            }
            StabilityPolicy::Reduce => {
                let target = max_stable_dt * sim.stability_safety_factor;
                steps = (sim.horizon_days / target).ceil() as usize;
                if steps > sim.max_steps {
                    return Err(AnalysisError::instability(
                        0,
                        format!(
                            "stable dt {target:.6} days needs {steps} steps, above max_steps {}",
                            sim.max_steps
                        ),
                    ));
                }
                dt = sim.horizon_days / steps as f64;
                reduced = true;
                warn!(
                    requested_dt = sim.dt_days,
                    dt,
                    steps,
                    "Time step reduced to satisfy the diffusion bound"
                );
            }
        }
    } else if steps > sim.max_steps {
        return Err(AnalysisError::Configuration(format!(
            "{steps} steps exceeds max_steps {}",
            sim.max_steps
        )));
    }

    let report = StabilityReport {
        diffusion_number: 2.0 * dt * rate,
        max_stable_dt,
        cell_peclet: peclet,
        dt_days: dt,
        steps,
        reduced,
    };
    info!(
        dt = report.dt_days,
        steps = report.steps,
        diffusion_number = report.diffusion_number,
        cell_peclet = report.cell_peclet,
        "Stability check passed"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AquiferType;

    fn params() -> HydrogeologicalParameters {
        HydrogeologicalParameters {
            aquifer_type: AquiferType::Unconfined,
            hydraulic_conductivity: 1e-4,
            porosity: 0.25,
            dispersivity: 10.0,
            retardation_factor: 1.5,
        }
    }

    fn spacing() -> GridSpacing {
        GridSpacing { dx: 10.0, dy: 10.0, dz: 1.0 }
    }

    #[test]
    fn test_coefficients_used_without_unit_conversion() {
        let sim = SimulationConfig::default();
        let coeffs = TransportCoefficients::from_parameters(&params(), &sim);
        // Dx = 10 * 1e-4 / 0.25, taken per second and applied per day step
        assert!((coeffs.dispersion[0] - 4e-3).abs() < 1e-15);
        assert!((coeffs.velocity[0] - 1e-7).abs() < 1e-20);

        let report = check_stability(&coeffs, &spacing(), &sim).unwrap();
        let rate = 4e-3 / 100.0 + 4e-4 / 100.0 + 4e-5 / 1.0;
        assert!((report.max_stable_dt - 1.0 / (2.0 * rate)).abs() < 1e-9);
        assert!((report.diffusion_number - 2.0 * 0.1 * rate).abs() < 1e-15);
    }

    #[test]
    fn test_default_setup_is_stable() {
        let sim = SimulationConfig::default();
        let coeffs = TransportCoefficients::from_parameters(&params(), &sim);
        let report = check_stability(&coeffs, &spacing(), &sim).unwrap();
        assert!(!report.reduced);
        assert_eq!(report.steps, 3650);
        assert!(report.diffusion_number <= 1.0);
    }

    #[test]
    fn test_dispersion_ratios() {
        let sim = SimulationConfig::default();
        let coeffs = TransportCoefficients::from_parameters(&params(), &sim);
        let dx = 10.0 * 1e-4 / 0.25;
        assert!((coeffs.dispersion[0] - dx).abs() < 1e-15);
        assert!((coeffs.dispersion[1] - dx * 0.1).abs() < 1e-15);
        assert!((coeffs.dispersion[2] - dx * 0.01).abs() < 1e-15);
        assert!((coeffs.velocity[0] - 1e-7).abs() < 1e-20);
    }

    #[test]
    fn test_retardation_scales_operator() {
        let mut sim = SimulationConfig::default();
        let plain = TransportCoefficients::from_parameters(&params(), &sim);
        sim.apply_retardation = true;
        let retarded = TransportCoefficients::from_parameters(&params(), &sim);
        assert!((retarded.dispersion[0] * 1.5 - plain.dispersion[0]).abs() < 1e-15);
    }

    #[test]
    fn test_unstable_dt_fails_under_fail_policy() {
        let mut p = params();
        p.hydraulic_conductivity = 10.0;
        let sim = SimulationConfig {
            stability_policy: StabilityPolicy::Fail,
            ..SimulationConfig::default()
        };
        let coeffs = TransportCoefficients::from_parameters(&p, &sim);
        let err = check_stability(&coeffs, &spacing(), &sim).unwrap_err();
        assert!(matches!(err, AnalysisError::NumericalInstability { step: 0, .. }));
    }

    #[test]
    fn test_unstable_dt_reduced_under_reduce_policy() {
        let mut p = params();
        p.hydraulic_conductivity = 10.0;
        let sim = SimulationConfig::default();
        let coeffs = TransportCoefficients::from_parameters(&p, &sim);
        let report = check_stability(&coeffs, &spacing(), &sim).unwrap();
        assert!(report.reduced);
        assert!(report.dt_days < sim.dt_days);
        assert!(report.diffusion_number <= 1.0);
        assert!((report.dt_days * report.steps as f64 - sim.horizon_days).abs() < 1e-9);
    }

    #[test]
    fn test_pure_advection_rejected() {
        let mut p = params();
        p.dispersivity = 0.0;
        let sim = SimulationConfig::default();
        let coeffs = TransportCoefficients::from_parameters(&p, &sim);
        assert!(matches!(
            check_stability(&coeffs, &spacing(), &sim),
            Err(AnalysisError::NumericalInstability { .. })
        ));
    }

    #[test]
    fn test_reduction_bounded_by_max_steps() {
        let mut p = params();
        p.hydraulic_conductivity = 10.0;
        let sim = SimulationConfig {
            max_steps: 10,
            ..SimulationConfig::default()
        };
        let coeffs = TransportCoefficients::from_parameters(&p, &sim);
        assert!(check_stability(&coeffs, &spacing(), &sim).is_err());
    }
}
