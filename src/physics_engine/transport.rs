//! 3-D advection-dispersion transport on a fixed grid.
//!
//! Forward-Euler in time, central differences in space. The source cell
//! `(nx/2, ny/2, 0)` sits on the boundary layer, which is never written, so
//! it acts as a constant-concentration source while every other boundary
//! cell stays at its initial value of zero.
//!
//! Coefficients come from `TransportCoefficients` in per-second units and
//! are stepped with dt counted in days; see `stability` for the convention.
//!
//! Each step is split across x-planes with rayon. Every cell reads only the
//! previous step, so results are bit-identical regardless of thread count.

use std::time::{Duration, Instant};

use rayon::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::defaults::DIVERGENCE_TOLERANCE;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::types::HydrogeologicalParameters;

use super::grid::{grid_from_config, ConcentrationField, GridBuffer, GridDims, GridSpacing};
use super::stability::{check_stability, StabilityReport, TransportCoefficients};

/// Neighbour weights of the explicit update; they sum to one.
#[derive(Debug, Clone, Copy)]
struct Stencil {
    center: f64,
    x_minus: f64,
    x_plus: f64,
    y_minus: f64,
    y_plus: f64,
    z_minus: f64,
    z_plus: f64,
}

impl Stencil {
    fn new(coeffs: &TransportCoefficients, spacing: &GridSpacing, dt: f64) -> Self {
        let h = [spacing.dx, spacing.dy, spacing.dz];
        let diff: [f64; 3] = std::array::from_fn(|a| dt * coeffs.dispersion[a] / (h[a] * h[a]));
        let adv: [f64; 3] = std::array::from_fn(|a| dt * coeffs.velocity[a] / (2.0 * h[a]));

        Self {
            center: 1.0 - 2.0 * (diff[0] + diff[1] + diff[2]),
            x_minus: diff[0] + adv[0],
            x_plus: diff[0] - adv[0],
            y_minus: diff[1] + adv[1],
            y_plus: diff[1] - adv[1],
            z_minus: diff[2] + adv[2],
            z_plus: diff[2] - adv[2],
        }
    }
}

/// Result of one completed transport run.
#[derive(Debug, Clone)]
pub struct TransportOutcome {
    pub field: ConcentrationField,
    pub steps: usize,
    pub dt_days: f64,
    /// Highest concentration in the interior cells next to the fixed boundary
    pub edge_concentration: f64,
    pub elapsed: Duration,
}

/// Explicit finite-difference solver for one parameter set.
///
/// Stability is settled at construction; `run` only steps.
#[derive(Debug)]
pub struct TransportSimulator {
    dims: GridDims,
    spacing: GridSpacing,
    params: HydrogeologicalParameters,
    coefficients: TransportCoefficients,
    stability: StabilityReport,
    timeout: Option<Duration>,
    edge_threshold: f64,
    strict_boundary: bool,
    progress_interval: usize,
}

impl TransportSimulator {
    pub fn new(config: &AnalysisConfig, params: HydrogeologicalParameters) -> Result<Self> {
        let (dims, spacing) = grid_from_config(&config.grid)?;
        let sim = &config.simulation;
        let coefficients = TransportCoefficients::from_parameters(&params, sim);
        let stability = check_stability(&coefficients, &spacing, sim)?;

        Ok(Self {
            dims,
            spacing,
            params,
            coefficients,
            stability,
            timeout: sim.timeout_secs.map(Duration::from_secs),
            edge_threshold: config.plume.detection_threshold_mg_l,
            strict_boundary: sim.strict_domain_boundary,
            progress_interval: sim.progress_log_interval.max(1),
        })
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn spacing(&self) -> GridSpacing {
        self.spacing
    }

    pub fn parameters(&self) -> &HydrogeologicalParameters {
        &self.params
    }

    pub fn coefficients(&self) -> &TransportCoefficients {
        &self.coefficients
    }

    pub fn stability(&self) -> &StabilityReport {
        &self.stability
    }

    /// Zero field with `source_concentration` at the top of the centre column.
    pub fn initial_field(&self, source_concentration: f64) -> Result<ConcentrationField> {
        if !(source_concentration.is_finite() && source_concentration >= 0.0) {
            return Err(AnalysisError::Validation(format!(
                "source concentration {source_concentration} must be finite and >= 0"
            )));
        }
        let mut field = ConcentrationField::zeros(self.dims, self.spacing);
        let (ci, cj) = self.dims.center_xy();
        field.set(ci, cj, 0, source_concentration);
        Ok(field)
    }

    /// Deposit a point source and step it to the horizon.
    pub fn simulate(
        &self,
        source_concentration: f64,
        cancel: &CancellationToken,
    ) -> Result<TransportOutcome> {
        let initial = self.initial_field(source_concentration)?;
        self.run(initial, cancel)
    }

    /// Step an arbitrary initial field to the horizon.
    ///
    /// Cancellation and the deadline are checked once per step; the partial
    /// field is discarded on any error.
    pub fn run(
        &self,
        initial: ConcentrationField,
        cancel: &CancellationToken,
    ) -> Result<TransportOutcome> {
        if initial.dims() != self.dims {
            return Err(AnalysisError::Configuration(format!(
                "initial field grid {:?} does not match simulator grid {:?}",
                initial.dims(),
                self.dims
            )));
        }

        let started = Instant::now();
        let deadline = self.timeout.map(|t| started + t);
        let steps = self.stability.steps;
        let dt = self.stability.dt_days;
        let stencil = Stencil::new(&self.coefficients, &self.spacing, dt);
        let ceiling = initial.max() * (1.0 + DIVERGENCE_TOLERANCE);

        info!(
            nx = self.dims.nx,
            ny = self.dims.ny,
            nz = self.dims.nz,
            steps,
            dt,
            "Starting transport simulation"
        );

        let mut buffer = GridBuffer::new(initial);

        for step in 0..steps {
            if cancel.is_cancelled() {
                info!(step, "Transport simulation cancelled");
                return Err(AnalysisError::Cancelled { step });
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    let elapsed_ms = started.elapsed().as_millis();
                    warn!(step, elapsed_ms = elapsed_ms as u64, "Transport simulation timed out");
                    return Err(AnalysisError::TimedOut { step, elapsed_ms });
                }
            }

            let (finite, max) = advance(&self.dims, &stencil, &mut buffer);

            if !finite {
                return Err(AnalysisError::instability(step, "non-finite concentration"));
            }
            if max > ceiling {
                return Err(AnalysisError::instability(
                    step,
                    format!("concentration {max:.6e} exceeds initial maximum {ceiling:.6e}"),
                ));
            }

            if (step + 1) % self.progress_interval == 0 {
                debug!(step = step + 1, of = steps, max, "Transport progress");
            }
        }

        let field = buffer.into_field();
        let edge_concentration = edge_maximum(&field);
        if edge_concentration > self.edge_threshold {
            if self.strict_boundary {
                return Err(AnalysisError::Configuration(format!(
                    "plume reaches the domain edge ({edge_concentration:.4} mg/L); enlarge the grid"
                )));
            }
            warn!(
                edge_concentration,
                threshold = self.edge_threshold,
                "Plume reaches the fixed domain boundary; results near the edge are truncated"
            );
        }

        let elapsed = started.elapsed();
        info!(
            steps,
            max = field.max(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Transport simulation complete"
        );

        Ok(TransportOutcome {
            field,
            steps,
            dt_days: dt,
            edge_concentration,
            elapsed,
        })
    }
}

/// One explicit step over all interior cells, then swap.
///
/// Returns whether every written value is finite, and the new interior maximum.
fn advance(dims: &GridDims, s: &Stencil, buffer: &mut GridBuffer) -> (bool, f64) {
    let (nx, ny, nz) = (dims.nx, dims.ny, dims.nz);
    let plane = dims.plane_len();

    let (current, next) = buffer.split();
    let (finite, max) = next
        .par_chunks_mut(plane)
        .enumerate()
        .map(|(i, out)| {
            if i == 0 || i == nx - 1 {
                return (true, 0.0_f64);
            }
            let mut finite = true;
            let mut max = 0.0_f64;
            for j in 1..ny - 1 {
                for k in 1..nz - 1 {
                    let idx = (i * ny + j) * nz + k;
                    let mut v = s.center * current[idx]
                        + s.x_minus * current[idx - plane]
                        + s.x_plus * current[idx + plane]
                        + s.y_minus * current[idx - nz]
                        + s.y_plus * current[idx + nz]
                        + s.z_minus * current[idx - 1]
                        + s.z_plus * current[idx + 1];
                    // flush subnormals
                    if v.abs() < f64::MIN_POSITIVE {
                        v = 0.0;
                    }
                    finite &= v.is_finite();
                    max = max.max(v);
                    out[j * nz + k] = v;
                }
            }
            (finite, max)
        })
        .reduce(|| (true, 0.0_f64), |a, b| (a.0 && b.0, a.1.max(b.1)));

    buffer.swap();
    let boundary_max = boundary_maximum(dims, buffer.current());
    (finite, max.max(boundary_max))
}

/// Boundary cells never change, but the source lives there; include it in the max.
fn boundary_maximum(dims: &GridDims, values: &[f64]) -> f64 {
    let (ci, cj) = dims.center_xy();
    values[dims.index(ci, cj, 0)]
}

/// Largest value in the interior layer adjacent to the zero boundary
/// (lateral faces and bottom). The top layer is excluded; it borders the source.
fn edge_maximum(field: &ConcentrationField) -> f64 {
    let d = field.dims();
    let mut max = 0.0_f64;
    for i in 1..d.nx - 1 {
        for j in 1..d.ny - 1 {
            for k in 1..d.nz - 1 {
                let on_edge = i == 1 || i == d.nx - 2 || j == 1 || j == d.ny - 2 || k == d.nz - 2;
                if on_edge {
                    max = max.max(field.get(i, j, k));
                }
            }
        }
    }
    max
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StabilityPolicy;
    use crate::types::AquiferType;

    fn small_config() -> AnalysisConfig {
        let mut config = AnalysisConfig::default();
        config.grid.nx = 11;
        config.grid.ny = 11;
        config.grid.nz = 5;
        config.simulation.horizon_days = 5.0;
        config
    }

    fn params() -> HydrogeologicalParameters {
        HydrogeologicalParameters {
            aquifer_type: AquiferType::Unconfined,
            hydraulic_conductivity: 1e-4,
            porosity: 0.25,
            dispersivity: 10.0,
            retardation_factor: 1.5,
        }
    }

    /// Parameters that spread visibly within a few steps.
    fn fast_params() -> HydrogeologicalParameters {
        HydrogeologicalParameters {
            hydraulic_conductivity: 1.0,
            ..params()
        }
    }

    #[test]
    fn test_stencil_weights_sum_to_one() {
        let sim = small_config().simulation;
        let coeffs = TransportCoefficients::from_parameters(&fast_params(), &sim);
        let spacing = GridSpacing { dx: 10.0, dy: 10.0, dz: 1.0 };
        let s = Stencil::new(&coeffs, &spacing, 0.1);
        let sum = s.center + s.x_minus + s.x_plus + s.y_minus + s.y_plus + s.z_minus + s.z_plus;
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(s.center >= 0.0 && s.x_plus >= 0.0);
    }

    #[test]
    fn test_source_cell_held_constant() {
        let sim = TransportSimulator::new(&small_config(), fast_params()).unwrap();
        let out = sim.simulate(2.0, &CancellationToken::new()).unwrap();
        assert_eq!(out.field.get(5, 5, 0), 2.0);
        assert_eq!(out.steps, 50);
    }

    #[test]
    fn test_boundary_cells_stay_zero() {
        let sim = TransportSimulator::new(&small_config(), fast_params()).unwrap();
        let out = sim.simulate(2.0, &CancellationToken::new()).unwrap();
        let d = out.field.dims();
        for j in 0..d.ny {
            for k in 0..d.nz {
                assert_eq!(out.field.get(0, j, k), 0.0);
                assert_eq!(out.field.get(d.nx - 1, j, k), 0.0);
            }
        }
    }

    #[test]
    fn test_solution_spreads_and_stays_bounded() {
        let sim = TransportSimulator::new(&small_config(), fast_params()).unwrap();
        let out = sim.simulate(1.0, &CancellationToken::new()).unwrap();
        assert!(out.field.get(5, 5, 1) > 0.0);
        assert!(out.field.min() >= 0.0);
        assert!(out.field.max() <= 1.0 + 1e-9);
    }

    #[test]
    fn test_zero_source_stays_zero() {
        let sim = TransportSimulator::new(&small_config(), params()).unwrap();
        let out = sim.simulate(0.0, &CancellationToken::new()).unwrap();
        assert_eq!(out.field.max(), 0.0);
    }

    #[test]
    fn test_runs_are_bit_identical() {
        let sim = TransportSimulator::new(&small_config(), fast_params()).unwrap();
        let a = sim.simulate(3.0, &CancellationToken::new()).unwrap();
        let b = sim.simulate(3.0, &CancellationToken::new()).unwrap();
        assert_eq!(a.field.values(), b.field.values());
    }

    #[test]
    fn test_cancelled_token_stops_before_first_step() {
        let sim = TransportSimulator::new(&small_config(), params()).unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let err = sim.simulate(1.0, &token).unwrap_err();
        assert!(matches!(err, AnalysisError::Cancelled { step: 0 }));
    }

    #[test]
    fn test_zero_timeout_times_out() {
        let mut config = small_config();
        config.simulation.timeout_secs = Some(0);
        let sim = TransportSimulator::new(&config, params()).unwrap();
        let err = sim.simulate(1.0, &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, AnalysisError::TimedOut { step: 0, .. }));
    }

    #[test]
    fn test_fail_policy_rejects_before_stepping() {
        let mut config = small_config();
        config.simulation.stability_policy = StabilityPolicy::Fail;
        let p = HydrogeologicalParameters {
            hydraulic_conductivity: 10.0,
            ..params()
        };
        assert!(matches!(
            TransportSimulator::new(&config, p),
            Err(AnalysisError::NumericalInstability { step: 0, .. })
        ));
    }

    #[test]
    fn test_strict_boundary_rejects_edge_plume() {
        let mut config = small_config();
        config.grid.nx = 5;
        config.grid.ny = 5;
        config.grid.nz = 3;
        config.simulation.strict_domain_boundary = true;
        let sim = TransportSimulator::new(&config, fast_params()).unwrap();
        assert!(matches!(
            sim.simulate(100.0, &CancellationToken::new()),
            Err(AnalysisError::Configuration(_))
        ));
    }

    #[test]
    fn test_mismatched_initial_field_rejected() {
        let sim = TransportSimulator::new(&small_config(), params()).unwrap();
        let other = ConcentrationField::zeros(
            GridDims { nx: 3, ny: 3, nz: 3 },
            GridSpacing { dx: 1.0, dy: 1.0, dz: 1.0 },
        );
        assert!(sim.run(other, &CancellationToken::new()).is_err());
    }
}
