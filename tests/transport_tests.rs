//! Transport Solver Tests
//!
//! Exercises the finite-difference solver through its public API: stability
//! policy, positivity, symmetry, cancellation and timeouts.

use std::thread;
use std::time::Duration;

use plumewatch::config::{AnalysisConfig, StabilityPolicy};
use plumewatch::physics_engine::{HydrogeologicalParameterResolver, TransportSimulator};
use plumewatch::types::AquiferType;
use plumewatch::AnalysisError;
use tokio_util::sync::CancellationToken;

/// Small grid with a conductive aquifer so the plume spreads several cells.
fn fast_config() -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    config.grid.nx = 21;
    config.grid.ny = 21;
    config.grid.nz = 7;
    config.hydrogeology.hydraulic_conductivity = 0.05;
    config.simulation.horizon_days = 120.0;
    config
}

fn simulator(config: &AnalysisConfig) -> TransportSimulator {
    let params = HydrogeologicalParameterResolver::new(&config.hydrogeology)
        .resolve(AquiferType::Unconfined);
    TransportSimulator::new(config, params).unwrap()
}

#[test]
fn field_never_negative_and_bounded_by_source() {
    let config = fast_config();
    let out = simulator(&config)
        .simulate(2.5, &CancellationToken::new())
        .unwrap();
    assert!(out.field.values().iter().all(|v| *v >= 0.0));
    assert!(out.field.max() <= 2.5 * (1.0 + 1e-9));
    assert_eq!(out.steps, 1200);
}

#[test]
fn plume_spreads_below_source() {
    let config = fast_config();
    let out = simulator(&config)
        .simulate(1.0, &CancellationToken::new())
        .unwrap();
    let shallow = out.field.get(10, 10, 1);
    let deeper = out.field.get(10, 10, 2);
    assert!(shallow > 0.0);
    assert!(shallow > deeper);
}

#[test]
fn transverse_spread_is_symmetric() {
    let config = fast_config();
    let out = simulator(&config)
        .simulate(1.0, &CancellationToken::new())
        .unwrap();
    for dj in 1..4 {
        let left = out.field.get(11, 10 - dj, 1);
        let right = out.field.get(11, 10 + dj, 1);
        assert!((left - right).abs() <= 1e-10 * left.max(1e-300));
    }
}

#[test]
fn advection_biases_plume_downgradient() {
    let config = fast_config();
    let out = simulator(&config)
        .simulate(1.0, &CancellationToken::new())
        .unwrap();
    assert!(out.field.get(12, 10, 1) >= out.field.get(8, 10, 1));
}

#[test]
fn retardation_slows_spreading() {
    let plain = fast_config();
    let mut retarded = fast_config();
    retarded.simulation.apply_retardation = true;

    let a = simulator(&plain).simulate(1.0, &CancellationToken::new()).unwrap();
    let b = simulator(&retarded).simulate(1.0, &CancellationToken::new()).unwrap();
    assert!(b.field.get(13, 10, 1) < a.field.get(13, 10, 1));
}

#[test]
fn unstable_step_fails_under_fail_policy() {
    let mut config = fast_config();
    config.hydrogeology.hydraulic_conductivity = 0.1;
    config.simulation.dt_days = 50.0;
    config.simulation.horizon_days = 500.0;
    config.simulation.stability_policy = StabilityPolicy::Fail;

    let params = HydrogeologicalParameterResolver::new(&config.hydrogeology)
        .resolve(AquiferType::Unconfined);
    let err = TransportSimulator::new(&config, params).unwrap_err();
    assert!(matches!(err, AnalysisError::NumericalInstability { step: 0, .. }));
}

#[test]
fn unstable_step_reduced_under_reduce_policy() {
    let mut config = fast_config();
    config.hydrogeology.hydraulic_conductivity = 0.1;
    config.simulation.dt_days = 50.0;
    config.simulation.horizon_days = 500.0;

    let sim = simulator(&config);
    let report = *sim.stability();
    assert!(report.reduced);
    assert!(report.diffusion_number <= 1.0);
    assert!(report.dt_days < 50.0);

    let out = sim.simulate(1.0, &CancellationToken::new()).unwrap();
    assert!(out.field.values().iter().all(|v| v.is_finite() && *v >= 0.0));
}

#[test]
fn advection_without_dispersion_rejected() {
    let mut config = fast_config();
    config.hydrogeology.dispersivity = 0.0;
    let params = HydrogeologicalParameterResolver::new(&config.hydrogeology)
        .resolve(AquiferType::Unconfined);
    assert!(matches!(
        TransportSimulator::new(&config, params),
        Err(AnalysisError::NumericalInstability { .. })
    ));
}

#[test]
fn cancellation_during_run_returns_cancelled() {
    // Full-size grid: long enough that the cancel lands mid-run
    let config = AnalysisConfig::default();
    let sim = simulator(&config);
    let token = CancellationToken::new();
    let canceller = token.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        canceller.cancel();
    });

    let result = sim.simulate(1.0, &token);
    handle.join().unwrap();
    assert!(matches!(result, Err(AnalysisError::Cancelled { .. })));
}

#[test]
fn zero_timeout_reports_timed_out() {
    let mut config = fast_config();
    config.simulation.timeout_secs = Some(0);
    let err = simulator(&config)
        .simulate(1.0, &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, AnalysisError::TimedOut { .. }));
    assert_eq!(err.status(), "timed_out");
}

#[test]
fn strict_boundary_rejects_plume_at_edge() {
    let mut config = fast_config();
    config.grid.nx = 7;
    config.grid.ny = 7;
    config.grid.nz = 3;
    config.simulation.strict_domain_boundary = true;
    let err = simulator(&config)
        .simulate(50.0, &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Configuration(_)));
}
