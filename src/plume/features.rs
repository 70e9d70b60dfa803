//! Per-cell spatial features fed to the correction model.

use rayon::prelude::*;

use crate::physics_engine::ConcentrationField;

/// Number of entries in `CellFeatures::to_vector`.
pub const FEATURE_COUNT: usize = 6;

/// Spatial features of one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellFeatures {
    pub concentration: f64,
    /// dC/dx, dC/dy, dC/dz (mg/L per m)
    pub gradient: [f64; 3],
    /// Mean over the in-grid 3x3x3 neighbourhood
    pub local_mean: f64,
    pub local_std: f64,
}

impl CellFeatures {
    /// `[concentration, grad_x, grad_y, grad_z, local_mean, local_std]`
    pub fn to_vector(&self) -> [f64; FEATURE_COUNT] {
        [
            self.concentration,
            self.gradient[0],
            self.gradient[1],
            self.gradient[2],
            self.local_mean,
            self.local_std,
        ]
    }
}

/// Central difference inside, one-sided at the first and last cell.
fn axis_gradient(at: impl Fn(usize) -> f64, pos: usize, n: usize, h: f64) -> f64 {
    if n < 2 {
        0.0
    } else if pos == 0 {
        (at(1) - at(0)) / h
    } else if pos == n - 1 {
        (at(n - 1) - at(n - 2)) / h
    } else {
        (at(pos + 1) - at(pos - 1)) / (2.0 * h)
    }
}

pub fn cell_features(field: &ConcentrationField, i: usize, j: usize, k: usize) -> CellFeatures {
    let d = field.dims();
    let s = field.spacing();

    let gradient = [
        axis_gradient(|x| field.get(x, j, k), i, d.nx, s.dx),
        axis_gradient(|y| field.get(i, y, k), j, d.ny, s.dy),
        axis_gradient(|z| field.get(i, j, z), k, d.nz, s.dz),
    ];

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut n = 0usize;
    for x in i.saturating_sub(1)..=(i + 1).min(d.nx - 1) {
        for y in j.saturating_sub(1)..=(j + 1).min(d.ny - 1) {
            for z in k.saturating_sub(1)..=(k + 1).min(d.nz - 1) {
                let v = field.get(x, y, z);
                sum += v;
                sum_sq += v * v;
                n += 1;
            }
        }
    }
    let mean = sum / n as f64;
    let variance = (sum_sq / n as f64 - mean * mean).max(0.0);

    CellFeatures {
        concentration: field.get(i, j, k),
        gradient,
        local_mean: mean,
        local_std: variance.sqrt(),
    }
}

/// Features for every cell, in grid index order.
pub fn extract_features(field: &ConcentrationField) -> Vec<CellFeatures> {
    let d = field.dims();
    (0..d.len())
        .into_par_iter()
        .map(|idx| {
            let (i, j, k) = d.coords(idx);
            cell_features(field, i, j, k)
        })
        .collect()
}
