//! Dense 3-D concentration grid and the double buffer used while stepping.
//!
//! Layout is x-major: `index = (i * ny + j) * nz + k`, so one x-plane is a
//! contiguous `ny * nz` slice. The solver decomposes work along those planes.

use serde::{Deserialize, Serialize};

use crate::config::GridConfig;
use crate::error::{AnalysisError, Result};

/// Cell counts per axis. Fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDims {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

impl GridDims {
    pub fn len(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of one contiguous x-plane.
    pub fn plane_len(&self) -> usize {
        self.ny * self.nz
    }

    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.ny + j) * self.nz + k
    }

    #[inline]
    pub fn coords(&self, index: usize) -> (usize, usize, usize) {
        let k = index % self.nz;
        let j = (index / self.nz) % self.ny;
        let i = index / self.plane_len();
        (i, j, k)
    }

    /// Horizontal centre column, where sources are deposited.
    pub fn center_xy(&self) -> (usize, usize) {
        (self.nx / 2, self.ny / 2)
    }
}

/// Cell spacing (m).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpacing {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl GridSpacing {
    /// Horizontal footprint of one cell (m²).
    pub fn cell_area(&self) -> f64 {
        self.dx * self.dy
    }
}

/// Check grid geometry; anything unusable is a configuration failure.
pub fn grid_from_config(config: &GridConfig) -> Result<(GridDims, GridSpacing)> {
    let dims = GridDims {
        nx: config.nx,
        ny: config.ny,
        nz: config.nz,
    };
    if dims.nx < 3 || dims.ny < 3 || dims.nz < 3 {
        return Err(AnalysisError::Configuration(format!(
            "grid {}x{}x{} has no interior cells (each axis needs >= 3)",
            dims.nx, dims.ny, dims.nz
        )));
    }
    let spacing = GridSpacing {
        dx: config.dx_m,
        dy: config.dy_m,
        dz: config.dz_m,
    };
    for (name, h) in [("dx", spacing.dx), ("dy", spacing.dy), ("dz", spacing.dz)] {
        if !(h.is_finite() && h > 0.0) {
            return Err(AnalysisError::Configuration(format!(
                "grid spacing {name} = {h} must be positive and finite"
            )));
        }
    }
    Ok((dims, spacing))
}

// ============================================================================
// Concentration Field
// ============================================================================

/// Non-negative concentration values (mg/L) on a fixed grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcentrationField {
    dims: GridDims,
    spacing: GridSpacing,
    data: Vec<f64>,
}

impl ConcentrationField {
    pub fn zeros(dims: GridDims, spacing: GridSpacing) -> Self {
        Self {
            dims,
            spacing,
            data: vec![0.0; dims.len()],
        }
    }

    /// Wrap existing values. Length must match the grid and every value
    /// must be finite and non-negative.
    pub fn from_values(dims: GridDims, spacing: GridSpacing, data: Vec<f64>) -> Result<Self> {
        if data.len() != dims.len() {
            return Err(AnalysisError::Validation(format!(
                "field has {} values, grid needs {}",
                data.len(),
                dims.len()
            )));
        }
        if let Some(bad) = data.iter().position(|v| !(v.is_finite() && *v >= 0.0)) {
            return Err(AnalysisError::Validation(format!(
                "field value at index {bad} is {} (must be finite and >= 0)",
                data[bad]
            )));
        }
        Ok(Self { dims, spacing, data })
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn spacing(&self) -> GridSpacing {
        self.spacing
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data[self.dims.index(i, j, k)]
    }

    pub fn set(&mut self, i: usize, j: usize, k: usize, value: f64) {
        let idx = self.dims.index(i, j, k);
        self.data[idx] = value;
    }

    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(0.0, f64::max)
    }

    pub fn min(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Cell-wise sum into `self`; grids must match.
    pub fn accumulate(&mut self, other: &ConcentrationField) -> Result<()> {
        if self.dims != other.dims {
            return Err(AnalysisError::Configuration(format!(
                "cannot combine fields on different grids ({:?} vs {:?})",
                self.dims, other.dims
            )));
        }
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += b;
        }
        Ok(())
    }
}

// ============================================================================
// Grid Buffer
// ============================================================================

/// Two same-sized buffers swapped each step. Allocated once per run and
/// dropped with the run, whichever way it exits.
pub(crate) struct GridBuffer {
    dims: GridDims,
    spacing: GridSpacing,
    current: Vec<f64>,
    next: Vec<f64>,
}

impl GridBuffer {
    /// Both buffers start as copies of the initial field, so cells the
    /// stencil never writes (the Dirichlet boundary) keep their initial value.
    pub fn new(initial: ConcentrationField) -> Self {
        let next = initial.data.clone();
        Self {
            dims: initial.dims,
            spacing: initial.spacing,
            current: initial.data,
            next,
        }
    }

    /// Read the current step and write the next one.
    pub fn split(&mut self) -> (&[f64], &mut [f64]) {
        (&self.current, &mut self.next)
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }

    pub fn current(&self) -> &[f64] {
        &self.current
    }

    pub fn into_field(self) -> ConcentrationField {
        ConcentrationField {
            dims: self.dims,
            spacing: self.spacing,
            data: self.current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims() -> GridDims {
        GridDims { nx: 4, ny: 5, nz: 6 }
    }

    fn spacing() -> GridSpacing {
        GridSpacing { dx: 10.0, dy: 10.0, dz: 1.0 }
    }

    #[test]
    fn test_index_coords_roundtrip() {
        let d = dims();
        for idx in 0..d.len() {
            let (i, j, k) = d.coords(idx);
            assert_eq!(d.index(i, j, k), idx);
        }
    }

    #[test]
    fn test_plane_is_contiguous() {
        let d = dims();
        assert_eq!(d.index(1, 0, 0), d.plane_len());
        assert_eq!(d.index(0, 1, 0), d.nz);
    }

    #[test]
    fn test_from_values_rejects_negative() {
        let mut data = vec![0.0; dims().len()];
        data[7] = -1.0;
        assert!(ConcentrationField::from_values(dims(), spacing(), data).is_err());
    }

    #[test]
    fn test_accumulate_sums_cells() {
        let mut a = ConcentrationField::zeros(dims(), spacing());
        let mut b = ConcentrationField::zeros(dims(), spacing());
        a.set(1, 1, 1, 2.0);
        b.set(1, 1, 1, 3.0);
        a.accumulate(&b).unwrap();
        assert!((a.get(1, 1, 1) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_grid_without_interior_rejected() {
        let config = GridConfig { nz: 2, ..GridConfig::default() };
        assert!(matches!(grid_from_config(&config), Err(AnalysisError::Configuration(_))));
    }

    #[test]
    fn test_buffer_keeps_unwritten_cells() {
        let mut field = ConcentrationField::zeros(dims(), spacing());
        field.set(0, 2, 0, 4.0);
        let mut buffer = GridBuffer::new(field);
        buffer.swap();
        assert!((buffer.into_field().get(0, 2, 0) - 4.0).abs() < 1e-12);
    }
}
