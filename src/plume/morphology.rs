//! Binary morphology on the thresholded field (6-connected neighbourhood).

use crate::physics_engine::GridDims;

const NEIGHBOURS: [(isize, isize, isize); 6] = [
    (-1, 0, 0),
    (1, 0, 0),
    (0, -1, 0),
    (0, 1, 0),
    (0, 0, -1),
    (0, 0, 1),
];

fn neighbour(dims: &GridDims, (i, j, k): (usize, usize, usize), (di, dj, dk): (isize, isize, isize)) -> Option<usize> {
    let x = i.checked_add_signed(di)?;
    let y = j.checked_add_signed(dj)?;
    let z = k.checked_add_signed(dk)?;
    (x < dims.nx && y < dims.ny && z < dims.nz).then(|| dims.index(x, y, z))
}

pub fn threshold_mask(values: &[f64], threshold: f64) -> Vec<bool> {
    values.iter().map(|&v| v > threshold).collect()
}

pub fn dilate(dims: &GridDims, mask: &[bool]) -> Vec<bool> {
    (0..mask.len())
        .map(|idx| {
            mask[idx]
                || NEIGHBOURS
                    .iter()
                    .any(|&o| neighbour(dims, dims.coords(idx), o).is_some_and(|n| mask[n]))
        })
        .collect()
}

/// Cells outside the grid count as unset, so masked cells on the grid edge erode.
pub fn erode(dims: &GridDims, mask: &[bool]) -> Vec<bool> {
    (0..mask.len())
        .map(|idx| {
            mask[idx]
                && NEIGHBOURS
                    .iter()
                    .all(|&o| neighbour(dims, dims.coords(idx), o).is_some_and(|n| mask[n]))
        })
        .collect()
}

/// Contour of the mask: `dilate(mask) XOR erode(mask)`, as `[i, j, k]` in index order.
pub fn boundary_cells(dims: &GridDims, mask: &[bool]) -> Vec<[usize; 3]> {
    if !mask.iter().any(|&m| m) {
        return Vec::new();
    }
    let dilated = dilate(dims, mask);
    let eroded = erode(dims, mask);
    dilated
        .iter()
        .zip(&eroded)
        .enumerate()
        .filter(|(_, (d, e))| **d != **e)
        .map(|(idx, _)| {
            let (i, j, k) = dims.coords(idx);
            [i, j, k]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims() -> GridDims {
        GridDims { nx: 5, ny: 5, nz: 5 }
    }

    #[test]
    fn test_empty_mask_has_no_boundary() {
        let d = dims();
        assert!(boundary_cells(&d, &vec![false; d.len()]).is_empty());
    }

    #[test]
    fn test_single_cell_boundary_is_cell_plus_neighbours() {
        let d = dims();
        let mut mask = vec![false; d.len()];
        mask[d.index(2, 2, 2)] = true;
        let b = boundary_cells(&d, &mask);
        assert_eq!(b.len(), 7);
        assert!(b.contains(&[2, 2, 2]));
        assert!(b.contains(&[2, 2, 3]));
    }

    #[test]
    fn test_solid_block_interior_excluded() {
        let d = dims();
        let mut mask = vec![false; d.len()];
        for i in 1..4 {
            for j in 1..4 {
                for k in 1..4 {
                    mask[d.index(i, j, k)] = true;
                }
            }
        }
        let b = boundary_cells(&d, &mask);
        assert!(!b.contains(&[2, 2, 2]));
        assert!(b.contains(&[1, 2, 2]));
        assert!(b.contains(&[0, 2, 2]));
    }

    #[test]
    fn test_full_grid_erodes_at_edges() {
        let d = dims();
        let mask = vec![true; d.len()];
        let eroded = erode(&d, &mask);
        assert!(!eroded[d.index(0, 2, 2)]);
        assert!(eroded[d.index(2, 2, 2)]);
    }
}
