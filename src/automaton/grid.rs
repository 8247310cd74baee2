//! Grid initialization and cell access helpers.

use crate::error::{LifeError, Result};
use crate::state::Grid;

/// Reject side lengths the position mapping cannot centre.
pub fn validate_side(side: usize) -> Result<()> {
    if side == 0 {
        return Err(LifeError::EmptyGrid);
    }
    if side % 2 != 0 {
        return Err(LifeError::OddGridSize(side));
    }
    Ok(())
}

/// Number of cells in a lattice of `side`, or an error if it does not fit in memory.
pub fn cell_count(side: usize) -> Result<usize> {
    side.checked_mul(side)
        .and_then(|square| square.checked_mul(side))
        .ok_or(LifeError::GridTooLarge(side))
}

/// Initialize an all-dead grid with the given side length.
pub fn create_grid(side: usize) -> Result<Grid> {
    validate_side(side)?;
    Ok(Grid {
        side,
        cells: vec![0; cell_count(side)?],
        generation: 0,
    })
}

/// Wrap an existing occupancy buffer, checking shape and cell values.
pub fn from_cells(side: usize, cells: Vec<u8>) -> Result<Grid> {
    validate_side(side)?;
    if cells.len() != cell_count(side)? {
        return Err(LifeError::ShapeMismatch(vec![cells.len()]));
    }
    if let Some((index, &value)) = cells.iter().enumerate().find(|&(_, &c)| c > 1) {
        return Err(LifeError::NonBinaryCell {
            index,
            value: f64::from(value),
        });
    }
    Ok(Grid {
        side,
        cells,
        generation: 0,
    })
}

/// Default seed: three orthogonal lines through the origin.
///
/// Alive cells are `(*, 0, 0)`, `(0, *, 0)` and `(0, 0, *)`.
pub fn axis_seed(side: usize) -> Result<Grid> {
    let mut grid = create_grid(side)?;
    for i in 0..side {
        set_cell(&mut grid, i, 0, 0, true);
        set_cell(&mut grid, 0, i, 0, true);
        set_cell(&mut grid, 0, 0, i, true);
    }
    Ok(grid)
}

/// Calculate the linear index for a 3D coordinate.
#[inline]
pub fn index_of(grid: &Grid, x: usize, y: usize, z: usize) -> usize {
    grid.index(x, y, z)
}

/// Map a possibly out-of-range coordinate back onto the torus.
#[inline]
pub fn wrap(coord: isize, side: usize) -> usize {
    coord.rem_euclid(side as isize) as usize
}

/// Linear index of `(x + dx, y + dy, z + dz)` under wraparound.
#[inline]
pub fn wrapped_index(grid: &Grid, x: usize, y: usize, z: usize, dx: isize, dy: isize, dz: isize) -> usize {
    let side = grid.side;
    index_of(
        grid,
        wrap(x as isize + dx, side),
        wrap(y as isize + dy, side),
        wrap(z as isize + dz, side),
    )
}

pub fn get_cell(grid: &Grid, x: usize, y: usize, z: usize) -> bool {
    grid.cells[index_of(grid, x, y, z)] != 0
}

pub fn set_cell(grid: &mut Grid, x: usize, y: usize, z: usize, alive: bool) {
    let idx = index_of(grid, x, y, z);
    grid.cells[idx] = u8::from(alive);
}

/// Count alive neighbors using the Moore neighborhood (26 neighbors) on the torus.
///
/// On sides below 3 neighbourhoods overlap and the same cell is counted more than once.
pub fn count_neighbors(grid: &Grid, x: usize, y: usize, z: usize) -> u8 {
    let mut count = 0;

    for dz in -1..=1 {
        for dy in -1..=1 {
            for dx in -1..=1 {
                // Skip the center cell
                if dx == 0 && dy == 0 && dz == 0 {
                    continue;
                }
                count += grid.cells[wrapped_index(grid, x, y, z, dx, dy, dz)];
            }
        }
    }

    count
}

/// Number of alive cells.
pub fn population(grid: &Grid) -> usize {
    grid.cells.iter().filter(|&&c| c != 0).count()
}

/// Kill every cell.
pub fn clear(grid: &mut Grid) {
    grid.cells.iter_mut().for_each(|c| *c = 0);
}
