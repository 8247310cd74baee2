//! Generation stepping: wraparound sentinel convolution plus the transition rule.
//!
//! The 3×3×3 kernel is all ones except the centre, which weighs the cell's own
//! state by [`LIFE_OFFSET`]. One pass therefore yields, per cell, the encoded
//! value the rule consumes. Slabs of constant z are computed in parallel; every
//! slab reads only the current grid and writes only its own part of the next
//! buffers, so the result does not depend on scheduling.

use rayon::prelude::*;

use super::grid::{index_of, wrapped_index};
use super::rule::{TransitionRule, LIFE_OFFSET};
use crate::state::{Grid, SizeField};

/// Kernel weight at offset `(dx, dy, dz)`.
#[inline]
fn kernel_weight(dx: isize, dy: isize, dz: isize) -> i32 {
    if dx == 0 && dy == 0 && dz == 0 {
        LIFE_OFFSET
    } else {
        1
    }
}

/// Convolve one cell with the sentinel kernel under wraparound.
pub fn encoded_value(grid: &Grid, x: usize, y: usize, z: usize) -> i32 {
    let mut sum = 0;
    for dz in -1..=1 {
        for dy in -1..=1 {
            for dx in -1..=1 {
                let cell = grid.cells[wrapped_index(grid, x, y, z, dx, dy, dz)];
                sum += i32::from(cell) * kernel_weight(dx, dy, dz);
            }
        }
    }
    sum
}

/// The full convolution pass, one encoded value per cell.
pub fn convolve_wrapped(grid: &Grid) -> Vec<i32> {
    let side = grid.side;
    let mut encoded = vec![0; grid.len()];
    for z in 0..side {
        for y in 0..side {
            for x in 0..side {
                encoded[index_of(grid, x, y, z)] = encoded_value(grid, x, y, z);
            }
        }
    }
    encoded
}

/// Step the automaton forward by one generation.
///
/// Replaces `grid` with its successor and rewrites `sizes` from the rule's
/// size thresholds. The encoded values never outlive this call.
pub fn step_automaton(grid: &mut Grid, sizes: &mut SizeField, rule: &TransitionRule) {
    if grid.cells.is_empty() {
        return;
    }
    debug_assert_eq!(sizes.values.len(), grid.cells.len());

    let side = grid.side;
    let slab = side * side;
    let mut next_cells = vec![0; grid.cells.len()];

    {
        let current: &Grid = grid;
        next_cells
            .par_chunks_mut(slab)
            .zip(sizes.values.par_chunks_mut(slab))
            .enumerate()
            .for_each(|(z, (cells_out, sizes_out))| {
                for y in 0..side {
                    for x in 0..side {
                        let (state, size) = rule.evaluate(encoded_value(current, x, y, z));
                        let local = y * side + x;
                        cells_out[local] = state;
                        sizes_out[local] = size;
                    }
                }
            });
    }

    grid.cells = next_cells;
    grid.generation += 1;
}
