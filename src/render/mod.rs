//! Rendering boundary.
//!
//! The simulation loop only talks to a [`Renderer`]; concrete backends live
//! in the submodules. Positions are computed once per run and shared
//! read-only with whichever backend is in use.

use serde::{Deserialize, Serialize};

use crate::state::DisplayColor;

pub mod headless;
#[cfg(feature = "window")]
pub mod window;

pub use headless::HeadlessRenderer;
#[cfg(feature = "window")]
pub use window::WindowRenderer;

/// How the display surface should be shown at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Windowed,
    #[default]
    Maximized,
    Fullscreen,
    /// Nothing is shown; the loop runs unpaced.
    Hidden,
}

/// Capability the simulation loop drives once per iteration.
pub trait Renderer {
    /// Called once before the first iteration.
    fn set_display_mode(&mut self, mode: DisplayMode);

    /// Replace the displayed point cloud.
    fn present(&mut self, positions: &[[f32; 3]], color: DisplayColor, sizes: &[f32]);

    /// Rotate the camera about the vertical axis by `angle` degrees.
    fn advance_orbit(&mut self, angle: f32);

    /// Hand control to the event boundary. This is the loop's only yield point.
    fn process_events(&mut self);

    fn is_closed(&self) -> bool;
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn set_display_mode(&mut self, mode: DisplayMode) {
        (**self).set_display_mode(mode);
    }

    fn present(&mut self, positions: &[[f32; 3]], color: DisplayColor, sizes: &[f32]) {
        (**self).present(positions, color, sizes);
    }

    fn advance_orbit(&mut self, angle: f32) {
        (**self).advance_orbit(angle);
    }

    fn process_events(&mut self) {
        (**self).process_events();
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

/// Visual coordinate of one axis index.
///
/// Indices in the upper half wrap to negative offsets, so index 0 sits at the
/// origin and the lattice covers `[-2, 2)` symmetrically.
#[inline]
pub fn axis_coordinate(index: usize, side: usize) -> f32 {
    let half = side / 2;
    let signed = if index >= half {
        index as f32 - side as f32
    } else {
        index as f32
    };
    signed / (side as f32 / 4.0)
}

/// Static coordinates for every cell, indexed like `Grid::cells`.
pub fn position_field(side: usize) -> Vec<[f32; 3]> {
    let mut positions = Vec::with_capacity(side * side * side);
    for z in 0..side {
        for y in 0..side {
            for x in 0..side {
                positions.push([
                    axis_coordinate(x, side),
                    axis_coordinate(y, side),
                    axis_coordinate(z, side),
                ]);
            }
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::grid::{create_grid, index_of};

    #[test]
    fn test_axis_coordinate_is_centred() {
        let side = 8;
        assert_eq!(axis_coordinate(0, side), 0.0);
        assert_eq!(axis_coordinate(1, side), 0.5);
        assert_eq!(axis_coordinate(3, side), 1.5);
        assert_eq!(axis_coordinate(4, side), -2.0);
        assert_eq!(axis_coordinate(7, side), -0.5);
    }

    #[test]
    fn test_position_field_matches_grid_indexing() {
        let side = 6;
        let grid = create_grid(side).unwrap();
        let positions = position_field(side);
        assert_eq!(positions.len(), grid.len());

        let idx = index_of(&grid, 1, 2, 4);
        assert_eq!(
            positions[idx],
            [
                axis_coordinate(1, side),
                axis_coordinate(2, side),
                axis_coordinate(4, side)
            ]
        );
    }

    #[test]
    fn test_positions_stay_in_range() {
        for p in position_field(10) {
            for c in p {
                assert!((-2.0..2.0).contains(&c));
            }
        }
    }
}
