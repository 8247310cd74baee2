//! Core state structures: the cell lattice, its visual size field and the display colour.

/// A cubic lattice of cells with wraparound topology.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub side: usize,
    pub cells: Vec<u8>, // 0 = dead, 1 = alive
    pub generation: u64,
}

impl Grid {
    /// Get the linear index for a 3D coordinate
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        z * self.side * self.side + y * self.side + x
    }

    /// Number of cells in the lattice (side³).
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Per-cell display magnitude, indexed exactly like [`Grid::cells`].
///
/// Rendering only: nothing in the simulation reads it back.
#[derive(Clone, Debug, PartialEq)]
pub struct SizeField {
    pub side: usize,
    pub values: Vec<f32>,
}

impl SizeField {
    /// A field of invisible points for a lattice of the given side.
    pub fn zeroed(side: usize) -> Self {
        SizeField {
            side,
            values: vec![0.0; side * side * side],
        }
    }
}

/// RGBA colour shared by every live cell of a generation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl DisplayColor {
    pub const WHITE: DisplayColor = DisplayColor {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Opaque with at least one lit RGB channel.
    pub fn is_visible(&self) -> bool {
        self.a >= 1.0 && [self.r, self.g, self.b].iter().any(|&c| c > 0.0)
    }
}

impl Default for DisplayColor {
    fn default() -> Self {
        DisplayColor::WHITE
    }
}
