//! Life-like transition rule over sentinel-encoded neighbour sums.
//!
//! The generation step folds "was this cell alive" and "how many live
//! neighbours does it have" into one signed value:
//!
//! - dead cell:  `encoded = neighbours`                 (0..=26)
//! - alive cell: `encoded = neighbours + LIFE_OFFSET`   (LIFE_OFFSET..=LIFE_OFFSET + 26)
//!
//! `LIFE_OFFSET` is negative and far larger in magnitude than any neighbour
//! count, so the sign alone tells the two cases apart and subtracting the
//! offset recovers the count.

use serde::{Deserialize, Serialize};

/// Centre weight of the convolution kernel.
pub const LIFE_OFFSET: i32 = -100_000;

/// Largest neighbour count a cell can see in the Moore neighbourhood.
pub const MAX_NEIGHBORS: u8 = 26;

/// Thresholds and display sizes for the transition rule.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRule {
    /// Alive cells with fewer neighbours starve.
    pub starvation_limit: u8,
    /// Alive cells with more neighbours are overcrowded.
    pub overcrowding_limit: u8,
    /// Dead cells with exactly this many neighbours are born; `None` disables births.
    pub reproduction: Option<u8>,
    pub life_size: f32,
    pub dead_size: f32,
}

impl Default for TransitionRule {
    fn default() -> Self {
        TransitionRule {
            starvation_limit: 2,
            overcrowding_limit: 3,
            reproduction: Some(3),
            life_size: 16.0,
            dead_size: 0.0,
        }
    }
}

impl TransitionRule {
    /// A rule under which no cell ever changes state.
    pub fn frozen() -> Self {
        TransitionRule {
            starvation_limit: 0,
            overcrowding_limit: MAX_NEIGHBORS,
            reproduction: None,
            ..TransitionRule::default()
        }
    }

    /// Next `(state, visual size)` for one sentinel-encoded value.
    #[inline]
    pub fn evaluate(&self, encoded: i32) -> (u8, f32) {
        let alive_next = if encoded < 0 {
            let neighbors = encoded - LIFE_OFFSET;
            neighbors >= i32::from(self.starvation_limit)
                && neighbors <= i32::from(self.overcrowding_limit)
        } else {
            self.reproduction
                .is_some_and(|births| encoded == i32::from(births))
        };

        if alive_next {
            (1, self.life_size)
        } else {
            (0, self.dead_size)
        }
    }
}

/// Encode a cell's own state and neighbour count the way the convolution does.
#[inline]
pub fn encode(alive: bool, neighbors: u8) -> i32 {
    i32::from(neighbors) + if alive { LIFE_OFFSET } else { 0 }
}
