//! Adaptive re-seeding of stagnant or out-of-bounds populations.
//!
//! A reseed fires only when the population has died out or outlived its
//! generation allowance, and at the same time sits outside
//! `[min_life, max_life]`. The replacement seed is a sparse random block in
//! the lattice corner, drawn together with a fresh display colour.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::grid::{clear, index_of};
use crate::state::{DisplayColor, Grid};

/// Independent fair coin draws multiplied per seed cell (alive with p = 1/16).
pub const SEED_COIN_DRAWS: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreedingPolicy {
    #[serde(rename = "breed")]
    pub enabled: bool,
    /// Edge length of the corner seed block.
    pub k: usize,
    pub min_life: usize,
    pub max_life: usize,
    /// Iterations a population may run before it is eligible for reseeding.
    pub gen_allowance: u64,
}

impl Default for BreedingPolicy {
    fn default() -> Self {
        BreedingPolicy {
            enabled: false,
            k: 3,
            min_life: 3,
            max_life: 32,
            gen_allowance: 4,
        }
    }
}

impl BreedingPolicy {
    /// Preset for fresh runs: breeding on with wide bounds.
    pub fn aggressive() -> Self {
        BreedingPolicy {
            enabled: true,
            k: 3,
            min_life: 12,
            max_life: 512,
            gen_allowance: 45,
        }
    }

    /// Decide whether the current population should be replaced.
    pub fn should_breed(&self, population: usize, generations_since_reseed: u64) -> bool {
        if !self.enabled {
            return false;
        }
        let stagnant = population == 0 || generations_since_reseed > self.gen_allowance;
        let out_of_bounds = population < self.min_life || population > self.max_life;
        stagnant && out_of_bounds
    }

    /// Clear the grid and plant a sparse random `k³` block at the origin corner.
    ///
    /// Returns the colour live cells should be drawn with from now on.
    pub fn reseed<R: Rng>(&self, grid: &mut Grid, rng: &mut R) -> DisplayColor {
        let color = random_color(rng);
        clear(grid);

        let k = self.k.min(grid.side);
        for z in 0..k {
            for y in 0..k {
                for x in 0..k {
                    let alive = (0..SEED_COIN_DRAWS).all(|_| rng.gen_bool(0.5));
                    let idx = index_of(grid, x, y, z);
                    grid.cells[idx] = u8::from(alive);
                }
            }
        }

        debug!(k, ?color, "reseeded corner block");
        color
    }
}

/// Random opaque colour with one channel forced fully on.
pub fn random_color<R: Rng>(rng: &mut R) -> DisplayColor {
    let mut channels: [f32; 3] = [rng.gen(), rng.gen(), rng.gen()];
    channels[rng.gen_range(0..3)] = 1.0;
    DisplayColor {
        r: channels[0],
        g: channels[1],
        b: channels[2],
        a: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::grid::{axis_seed, create_grid, get_cell, population};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_disabled_never_breeds() {
        let policy = BreedingPolicy::default();
        assert!(!policy.should_breed(0, 1_000));
    }

    #[test]
    fn test_extinction_triggers_immediately() {
        let policy = BreedingPolicy::aggressive();
        assert!(policy.should_breed(0, 0));
        assert!(policy.should_breed(0, 10));
    }

    #[test]
    fn test_allowance_must_be_exceeded() {
        let policy = BreedingPolicy::aggressive();
        // Below min_life but still inside the allowance
        assert!(!policy.should_breed(5, 45));
        assert!(policy.should_breed(5, 46));
        assert!(policy.should_breed(600, 46));
    }

    #[test]
    fn test_in_bounds_population_is_left_alone() {
        let policy = BreedingPolicy::aggressive();
        for gens in [0, 45, 46, 10_000] {
            assert!(!policy.should_breed(50, gens));
            assert!(!policy.should_breed(12, gens));
            assert!(!policy.should_breed(512, gens));
        }
    }

    #[test]
    fn test_reseed_confines_life_to_corner() {
        let policy = BreedingPolicy::aggressive();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..20 {
            let mut grid = axis_seed(10).unwrap();
            let color = policy.reseed(&mut grid, &mut rng);
            assert!(color.is_visible());

            for z in 0..10 {
                for y in 0..10 {
                    for x in 0..10 {
                        if x >= 3 || y >= 3 || z >= 3 {
                            assert!(!get_cell(&grid, x, y, z));
                        }
                    }
                }
            }
            assert!(population(&grid) <= 27);
        }
    }

    #[test]
    fn test_seed_density_is_sparse() {
        let policy = BreedingPolicy {
            k: 20,
            ..BreedingPolicy::aggressive()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut grid = create_grid(20).unwrap();
        policy.reseed(&mut grid, &mut rng);

        // 8000 cells at p = 1/16 → mean 500
        let alive = population(&grid);
        assert!((350..650).contains(&alive), "alive = {alive}");
    }

    #[test]
    fn test_k_clamped_to_side() {
        let policy = BreedingPolicy {
            k: 99,
            ..BreedingPolicy::aggressive()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut grid = create_grid(4).unwrap();
        policy.reseed(&mut grid, &mut rng);
        assert_eq!(grid.cells.len(), 64);
    }

    #[test]
    fn test_random_color_always_visible() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            let color = random_color(&mut rng);
            assert_eq!(color.a, 1.0);
            assert!(color.to_array()[..3].iter().any(|&c| c == 1.0));
            assert!(color.to_array().iter().all(|&c| (0.0..=1.0).contains(&c)));
        }
    }
}
