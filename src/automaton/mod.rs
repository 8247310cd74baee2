//! Core automaton logic.
//!
//! Grid construction and access, the transition rule, generation stepping
//! and the breeding policy. The simulation loop in `simulation` drives these.

pub mod breeding;
pub mod grid;
pub mod rule;
pub mod stepping;

pub use breeding::{random_color, BreedingPolicy};
pub use grid::{axis_seed, count_neighbors, create_grid, from_cells, index_of, population};
pub use rule::{TransitionRule, LIFE_OFFSET};
pub use stepping::{convolve_wrapped, step_automaton};
