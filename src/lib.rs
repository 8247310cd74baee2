//! Voxel Life - 3D Game of Life on a toroidal lattice
//!
//! The engine owns the grid, steps it with a wraparound Moore neighbourhood,
//! reseeds stagnant populations and pushes each generation to a [`render::Renderer`].

pub mod automaton;
pub mod config;
pub mod error;
pub mod persistence;
pub mod render;
pub mod simulation;
pub mod state;


pub use config::Config;
pub use error::{LifeError, Result};
pub use simulation::{SimParams, Simulation};
pub use state::{DisplayColor, Grid, SizeField};
