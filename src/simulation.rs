//! Time-paced simulation loop.
//!
//! Each iteration counts the population, lets the breeding policy reseed if
//! needed, advances a generation once the frame delay has elapsed, then
//! orbits the camera and yields to the renderer's event boundary. The loop
//! ends only when the renderer reports its surface closed.

use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::automaton::breeding::BreedingPolicy;
use crate::automaton::grid::population;
use crate::automaton::rule::TransitionRule;
use crate::automaton::stepping::step_automaton;
use crate::error::{LifeError, Result};
use crate::render::{position_field, DisplayMode, Renderer};
use crate::state::{DisplayColor, Grid, SizeField};

/// Per-run parameters, fixed once the run starts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Minimum wall-clock time between generations, in seconds.
    pub delay_secs: f64,
    #[serde(flatten)]
    pub breeding: BreedingPolicy,
    pub display_mode: DisplayMode,
    /// Camera orbit per iteration, in degrees.
    pub orbit_speed: f32,
}

impl Default for SimParams {
    fn default() -> Self {
        SimParams {
            delay_secs: 0.4,
            breeding: BreedingPolicy::default(),
            display_mode: DisplayMode::Maximized,
            orbit_speed: 0.1,
        }
    }
}

impl SimParams {
    /// Preset for fresh runs: unpaced, with breeding on.
    pub fn aggressive() -> Self {
        SimParams {
            delay_secs: 0.0,
            breeding: BreedingPolicy::aggressive(),
            ..SimParams::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.delay_secs.is_finite() || self.delay_secs < 0.0 {
            return Err(LifeError::config(format!(
                "delay_secs must be a non-negative number, got {}",
                self.delay_secs
            )));
        }
        if !self.orbit_speed.is_finite() {
            return Err(LifeError::config("orbit_speed must be finite"));
        }
        let breeding = &self.breeding;
        if breeding.min_life > breeding.max_life {
            return Err(LifeError::config(format!(
                "min_life ({}) exceeds max_life ({})",
                breeding.min_life, breeding.max_life
            )));
        }
        if breeding.enabled && breeding.k == 0 {
            return Err(LifeError::config("breeding needs a seed block of k >= 1"));
        }
        Ok(())
    }

    /// Frame delay actually used; hidden runs are never paced.
    pub fn effective_delay(&self) -> Duration {
        if self.display_mode == DisplayMode::Hidden {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(self.delay_secs)
        }
    }
}

/// Owns the lattice and everything derived from it for one run.
pub struct Simulation<G: Rng> {
    grid: Grid,
    sizes: SizeField,
    positions: Vec<[f32; 3]>,
    color: DisplayColor,
    rule: TransitionRule,
    params: SimParams,
    delay: Duration,
    rng: G,
    generations_since_reseed: u64,
    reseeds: u64,
    last_advance: Instant,
}

impl<G: Rng> Simulation<G> {
    pub fn new(grid: Grid, rule: TransitionRule, params: SimParams, rng: G) -> Result<Self> {
        params.validate()?;
        let side = grid.side;
        Ok(Simulation {
            sizes: SizeField::zeroed(side),
            positions: position_field(side),
            grid,
            color: DisplayColor::WHITE,
            rule,
            delay: params.effective_delay(),
            params,
            rng,
            generations_since_reseed: 0,
            reseeds: 0,
            last_advance: Instant::now(),
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn sizes(&self) -> &SizeField {
        &self.sizes
    }

    pub fn color(&self) -> DisplayColor {
        self.color
    }

    pub fn reseeds(&self) -> u64 {
        self.reseeds
    }

    pub fn generations_since_reseed(&self) -> u64 {
        self.generations_since_reseed
    }

    /// Reseed if the breeding policy asks for it. Returns whether it did.
    pub fn breed_if_needed(&mut self) -> bool {
        let population = population(&self.grid);
        self.generations_since_reseed += 1;

        if !self
            .params
            .breeding
            .should_breed(population, self.generations_since_reseed)
        {
            return false;
        }

        self.generations_since_reseed = 0;
        self.color = self.params.breeding.reseed(&mut self.grid, &mut self.rng);
        self.reseeds += 1;
        info!(
            generation = self.grid.generation,
            population,
            reseeds = self.reseeds,
            "population reseeded"
        );
        true
    }

    /// Advance one generation and push the result to the renderer.
    pub fn advance<R: Renderer>(&mut self, renderer: &mut R) {
        step_automaton(&mut self.grid, &mut self.sizes, &self.rule);
        renderer.present(&self.positions, self.color, &self.sizes.values);
        trace!(generation = self.grid.generation, "generation advanced");
    }

    /// One loop iteration at wall-clock time `now`. Returns whether a generation advanced.
    pub fn iterate<R: Renderer>(&mut self, renderer: &mut R, now: Instant) -> bool {
        self.breed_if_needed();

        let due = now.saturating_duration_since(self.last_advance) >= self.delay;
        if due {
            self.last_advance = now;
            self.advance(renderer);
        }

        renderer.advance_orbit(self.params.orbit_speed);
        renderer.process_events();
        due
    }

    /// Drive the loop until the renderer closes, then hand back the final grid.
    pub fn run<R: Renderer>(mut self, renderer: &mut R) -> Grid {
        renderer.set_display_mode(self.params.display_mode);
        self.last_advance = Instant::now();
        info!(
            side = self.grid.side,
            population = population(&self.grid),
            breeding = self.params.breeding.enabled,
            "simulation started"
        );

        while !renderer.is_closed() {
            self.iterate(renderer, Instant::now());
        }

        info!(
            generation = self.grid.generation,
            population = population(&self.grid),
            reseeds = self.reseeds,
            "simulation stopped"
        );
        self.grid
    }
}
