//! Windowless renderer.
//!
//! Keeps the last presented frame and reports itself closed once its frame
//! budget is spent. Used by the test suite and by runs without a display.

use tracing::{info, trace};

use super::{DisplayMode, Renderer};
use crate::state::DisplayColor;

#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    /// Frames after which the display counts as closed; `None` never closes.
    frame_budget: Option<u64>,
    mode: Option<DisplayMode>,
    frames_presented: u64,
    iterations: u64,
    /// Accumulated orbit, in degrees.
    orbit: f32,
    last_color: Option<DisplayColor>,
    last_sizes: Vec<f32>,
    closed: bool,
}

impl HeadlessRenderer {
    pub fn new(frame_budget: Option<u64>) -> Self {
        HeadlessRenderer {
            frame_budget,
            ..HeadlessRenderer::default()
        }
    }

    /// Close the surface from the outside, as a user closing a window would.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn frame_budget(&self) -> Option<u64> {
        self.frame_budget
    }

    /// Mode requested at startup, if any.
    pub fn mode(&self) -> Option<DisplayMode> {
        self.mode
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Loop iterations that reached the event boundary.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn orbit(&self) -> f32 {
        self.orbit
    }

    pub fn last_color(&self) -> Option<DisplayColor> {
        self.last_color
    }

    pub fn last_sizes(&self) -> &[f32] {
        &self.last_sizes
    }

    /// Number of points drawn with a positive size in the last frame.
    pub fn visible_points(&self) -> usize {
        self.last_sizes.iter().filter(|&&s| s > 0.0).count()
    }
}

impl Renderer for HeadlessRenderer {
    fn set_display_mode(&mut self, mode: DisplayMode) {
        info!(?mode, "headless display");
        self.mode = Some(mode);
        if mode == DisplayMode::Hidden {
            self.closed = true;
        }
    }

    fn present(&mut self, positions: &[[f32; 3]], color: DisplayColor, sizes: &[f32]) {
        debug_assert_eq!(positions.len(), sizes.len());
        self.frames_presented += 1;
        self.last_color = Some(color);
        self.last_sizes.clear();
        self.last_sizes.extend_from_slice(sizes);
        trace!(frame = self.frames_presented, visible = self.visible_points(), "frame presented");
    }

    fn advance_orbit(&mut self, angle: f32) {
        self.orbit = (self.orbit + angle) % 360.0;
    }

    fn process_events(&mut self) {
        self.iterations += 1;
        if let Some(budget) = self.frame_budget {
            if self.frames_presented >= budget {
                self.closed = true;
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
