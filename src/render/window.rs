//! Raylib window renderer.
//!
//! Live cells are drawn as small cubes around the origin while the camera
//! orbits the vertical axis. Events are polled when a frame is drawn, which
//! happens in [`Renderer::process_events`].

use raylib::prelude::*;
use tracing::info;

use super::{DisplayMode, Renderer};
use crate::state::DisplayColor;

/// World units per unit of visual size.
const POINT_SCALE: f32 = 0.005;
const ORBIT_DISTANCE: f32 = 7.0;
const ORBIT_ELEVATION_DEG: f32 = 30.0;

pub struct WindowRenderer {
    rl: RaylibHandle,
    thread: RaylibThread,
    azimuth_deg: f32,
    points: Vec<(Vector3, f32)>,
    color: Color,
    hidden: bool,
}

impl WindowRenderer {
    pub fn new(title: &str) -> Self {
        let (mut rl, thread) = raylib::init()
            .size(1024, 768)
            .title(title)
            .resizable()
            .build();
        rl.set_target_fps(60);

        WindowRenderer {
            rl,
            thread,
            azimuth_deg: 45.0,
            points: Vec::new(),
            color: Color::WHITE,
            hidden: false,
        }
    }

    fn camera(&self) -> Camera3D {
        let azimuth = self.azimuth_deg.to_radians();
        let elevation = ORBIT_ELEVATION_DEG.to_radians();
        let position = Vector3::new(
            ORBIT_DISTANCE * azimuth.cos() * elevation.cos(),
            ORBIT_DISTANCE * elevation.sin(),
            ORBIT_DISTANCE * azimuth.sin() * elevation.cos(),
        );
        Camera3D::perspective(
            position,
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            45.0,
        )
    }
}

fn to_raylib_color(color: DisplayColor) -> Color {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::new(
        channel(color.r),
        channel(color.g),
        channel(color.b),
        channel(color.a),
    )
}

impl Renderer for WindowRenderer {
    fn set_display_mode(&mut self, mode: DisplayMode) {
        info!(?mode, "window display");
        match mode {
            DisplayMode::Windowed => {}
            DisplayMode::Maximized => self.rl.maximize_window(),
            DisplayMode::Fullscreen => self.rl.toggle_fullscreen(),
            DisplayMode::Hidden => self.hidden = true,
        }
    }

    fn present(&mut self, positions: &[[f32; 3]], color: DisplayColor, sizes: &[f32]) {
        self.color = to_raylib_color(color);
        self.points.clear();
        // Lattice z is drawn as raylib's up axis.
        self.points.extend(
            positions
                .iter()
                .zip(sizes)
                .filter(|(_, &size)| size > 0.0)
                .map(|(p, &size)| (Vector3::new(p[0], p[2], p[1]), size * POINT_SCALE)),
        );
    }

    fn advance_orbit(&mut self, angle: f32) {
        self.azimuth_deg = (self.azimuth_deg + angle) % 360.0;
    }

    fn process_events(&mut self) {
        if self.hidden {
            return;
        }
        let camera = self.camera();
        let mut d = self.rl.begin_drawing(&self.thread);
        d.clear_background(Color::BLACK);
        {
            let mut d3 = d.begin_mode3D(camera);
            d3.draw_grid(20, 0.2);
            for &(pos, edge) in &self.points {
                d3.draw_cube(pos, edge, edge, edge, self.color);
            }
        }
        d.draw_fps(12, 12);
    }

    fn is_closed(&self) -> bool {
        self.hidden || self.rl.window_should_close()
    }
}
