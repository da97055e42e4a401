//! Fixed-rate render loop and 2D scene painting
//!
//! Drawing goes through the [`Canvas`] trait so the same scene code serves
//! the egui dashboard and headless tests.

mod scene;
mod surface;

pub use scene::{kind_color, paint_scene, GRID_COLOR, GRID_STEP_X, GRID_STEP_Y};
pub use surface::Surface;

use tracing::trace;

use crate::core::Session;
use crate::time::Millis;

/// Straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// 0.0 ..= 1.0
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Minimal 2D drawing surface.
pub trait Canvas {
    fn clear(&mut self, width: f32, height: f32);
    fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba);
    fn circle_filled(&mut self, center: (f32, f32), radius: f32, color: Rgba);
}

/// Target cadence of the render loop.
pub const TARGET_FPS: f64 = 60.0;

/// Frame gate plus tick-and-paint.
///
/// The gate compares frame timestamps rather than counting frames, so it
/// adapts to whatever rate the host actually calls back at.
#[derive(Debug)]
pub struct RenderLoop {
    min_interval_ms: f64,
    last_frame: Option<f64>,
    running: bool,
    fps: FpsCounter,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new(TARGET_FPS)
    }
}

impl RenderLoop {
    pub fn new(target_fps: f64) -> Self {
        Self {
            min_interval_ms: 1_000.0 / target_fps.max(1.0),
            last_frame: None,
            running: true,
            fps: FpsCounter::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Cancel all further frames.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Would a frame at `timestamp_ms` pass the gate?
    pub fn should_render(&self, timestamp_ms: f64) -> bool {
        self.running
            && self
                .last_frame
                .map_or(true, |last| timestamp_ms - last >= self.min_interval_ms)
    }

    /// Run one frame if the gate allows it: age particles at wall-clock
    /// `now`, then paint into `canvas`. Returns whether the frame ran.
    pub fn frame<C: Canvas>(
        &mut self,
        timestamp_ms: f64,
        now: Millis,
        session: &mut Session,
        canvas: &mut C,
    ) -> bool {
        if !self.should_render(timestamp_ms) {
            return false;
        }
        self.last_frame = Some(timestamp_ms);
        self.fps.tick(timestamp_ms);

        session.tick(now);
        let particles = session.particles();
        let drawn = paint_scene(canvas, particles.bounds(), particles.particles());
        trace!(drawn, live = particles.len(), "frame painted");
        true
    }

    /// Paint without passing the gate, for hosts that redraw the whole
    /// window on every callback. Particles are still aged at `now` first, so
    /// nothing past its lifetime is drawn.
    pub fn repaint<C: Canvas>(&self, now: Millis, session: &mut Session, canvas: &mut C) -> usize {
        session.tick(now);
        let particles = session.particles();
        paint_scene(canvas, particles.bounds(), particles.particles())
    }

    pub fn fps(&self) -> f64 {
        self.fps.fps()
    }
}

/// Frames per second over the last 60 accepted frames.
#[derive(Debug)]
pub struct FpsCounter {
    frames: Vec<f64>,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            frames: Vec::with_capacity(60),
        }
    }

    pub fn tick(&mut self, timestamp_ms: f64) {
        self.frames.push(timestamp_ms);
        if self.frames.len() > 60 {
            self.frames.remove(0);
        }
    }

    pub fn fps(&self) -> f64 {
        let (Some(first), Some(last)) = (self.frames.first(), self.frames.last()) else {
            return 0.0;
        };
        let elapsed = last - first;
        if self.frames.len() < 2 || elapsed <= 0.0 {
            return 0.0;
        }
        (self.frames.len() as f64 - 1.0) / (elapsed / 1000.0)
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::{
        Bounds, ParticleStore, SessionConfig, TransactionEvent, TxKind, PARTICLE_LIFETIME_MS,
    };

    const T0: Millis = 10_000;

    /// Canvas that records draw calls.
    #[derive(Default)]
    pub(crate) struct Recording {
        pub clears: usize,
        pub lines: Vec<((f32, f32), (f32, f32), Rgba)>,
        pub circles: Vec<((f32, f32), f32, Rgba)>,
    }

    impl Canvas for Recording {
        fn clear(&mut self, _width: f32, _height: f32) {
            self.clears += 1;
        }
        fn line(&mut self, from: (f32, f32), to: (f32, f32), _width: f32, color: Rgba) {
            self.lines.push((from, to, color));
        }
        fn circle_filled(&mut self, center: (f32, f32), radius: f32, color: Rgba) {
            self.circles.push((center, radius, color));
        }
    }

    /// Session holding one particle created at `T0`.
    fn session_with_particle() -> Session {
        let mut s = Session::with_particles(SessionConfig::default(), ParticleStore::with_seed(2));
        s.set_bounds(Bounds::new(400.0, 200.0));
        let ev = TransactionEvent::synthetic(TxKind::Burn, 1.0, T0);
        assert_eq!(s.accept(ev, T0), 0);
        assert_eq!(s.pump(T0), 1);
        s
    }

    #[test]
    fn gate_uses_timestamps_not_frame_counts() {
        let mut rl = RenderLoop::new(60.0);
        let mut s = session_with_particle();
        let mut canvas = Recording::default();

        assert!(rl.frame(1_000.0, T0 + 100, &mut s, &mut canvas));
        // host calling back at 240Hz: most callbacks are skipped
        assert!(!rl.frame(1_004.0, T0 + 104, &mut s, &mut canvas));
        assert!(!rl.frame(1_008.0, T0 + 108, &mut s, &mut canvas));
        assert!(!rl.frame(1_012.0, T0 + 112, &mut s, &mut canvas));
        assert!(rl.frame(1_017.0, T0 + 117, &mut s, &mut canvas));
        assert_eq!(canvas.clears, 2);
    }

    #[test]
    fn stop_cancels_frames() {
        let mut rl = RenderLoop::default();
        let mut s = session_with_particle();
        let mut canvas = Recording::default();
        rl.stop();
        assert!(!rl.is_running());
        assert!(!rl.frame(0.0, T0, &mut s, &mut canvas));
        assert_eq!(canvas.clears, 0);
    }

    #[test]
    fn frame_ticks_and_culls_before_painting() {
        let mut rl = RenderLoop::default();
        let mut s = session_with_particle();
        let mut canvas = Recording::default();

        rl.frame(0.0, T0 + 500, &mut s, &mut canvas);
        assert_eq!(s.particles().len(), 1);
        assert!(!canvas.circles.is_empty());

        let mut canvas = Recording::default();
        rl.frame(100.0, T0 + PARTICLE_LIFETIME_MS, &mut s, &mut canvas);
        assert!(s.particles().is_empty());
        assert!(canvas.circles.is_empty(), "expired particle must not be painted");
    }

    #[test]
    fn gated_repaint_never_draws_expired_particles() {
        let mut rl = RenderLoop::default();
        let mut s = session_with_particle();
        let mut canvas = Recording::default();

        // nearly expired but still faintly visible
        assert!(rl.frame(0.0, T0 + PARTICLE_LIFETIME_MS - 10, &mut s, &mut canvas));
        assert_eq!(s.particles().len(), 1);

        // next callback arrives inside the frame interval, after expiry
        let mut canvas = Recording::default();
        assert!(!rl.frame(8.0, T0 + PARTICLE_LIFETIME_MS + 2, &mut s, &mut canvas));
        assert_eq!(rl.repaint(T0 + PARTICLE_LIFETIME_MS + 2, &mut s, &mut canvas), 0);
        assert!(s.particles().is_empty());
        assert!(canvas.circles.is_empty());
        assert_eq!(canvas.clears, 1);
    }

    #[test]
    fn fps_counter_measures_accepted_frames() {
        let mut fps = FpsCounter::new();
        assert_eq!(fps.fps(), 0.0);
        for i in 0..=60 {
            fps.tick(i as f64 * 20.0);
        }
        assert!((fps.fps() - 50.0).abs() < 1e-9);
    }
}
