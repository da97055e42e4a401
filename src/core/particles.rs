//! Visualization particle store
//!
//! Each committed transaction becomes one particle at a random position. Its
//! opacity and glow follow a fixed lifetime curve computed from wall-clock
//! age, so a suspended process that resumes with a large time delta culls
//! correctly on the first tick.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use super::event::{TransactionEvent, TxKind};
use crate::time::Millis;

/// Lifetime of a particle; used by both `tick` and `cull`.
pub const PARTICLE_LIFETIME_MS: Millis = 1_500;
/// Core dot radius in logical pixels.
pub const PARTICLE_RADIUS: f32 = 6.0;
/// Maximum extra radius of the glow halo.
pub const GLOW_RADIUS: f32 = 15.0;
/// Keep-out border so dot + glow never clip the canvas edge.
pub const SPAWN_MARGIN: f32 = 25.0;
/// Smallest spawn area on each axis, for tiny or zero-sized canvases.
pub const MIN_SAFE_EXTENT: f32 = 100.0;

/// Logical canvas size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 300.0,
        }
    }
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }

    /// Spawn rectangle as `(x0, y0, w, h)`, never degenerate.
    fn spawn_area(&self) -> (f32, f32, f32, f32) {
        let finite = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        let w = (finite(self.width) - SPAWN_MARGIN * 2.0).max(MIN_SAFE_EXTENT);
        let h = (finite(self.height) - SPAWN_MARGIN * 2.0).max(MIN_SAFE_EXTENT);
        (SPAWN_MARGIN, SPAWN_MARGIN, w, h)
    }
}

/// Opacity and glow for a given age. Both are zero at and past the lifetime.
pub fn lifecycle(age: Millis) -> (f32, f32) {
    let progress = (age as f32 / PARTICLE_LIFETIME_MS as f32).min(1.0);

    if progress <= 0.2 {
        // fade in
        let opacity = progress / 0.2;
        (opacity, opacity * 0.8)
    } else if progress <= 0.6 {
        // sustain with a pulsing glow
        let pulse = ((progress - 0.2) * std::f32::consts::PI * 4.0).sin();
        (1.0, 0.6 + pulse * 0.4)
    } else {
        let fade = (progress - 0.6) / 0.4;
        (1.0 - fade, (1.0 - fade) * 0.8)
    }
}

/// One animated marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: u64,
    pub kind: TxKind,
    pub value: f64,
    pub x: f32,
    pub y: f32,
    pub created_at: Millis,
    pub opacity: f32,
    pub glow_intensity: f32,
}

impl Particle {
    pub fn age(&self, now: Millis) -> Millis {
        now.saturating_sub(self.created_at)
    }

    pub fn is_expired(&self, now: Millis) -> bool {
        self.age(now) >= PARTICLE_LIFETIME_MS
    }
}

/// The set of live particles plus the canvas bounds used for spawning.
pub struct ParticleStore {
    particles: Vec<Particle>,
    bounds: Bounds,
    next_id: u64,
    rng: StdRng,
}

impl Default for ParticleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticleStore {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic positions (tests).
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            particles: Vec::new(),
            bounds: Bounds::default(),
            next_id: 0,
            rng,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// New bounds apply to future spawns; existing particles keep their position.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    /// Create a particle for `event` at a random position within `bounds`.
    pub fn spawn(&mut self, event: &TransactionEvent, bounds: Bounds, now: Millis) -> &Particle {
        let (x0, y0, w, h) = bounds.spawn_area();
        let x = x0 + self.rng.gen::<f32>() * w;
        let y = y0 + self.rng.gen::<f32>() * h;

        let id = self.next_id;
        self.next_id += 1;

        trace!(id, kind = %event.kind, x, y, "particle spawned");
        self.particles.push(Particle {
            id,
            kind: event.kind,
            value: event.value,
            x,
            y,
            created_at: now,
            opacity: 0.0,
            glow_intensity: 0.0,
        });
        &self.particles[self.particles.len() - 1]
    }

    /// Spawn using the store's current bounds.
    pub fn spawn_in_current_bounds(&mut self, event: &TransactionEvent, now: Millis) -> &Particle {
        let bounds = self.bounds;
        self.spawn(event, bounds, now)
    }

    /// Recompute opacity and glow for every particle, then drop expired ones.
    pub fn tick(&mut self, now: Millis) {
        for p in &mut self.particles {
            let (opacity, glow) = lifecycle(p.age(now));
            p.opacity = opacity;
            p.glow_intensity = glow;
        }
        self.cull(now);
    }

    /// Drop expired particles. Returns how many were removed.
    pub fn cull(&mut self, now: Millis) -> usize {
        let before = self.particles.len();
        self.particles.retain(|p| !p.is_expired(now));
        let removed = before - self.particles.len();
        if removed > 0 {
            trace!(removed, remaining = self.particles.len(), "particles culled");
        }
        removed
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
