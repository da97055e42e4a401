//! Grid background and particle glyphs

use super::{Canvas, Rgba};
use crate::core::particles::{Bounds, Particle, GLOW_RADIUS, PARTICLE_RADIUS};
use crate::core::TxKind;

/// Spacing of the vertical grid lines
pub const GRID_STEP_X: f32 = 80.0;
/// Spacing of the horizontal grid lines
pub const GRID_STEP_Y: f32 = 40.0;
/// White at 5% alpha
pub const GRID_COLOR: Rgba = Rgba {
    r: 255,
    g: 255,
    b: 255,
    a: 0.05,
};

const HIGHLIGHT_RADIUS: f32 = 1.8;
const HIGHLIGHT_OFFSET: f32 = -1.8;
/// Below this opacity the specular highlight is skipped
const HIGHLIGHT_MIN_OPACITY: f32 = 0.3;

pub fn kind_color(kind: TxKind) -> Rgba {
    let (r, g, b) = kind.color_rgb();
    Rgba::rgb(r, g, b)
}

/// Clear, draw the grid, then every visible particle. Returns the number of
/// particles drawn.
pub fn paint_scene<C: Canvas>(canvas: &mut C, bounds: Bounds, particles: &[Particle]) -> usize {
    canvas.clear(bounds.width, bounds.height);
    paint_grid(canvas, bounds);

    let mut drawn = 0;
    for p in particles {
        if p.opacity <= 0.0 || !bounds.contains(p.x, p.y) {
            continue;
        }
        paint_particle(canvas, p);
        drawn += 1;
    }
    drawn
}

fn paint_grid<C: Canvas>(canvas: &mut C, bounds: Bounds) {
    if !(bounds.width > 0.0 && bounds.height > 0.0) {
        return;
    }
    let mut y = 0.0;
    while y < bounds.height {
        canvas.line((0.0, y), (bounds.width, y), 1.0, GRID_COLOR);
        y += GRID_STEP_Y;
    }
    let mut x = 0.0;
    while x < bounds.width {
        canvas.line((x, 0.0), (x, bounds.height), 1.0, GRID_COLOR);
        x += GRID_STEP_X;
    }
}

fn paint_particle<C: Canvas>(canvas: &mut C, p: &Particle) {
    let color = kind_color(p.kind);
    let center = (p.x, p.y);

    if p.glow_intensity > 0.0 {
        let glow = p.glow_intensity;
        let halo = color.with_alpha(p.opacity * glow * glow * 80.0 / 255.0);
        canvas.circle_filled(center, PARTICLE_RADIUS + GLOW_RADIUS * glow, halo);
    }

    canvas.circle_filled(center, PARTICLE_RADIUS, color.with_alpha(p.opacity));

    if p.opacity > HIGHLIGHT_MIN_OPACITY {
        canvas.circle_filled(
            (p.x + HIGHLIGHT_OFFSET, p.y + HIGHLIGHT_OFFSET),
            HIGHLIGHT_RADIUS,
            Rgba::rgb(255, 255, 255).with_alpha(0.3 * p.opacity),
        );
    }
}
