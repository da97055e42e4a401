//! Live particle canvas

use eframe::egui;

use super::TxPulseApp;
use crate::core::Bounds;
use crate::render::{Canvas, Rgba};
use crate::theme::{colors, to_color32};
use crate::time::{now_seconds, Clock};

const CANVAS_HEIGHT: f32 = 300.0;

/// [`Canvas`] on top of an egui painter, in coordinates relative to `origin`.
struct PainterCanvas<'a> {
    painter: &'a egui::Painter,
    origin: egui::Pos2,
}

impl PainterCanvas<'_> {
    fn at(&self, (x, y): (f32, f32)) -> egui::Pos2 {
        self.origin + egui::vec2(x, y)
    }
}

impl Canvas for PainterCanvas<'_> {
    fn clear(&mut self, width: f32, height: f32) {
        let rect = egui::Rect::from_min_size(self.origin, egui::vec2(width, height));
        self.painter.rect_filled(rect, 0.0, colors::CANVAS_BG);
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba) {
        self.painter.line_segment(
            [self.at(from), self.at(to)],
            egui::Stroke::new(width, to_color32(color)),
        );
    }

    fn circle_filled(&mut self, center: (f32, f32), radius: f32, color: Rgba) {
        self.painter.circle_filled(self.at(center), radius, to_color32(color));
    }
}

impl TxPulseApp {
    pub(crate) fn render_canvas(&mut self, ui: &mut egui::Ui) {
        let size = egui::vec2(ui.available_width(), CANVAS_HEIGHT);
        let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
        let rect = response.rect;

        let mut session = self.view.session.lock();

        if Bounds::new(rect.width(), rect.height()) != self.surface.logical() {
            let bounds = self
                .surface
                .resize(rect.width(), rect.height(), ui.ctx().pixels_per_point());
            session.set_bounds(bounds);
        }

        let mut canvas = PainterCanvas {
            painter: &painter,
            origin: rect.min,
        };
        let now = self.clock.now_ms();
        let ran = self.render_loop.frame(now_seconds() * 1000.0, now, &mut session, &mut canvas);
        if !ran {
            // egui repaints the whole window every frame
            self.render_loop.repaint(now, &mut session, &mut canvas);
        }
        drop(session);

        painter.rect_stroke(
            rect,
            6.0,
            egui::Stroke::new(1.0, colors::BORDER),
            egui::StrokeKind::Inside,
        );
        painter.text(
            rect.right_top() + egui::vec2(-8.0, 8.0),
            egui::Align2::RIGHT_TOP,
            format!("{:.0} fps", self.render_loop.fps()),
            egui::FontId::monospace(11.0),
            colors::TEXT_MUTED,
        );
    }
}
