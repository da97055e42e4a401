//! Stat cards

use eframe::egui;

use super::TxPulseApp;
use crate::core::counter::AnimatedCounter;
use crate::core::format::format_count;
use crate::theme::colors;
use crate::time::now_seconds;

fn card(ui: &mut egui::Ui, width: f32, title: &str, value: String) {
    egui::Frame::new()
        .fill(colors::BG_ELEVATED)
        .stroke(egui::Stroke::new(1.0, colors::BORDER))
        .corner_radius(6.0)
        .inner_margin(10.0)
        .show(ui, |ui| {
            ui.set_width(width);
            ui.label(egui::RichText::new(title).color(colors::TEXT_MUTED).size(11.0));
            ui.label(
                egui::RichText::new(value)
                    .color(colors::TEXT_PRIMARY)
                    .monospace()
                    .size(20.0),
            );
        });
}

fn animate(counter: &mut AnimatedCounter, target: f64, now: f64) -> f64 {
    counter.set(target, now);
    counter.value_at(now)
}

impl TxPulseApp {
    pub(crate) fn render_stats(&mut self, ui: &mut egui::Ui) {
        let stats = self.view.session.lock().stats();
        let now = now_seconds();

        let recent = animate(&mut self.counters.recent, stats.recent_activity_count as f64, now);
        let block = animate(&mut self.counters.block, stats.block_height as f64, now);
        let validators = animate(
            &mut self.counters.validators,
            stats.active_validator_count as f64,
            now,
        );
        let total = animate(&mut self.counters.total, stats.total_transactions as f64, now);

        // five cards with 8px gaps and 20px frame padding each
        let width = ((ui.available_width() - 4.0 * 8.0) / 5.0 - 20.0).max(60.0);
        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 8.0;
            card(ui, width, "Recent activity", format_count(recent));
            card(ui, width, "TPS", format!("{:.1}", stats.tps));
            card(ui, width, "Block height", format!("{block:.0}"));
            card(ui, width, "Validators", format_count(validators));
            card(ui, width, "Total transactions", format_count(total));
        });
    }
}
