//! Transaction log table and kind legend

use eframe::egui;

use super::TxPulseApp;
use crate::core::format::{format_value, short_address, short_hash, time_ago};
use crate::core::TxKind;
use crate::runtime::Feed;
use crate::theme::{colors, kind_color32};
use crate::time::Clock;

fn swatch(ui: &mut egui::Ui, kind: TxKind) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
    ui.painter().circle_filled(rect.center(), 5.0, kind_color32(kind));
}

/// Kinds the current feed can deliver.
fn legend_kinds(feed: Feed) -> &'static [TxKind] {
    match feed {
        Feed::Live => TxKind::ALL,
        Feed::Simulated => TxKind::SIMULATED,
    }
}

impl TxPulseApp {
    pub(crate) fn render_legend(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for &kind in legend_kinds(self.view.feed) {
                swatch(ui, kind);
                ui.label(
                    egui::RichText::new(kind.label())
                        .color(colors::TEXT_SECONDARY)
                        .size(11.0),
                );
                ui.add_space(8.0);
            }
        });
    }

    pub(crate) fn render_log(&self, ui: &mut egui::Ui) {
        let now = self.clock.now_ms();
        let rows = self.view.session.lock().log().snapshot();

        ui.label(
            egui::RichText::new("Recent transactions")
                .color(colors::TEXT_MUTED)
                .size(11.0),
        );
        if rows.is_empty() {
            ui.label(
                egui::RichText::new("Waiting for transactions...")
                    .color(colors::TEXT_MUTED)
                    .italics(),
            );
            return;
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("tx_log")
                .num_columns(5)
                .striped(true)
                .spacing([16.0, 4.0])
                .show(ui, |ui| {
                    for ev in &rows {
                        ui.horizontal(|ui| {
                            swatch(ui, ev.kind);
                            ui.label(egui::RichText::new(ev.kind.label()).size(11.0));
                        });
                        ui.label(
                            egui::RichText::new(short_hash(&ev.hash))
                                .monospace()
                                .size(11.0),
                        )
                        .on_hover_text(ev.hash.as_str());
                        ui.label(
                            egui::RichText::new(format!(
                                "{} -> {}",
                                short_address(&ev.from),
                                short_address(&ev.to)
                            ))
                            .monospace()
                            .color(colors::TEXT_SECONDARY)
                            .size(11.0),
                        );
                        ui.label(
                            egui::RichText::new(format_value(ev.value))
                                .monospace()
                                .size(11.0),
                        );
                        ui.label(
                            egui::RichText::new(time_ago(ev.observed_at, now))
                                .color(colors::TEXT_MUTED)
                                .size(11.0),
                        );
                        ui.end_row();
                    }
                });
        });
    }
}
