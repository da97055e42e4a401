//! Header bar with title and connectivity

use eframe::egui;

use super::TxPulseApp;
use crate::runtime::Feed;
use crate::theme::colors;
use crate::ws_state::{StreamStatus, WsState};

fn status_color(state: &WsState) -> egui::Color32 {
    match state {
        WsState::Connected => colors::OK,
        WsState::Connecting => colors::WARN,
        WsState::Disconnected | WsState::Error(_) => colors::BAD,
    }
}

fn stream_indicator(ui: &mut egui::Ui, name: &str, status: &StreamStatus) {
    let state = status.state();
    let (rect, _) = ui.allocate_exact_size(egui::vec2(8.0, 8.0), egui::Sense::hover());
    ui.painter().circle_filled(rect.center(), 4.0, status_color(&state));
    let response = ui.label(
        egui::RichText::new(format!("{name}: {}", state.label()))
            .color(colors::TEXT_SECONDARY)
            .size(11.0),
    );
    if let Some(err) = status.last_error() {
        response.on_hover_text(err);
    }
}

impl TxPulseApp {
    pub(crate) fn render_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new("Live Transactions")
                    .color(colors::TEXT_PRIMARY)
                    .size(16.0)
                    .strong(),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                match self.view.feed {
                    Feed::Simulated => {
                        ui.colored_label(
                            colors::WARN,
                            egui::RichText::new("Simulated").size(11.0),
                        );
                    }
                    Feed::Live => {
                        stream_indicator(ui, "network", &self.view.stats);
                        ui.add_space(10.0);
                        stream_indicator(ui, "transactions", &self.view.transactions);
                    }
                }
            });
        });

        // surface the most recent transport error under the title
        let last_error = self
            .view
            .transactions
            .last_error()
            .or_else(|| self.view.stats.last_error());
        if let Some(err) = last_error {
            ui.label(egui::RichText::new(err).color(colors::BAD).size(10.0));
        }
    }
}
