//! Desktop dashboard
//!
//! The window reads the session owned by the async pipeline; the only state
//! it writes is the canvas bounds (on resize) and particle aging (per frame).

mod canvas;
mod header;
mod log;
mod stats;

use eframe::egui;
use tracing::info;

use crate::core::counter::AnimatedCounter;
use crate::render::{RenderLoop, Surface};
use crate::runtime::RuntimeView;
use crate::theme::{colors, dashboard_visuals};
use crate::time::{Clock, SystemClock};

/// Open the dashboard window and block until it is closed.
pub fn run(view: RuntimeView) -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("tx-pulse")
            .with_inner_size([1100.0, 780.0]),
        ..Default::default()
    };
    eframe::run_native(
        "tx-pulse",
        options,
        Box::new(move |cc| Ok(Box::new(TxPulseApp::new(cc, view)))),
    )
}

/// Display-side smoothing for the stat cards.
pub(crate) struct StatCounters {
    pub recent: AnimatedCounter,
    pub block: AnimatedCounter,
    pub validators: AnimatedCounter,
    pub total: AnimatedCounter,
}

impl Default for StatCounters {
    fn default() -> Self {
        Self {
            recent: AnimatedCounter::new(0.0),
            block: AnimatedCounter::new(0.0),
            validators: AnimatedCounter::new(0.0),
            total: AnimatedCounter::new(0.0),
        }
    }
}

pub struct TxPulseApp {
    pub(crate) view: RuntimeView,
    pub(crate) clock: SystemClock,
    pub(crate) render_loop: RenderLoop,
    pub(crate) surface: Surface,
    pub(crate) counters: StatCounters,
    /// Window focus on the previous frame
    was_focused: bool,
}

impl TxPulseApp {
    pub fn new(cc: &eframe::CreationContext<'_>, view: RuntimeView) -> Self {
        cc.egui_ctx.set_visuals(dashboard_visuals());
        info!(feed = ?view.feed, "dashboard opened");

        Self {
            view,
            clock: SystemClock,
            render_loop: RenderLoop::default(),
            surface: Surface::default(),
            counters: StatCounters::default(),
            was_focused: true,
        }
    }

    /// Cull right away when the window comes back, so particles that expired
    /// while hidden never flash for a frame.
    fn handle_focus(&mut self, ctx: &egui::Context) {
        let focused = ctx.input(|i| i.focused);
        if focused && !self.was_focused {
            let removed = self.view.session.lock().cull(self.clock.now_ms());
            info!(removed, "window focused, culled expired particles");
        }
        self.was_focused = focused;
    }
}

impl eframe::App for TxPulseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.render_loop.is_running() {
            return;
        }
        ctx.request_repaint();
        self.handle_focus(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(colors::BG_PRIMARY).inner_margin(12.0))
            .show(ctx, |ui| {
                self.render_header(ui);
                ui.add_space(10.0);
                self.render_stats(ui);
                ui.add_space(10.0);
                self.render_canvas(ui);
                ui.add_space(6.0);
                self.render_legend(ui);
                ui.add_space(10.0);
                self.render_log(ui);
            });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.render_loop.stop();
        info!("dashboard closed");
    }
}
