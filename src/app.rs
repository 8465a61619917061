use std::time::Duration;

use eframe::egui;
use rusty_ramp::PlayerConfig;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyRampApp {
    pub state: AppState,
    repaint_every: Duration,
}

impl RustyRampApp {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            state: AppState::new(config),
            repaint_every: config.tick_period(),
        }
    }
}

impl eframe::App for RustyRampApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Read before draining: a run queues its last frame before it
        // reports stopped.
        let running = self.state.player.is_running();
        let drained = self.state.drain_frames();

        // ---- Top panel: menu bar and transport ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: live values ----
        egui::SidePanel::left("values_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::history_plot(ui, &self.state);
        });

        if running || drained {
            ctx.request_repaint_after(self.repaint_every);
        }
    }
}
