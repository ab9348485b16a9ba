use std::time::Duration;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{map, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct WeighMapApp {
    pub state: AppState,
}

impl WeighMapApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for WeighMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Keep repainting until both datasets have arrived.
        if self.state.is_loading() && !self.state.poll_loading() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: markers ----
        egui::CentralPanel::default().show(ctx, |ui| {
            map::marker_map(ui, &mut self.state);
        });

        panels::count_overlay(ctx, &self.state);
        map::description_window(ctx, &mut self.state);
    }
}
