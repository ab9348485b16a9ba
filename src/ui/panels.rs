use eframe::egui::{self, Align2, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::CategorySelection;
use crate::data::model::Category;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.is_loading() {
        ui.horizontal(|ui: &mut Ui| {
            ui.spinner();
            ui.label("Loading datasets…");
        });
        return;
    }

    let regions = match &state.store {
        Some(store) => store.regions().clone(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // ---- Category selector ----
    ui.strong("Category");
    let current = state.pending.category;
    egui::ComboBox::from_id_salt("category")
        .selected_text(current.label())
        .show_ui(ui, |ui: &mut Ui| {
            for option in CategorySelection::ALL {
                if ui.selectable_label(current == option, option.label()).clicked() {
                    state.set_category(option);
                }
            }
        });
    ui.separator();

    // ---- Region multi-select ----
    let n_selected = state.pending.regions.len();
    ui.strong(format!("Regions  ({n_selected}/{})", regions.len()));
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all_regions();
        }
        if ui.small_button("None").clicked() {
            state.clear_regions();
        }
    });
    if n_selected == 0 {
        ui.label(RichText::new("None selected: default regions apply").weak());
    }

    ScrollArea::vertical()
        .max_height((ui.available_height() - 90.0).max(80.0))
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            for region in &regions {
                let mut checked = state.pending.regions.contains(region);
                if ui.checkbox(&mut checked, region.as_str()).changed() {
                    state.toggle_region(region);
                }
            }
        });

    ui.separator();
    let dirty = state.pending != state.applied;
    let apply = egui::Button::new(if dirty { "Apply filter *" } else { "Apply filter" });
    if ui.add(apply).clicked() {
        state.apply_filter();
    }

    // ---- Layer toggles ----
    ui.separator();
    ui.strong("Layers");
    ui.checkbox(&mut state.layers.scales, Category::Scale.to_string());
    ui.checkbox(&mut state.layers.weighbridges, Category::Weighbridge.to_string());
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            for category in Category::ALL {
                if ui.button(format!("Open {category}…")).clicked() {
                    open_file_dialog(state, category);
                    ui.close_menu();
                }
            }
        });

        ui.separator();

        if let Some(store) = &state.store {
            ui.label(format!(
                "{} records loaded, {} shown",
                store.len(),
                state.view.counts.total()
            ));
            if state.view.skipped_without_position > 0 {
                ui.label(
                    RichText::new(format!(
                        "{} without coordinates",
                        state.view.skipped_without_position
                    ))
                    .color(Color32::YELLOW),
                );
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Count display
// ---------------------------------------------------------------------------

/// Two-line count summary anchored to the bottom-right corner.
pub fn count_overlay(ctx: &egui::Context, state: &AppState) {
    if state.store.is_none() {
        return;
    }
    egui::Area::new(egui::Id::new("count_overlay"))
        .anchor(Align2::RIGHT_BOTTOM, [-12.0, -12.0])
        .show(ctx, |ui: &mut Ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui: &mut Ui| {
                for line in state.view.counts.summary_lines() {
                    ui.label(RichText::new(line).strong());
                }
            });
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState, category: Category) {
    let file = rfd::FileDialog::new()
        .set_title(format!("Open {category} data"))
        .add_filter("Supported files", &["json", "csv"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_records(&path, category) {
            Ok(records) => {
                state.status_message = None;
                state.replace_records(category, records);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
