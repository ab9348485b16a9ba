use eframe::egui::{self, Pos2, RichText, Ui};
use egui_plot::{Legend, MarkerShape, Plot, PlotPoint, PlotPoints, Points};

use crate::color::{highlight_color, marker_color};
use crate::data::filter::{MarkerClass, VisibleMarker};
use crate::data::model::Category;
use crate::state::AppState;

/// Clicks farther than this (in screen pixels) from every marker select nothing.
const PICK_RADIUS: f32 = 10.0;

const MARKER_RADIUS: f32 = 4.5;

fn series_name(category: Category, class: MarkerClass) -> String {
    match class {
        MarkerClass::Fail => format!("{category} (failed inspection)"),
        _ => category.to_string(),
    }
}

fn plot_xy(m: &VisibleMarker) -> [f64; 2] {
    [m.position.longitude, m.position.latitude]
}

/// Index of the marker closest to `pointer`, if one lies within `max_distance`.
pub fn nearest_marker<F>(
    candidates: impl IntoIterator<Item = (usize, [f64; 2])>,
    pointer: Pos2,
    max_distance: f32,
    to_screen: F,
) -> Option<usize>
where
    F: Fn([f64; 2]) -> Pos2,
{
    candidates
        .into_iter()
        .map(|(i, xy)| (i, to_screen(xy).distance(pointer)))
        .filter(|&(_, d)| d <= max_distance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

// ---------------------------------------------------------------------------
// Marker map (central panel)
// ---------------------------------------------------------------------------

/// Render the marker map in the central panel.
pub fn marker_map(ui: &mut Ui, state: &mut AppState) {
    if state.is_loading() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.spinner();
        });
        return;
    }
    if state.store.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dataset to view markers  (File → Open…)");
        });
        return;
    }

    let mut plot = Plot::new("marker_map")
        .legend(Legend::default())
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .data_aspect(1.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    if state.fit_pending {
        plot = plot.reset();
        state.fit_pending = false;
    }

    let layers = state.layers;
    let markers = &state.view.visible_markers;
    let selected = state.selected_marker;

    let response = plot.show(ui, |plot_ui| {
        for category in Category::ALL {
            if !layers.shows(category) {
                continue;
            }
            for class in [
                MarkerClass::ScalePass,
                MarkerClass::WeighbridgePass,
                MarkerClass::Fail,
            ] {
                let points: Vec<[f64; 2]> = markers
                    .iter()
                    .filter(|m| m.category == category && m.marker == class)
                    .map(plot_xy)
                    .collect();
                if points.is_empty() {
                    continue;
                }
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(series_name(category, class))
                        .color(marker_color(class))
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(MARKER_RADIUS),
                );
            }
        }

        if let Some(m) = selected.and_then(|i| markers.get(i)) {
            plot_ui.points(
                Points::new(PlotPoints::from(vec![plot_xy(m)]))
                    .color(highlight_color(m.marker))
                    .shape(MarkerShape::Circle)
                    .filled(false)
                    .radius(MARKER_RADIUS * 2.0),
            );
        }

        if !plot_ui.response().clicked() {
            return None;
        }
        let pointer = plot_ui.pointer_coordinate()?;
        let pointer = plot_ui.screen_from_plot(pointer);
        let candidates = markers
            .iter()
            .enumerate()
            .filter(|(_, m)| layers.shows(m.category))
            .map(|(i, m)| (i, plot_xy(m)));
        Some(nearest_marker(candidates, pointer, PICK_RADIUS, |[x, y]| {
            plot_ui.screen_from_plot(PlotPoint::new(x, y))
        }))
    });

    if let Some(pick) = response.inner {
        state.selected_marker = pick;
    }
}

// ---------------------------------------------------------------------------
// Description panel
// ---------------------------------------------------------------------------

/// Window describing the selected marker's record.
pub fn description_window(ctx: &egui::Context, state: &mut AppState) {
    let Some(marker) = state.selected_marker else {
        return;
    };
    let Some(record) = state.marker_record(marker) else {
        state.selected_marker = None;
        return;
    };

    let placeholder = state.placeholder.as_str();
    let title = record.category().title();
    let headline = record.headline_or(placeholder).to_string();
    let rows = record.describe(placeholder);
    let region = record.region.clone();

    let mut open = true;
    egui::Window::new(title)
        .id(egui::Id::new("record_description"))
        .open(&mut open)
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui: &mut Ui| {
            ui.label(RichText::new(headline).strong().size(16.0));
            ui.label(region);
            ui.separator();
            egui::Grid::new("record_fields")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui: &mut Ui| {
                    for (label, value) in &rows {
                        ui.label(*label);
                        ui.label(value.as_str());
                        ui.end_row();
                    }
                });
        });

    if !open {
        state.selected_marker = None;
    }
}
