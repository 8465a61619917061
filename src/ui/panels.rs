use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use rusty_ramp::{Cell, Phase};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – live values
// ---------------------------------------------------------------------------

/// Render the latest emitted value of every column.
pub fn side_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("Values");
    ui.separator();

    if state.columns.is_empty() {
        ui.label("No dataset loaded.");
        return;
    }

    let latest = state.latest();
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("values_grid")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui: &mut Ui| {
                    for col in &state.columns {
                        let color = state.color_map.color_for(col);
                        ui.label(RichText::new(col).strong().color(color));
                        let text = match latest.and_then(|r| r.get(col)) {
                            Some(Cell::Numeric(v)) => format!("{v:.4}"),
                            Some(Cell::Text(s)) => format!("\"{s}\""),
                            None => "–".to_string(),
                        };
                        ui.monospace(text);
                        ui.end_row();
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu and transport controls.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let phase = state.phase();
        let has_data = !state.player.dataset().is_empty();
        if ui
            .add_enabled(has_data, egui::Button::new("▶ Start"))
            .clicked()
        {
            state.start();
        }
        let running = matches!(phase, Phase::Holding | Phase::Ramping);
        if ui.add_enabled(running, egui::Button::new("■ Stop")).clicked() {
            state.stop();
        }

        ui.separator();

        ui.label("Ramp");
        let ramp = ui.add(
            egui::DragValue::new(&mut state.ramp_ms)
                .range(1..=600_000)
                .speed(10.0)
                .suffix(" ms"),
        );
        if ramp.changed() {
            state.apply_ramp();
        }

        ui.separator();

        if let Some(path) = &state.source {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!(
                "{name}: {} rows, {phase:?}, {} ticks",
                state.player.dataset().len(),
                state.ticks_received
            ));
        }
        if state.finished {
            ui.label(RichText::new("end of data").italics());
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open time-series")
        .add_filter("Supported files", &["csv", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match rusty_ramp::data::loader::load_file(&path) {
            Ok(dataset) => state.set_dataset(dataset, &path),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
