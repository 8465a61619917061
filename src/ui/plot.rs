use eframe::egui::Ui;
use egui_plot::{Line, Plot, PlotPoints};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// History plot (central panel)
// ---------------------------------------------------------------------------

/// Plot every numeric column of the recent records against tick number.
/// Text columns have no y value and are skipped.
pub fn history_plot(ui: &mut Ui, state: &AppState) {
    if state.columns.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to play it back  (File → Open…)");
        });
        return;
    }

    Plot::new("history_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label("Tick")
        .y_axis_label("Value")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for col in &state.columns {
                let points: PlotPoints = state
                    .history
                    .iter()
                    .filter_map(|(tick, record)| {
                        let v = record.get(col)?.as_f64()?;
                        Some([*tick as f64, v])
                    })
                    .collect();

                let line = Line::new(points)
                    .name(col)
                    .color(state.color_map.color_for(col))
                    .width(1.5);

                plot_ui.line(line);
            }
        });
}
