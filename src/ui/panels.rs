use eframe::egui::{self, Color32, DragValue, Grid, RichText, Ui};

use crate::data::loader;
use crate::state::{AppState, EditAction};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(session) = &state.session {
            ui.label(format!(
                "{} samples, {} peaks",
                session.trace().len(),
                session.view().len()
            ));
            if !session.is_editing() {
                ui.label(RichText::new("finished").color(Color32::DARK_GREEN));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – parameters, statistics, finish/export
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Detection");
    ui.separator();

    Grid::new("params_grid").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("Smoothing window");
        ui.add(
            DragValue::new(&mut state.params.window_size)
                .speed(2)
                .range(3..=501),
        );
        ui.end_row();

        ui.label("Polynomial order");
        ui.add(DragValue::new(&mut state.params.poly_order).range(0..=10));
        ui.end_row();

        ui.label("Extrema width");
        ui.add(DragValue::new(&mut state.params.order).range(1..=1000));
        ui.end_row();

        ui.label("Preamble rows");
        ui.add(DragValue::new(&mut state.params.skip_rows).range(0..=1000));
        ui.end_row();
    });

    let can_detect = state.raw_samples.is_some();
    if ui
        .add_enabled(can_detect, egui::Button::new("Detect peaks"))
        .on_hover_text("Re-runs smoothing and detection; discards manual edits")
        .clicked()
    {
        if let Err(e) = state.redetect() {
            log::error!("Detection failed: {e}");
            state.status_message = Some(format!("Error: {e}"));
        }
    }

    ui.add_space(8.0);
    ui.heading("Statistics");
    ui.separator();
    statistics_block(ui, state);

    ui.add_space(8.0);
    ui.heading("Session");
    ui.separator();

    let editing = state
        .session
        .as_ref()
        .map(|s| s.is_editing())
        .unwrap_or(false);
    if ui
        .add_enabled(editing, egui::Button::new("Finish curation"))
        .clicked()
    {
        state.apply_edit(EditAction::Finish);
    }

    let finished = state
        .session
        .as_ref()
        .map(|s| !s.is_editing())
        .unwrap_or(false);
    if ui
        .add_enabled(finished, egui::Button::new("Export peaks CSV…"))
        .clicked()
    {
        export_peaks(state);
    }
    if ui
        .add_enabled(finished, egui::Button::new("Export report JSON…"))
        .clicked()
    {
        export_report(state);
    }
}

fn statistics_block(ui: &mut Ui, state: &AppState) {
    let Some(session) = &state.session else {
        ui.label("No trace loaded.");
        return;
    };

    ui.label(format!("Peaks: {}", session.view().len()));
    match session.summary() {
        Some(summary) => {
            Grid::new("stats_grid").num_columns(2).show(ui, |ui: &mut Ui| {
                ui.label("Max force");
                ui.label(format!("{:.2} N", summary.max));
                ui.end_row();
                ui.label("Avg force");
                ui.label(format!("{:.2} N", summary.mean));
                ui.end_row();
                ui.label("Std dev");
                ui.label(format!("{:.2} N", summary.std_dev));
                ui.end_row();
                ui.label("Min force");
                ui.label(format!("{:.2} N", summary.min));
                ui.end_row();
                ui.label("Trend");
                ui.label(format!("{:.3} N/cycle", summary.trend.slope));
                ui.end_row();
                ui.label("R²");
                ui.label(format!("{:.4}", summary.trend.r_squared));
                ui.end_row();
            });
        }
        None => {
            ui.label("Not enough maximum points for analysis.");
        }
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open instrument CSV")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.load_trace(path) {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn export_peaks(state: &mut AppState) {
    let Some(session) = &state.session else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export curated peaks")
        .set_file_name("peaks.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match loader::export_peaks_csv(&path, session.view()) {
            Ok(()) => {
                log::info!("Exported {} peaks to {}", session.view().len(), path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

fn export_report(state: &mut AppState) {
    let Some(session) = &state.session else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export analysis report")
        .set_file_name("report.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        match loader::export_report_json(&path, session.view(), session.summary()) {
            Ok(()) => {
                log::info!("Exported report to {}", path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
