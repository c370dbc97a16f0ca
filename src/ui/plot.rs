use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::color::generate_palette;
use crate::state::{AppState, CurationSession, EditAction};

// ---------------------------------------------------------------------------
// Central panel: trace plot while editing, analysis chart once finished
// ---------------------------------------------------------------------------

const RAW_COLOR: Color32 = Color32::from_rgb(144, 200, 144);
const FILTERED_COLOR: Color32 = Color32::from_rgb(0, 140, 0);
const DETECTED_COLOR: Color32 = Color32::from_rgb(220, 50, 50);
const MANUAL_COLOR: Color32 = Color32::from_rgb(230, 140, 0);
const TREND_COLOR: Color32 = Color32::from_rgb(60, 100, 220);

pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(session) = &state.session else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open an instrument CSV to begin  (File → Open…)");
        });
        return;
    };

    if session.is_editing() {
        ui.label("Left click: add point  |  Right click: delete nearest point  |  Finish when done");
        let action = trace_plot(ui, session);
        if let Some(action) = action {
            state.apply_edit(action);
        }
    } else {
        analysis_chart(ui, session);
    }
}

/// Force-vs-time plot with numbered peak markers. Returns the edit action
/// the operator requested this frame, if any.
fn trace_plot(ui: &mut Ui, session: &CurationSession) -> Option<EditAction> {
    let trace = session.trace();

    let response = Plot::new("trace_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label("Time (samples)")
        .y_axis_label("Force (N)")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let raw_points: PlotPoints = trace
                .raw
                .iter()
                .enumerate()
                .map(|(i, &f)| [i as f64, f])
                .collect();
            plot_ui.line(Line::new(raw_points).name("Raw force").color(RAW_COLOR));

            let filtered_points: PlotPoints = trace
                .filtered
                .iter()
                .enumerate()
                .map(|(i, &f)| [i as f64, f])
                .collect();
            plot_ui.line(
                Line::new(filtered_points)
                    .name("Filtered force")
                    .color(FILTERED_COLOR)
                    .width(1.5),
            );

            for row in session.view() {
                let (x, y) = (row.peak.time as f64, row.peak.force);
                let color = match row.peak.origin {
                    crate::data::model::PeakOrigin::Detected => DETECTED_COLOR,
                    crate::data::model::PeakOrigin::Manual => MANUAL_COLOR,
                };
                plot_ui.points(Points::new(vec![[x, y]]).radius(5.0).color(color));
                plot_ui.text(Text::new(
                    PlotPoint::new(x, y),
                    RichText::new(row.rank.to_string()).strong(),
                ));
            }

            // Map clicks inside the plot onto edit actions.
            let pointer = plot_ui.pointer_coordinate();
            let resp = plot_ui.response();
            if let Some(pos) = pointer {
                if resp.clicked() {
                    let time = pos.x.round();
                    if time >= 0.0 {
                        return Some(EditAction::Add { time: time as usize });
                    }
                } else if resp.secondary_clicked() {
                    return Some(EditAction::DeleteNearest {
                        time: pos.x,
                        force: pos.y,
                    });
                }
            }
            None
        });

    response.inner
}

/// Final-result view: per-cycle force bars with the OLS trend overlaid.
fn analysis_chart(ui: &mut Ui, session: &CurationSession) {
    let view = session.view();

    if view.len() < 2 {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Not enough maximum points for analysis");
        });
        return;
    }

    let palette = generate_palette(view.len());
    let bars: Vec<Bar> = view
        .iter()
        .zip(palette)
        .map(|(row, color)| {
            Bar::new(row.rank as f64, row.peak.force)
                .width(0.6)
                .fill(color.gamma_multiply(0.7))
        })
        .collect();

    Plot::new("analysis_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label("Maximum point number")
        .y_axis_label("Force (N)")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Peak forces"));

            if let Some(summary) = session.summary() {
                let trend = summary.trend;
                let line: PlotPoints = view
                    .iter()
                    .map(|row| [row.rank as f64, trend.at(row.rank as f64)])
                    .collect();
                plot_ui.line(
                    Line::new(line)
                        .name(format!(
                            "Trend: {:.3} N/cycle, R² = {:.4}",
                            trend.slope, trend.r_squared
                        ))
                        .color(TREND_COLOR)
                        .width(2.0),
                );
            }
        });
}
