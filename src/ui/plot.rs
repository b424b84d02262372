use std::ops::RangeInclusive;

use eframe::egui::{RichText, Ui};
use egui_plot::{GridInput, GridMark, MarkerShape, Plot, PlotPoint, PlotPoints, Points};

use crate::chart::gdp_tick_label;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Scatter plot (central panel)
// ---------------------------------------------------------------------------

/// Grid lines for a log10-transformed axis: a strong line per decade and
/// faint lines at 2..9 times each decade.
fn decade_marks(input: GridInput) -> Vec<GridMark> {
    // Decades outside f64's exponent range carry no marks.
    let lo = input.bounds.0.max(f64::MIN_10_EXP as f64);
    let hi = input.bounds.1.min(f64::MAX_10_EXP as f64);
    if !lo.is_finite() || !hi.is_finite() || hi <= lo {
        return Vec::new();
    }
    let first = lo.floor() as i64;
    let last = hi.ceil() as i64;
    let decades = last.saturating_sub(first);
    let stride = (decades / 30).max(1);
    let minor = decades <= 12;

    let mut marks = Vec::new();
    for decade in (first..=last).step_by(stride as usize) {
        for k in 1..10 {
            if k > 1 && !minor {
                break;
            }
            let value = decade as f64 + (k as f64).log10();
            if value < lo || value > hi {
                continue;
            }
            let step_size = if k == 1 { stride as f64 } else { 0.1 };
            marks.push(GridMark { value, step_size });
        }
    }
    marks
}

/// Render the title, legend and scatter plot in the central panel.
pub fn scatter_plot(ui: &mut Ui, state: &AppState) {
    let Some(chart) = &state.chart else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view the dashboard  (File → Open…)");
        });
        return;
    };

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(&chart.title);
    });
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.strong(chart.legend_title);
        for (name, color) in &chart.legend {
            ui.label(RichText::new(format!("● {name}")).color(*color));
        }
    });

    // The hover closure outlives this borrow of `state`.
    let hover = chart.clone();

    let mut plot = Plot::new("gapminder_scatter")
        .x_axis_label(chart.x_label)
        .y_axis_label(chart.y_label)
        .label_formatter(move |_name: &str, value: &PlotPoint| {
            match hover.hover_target(value.x, value.y) {
                Some(p) => format!(
                    "{} ({})\ngdpPercap: {:.0}\nlifeExp: {:.1}\npop: {}",
                    p.country, p.continent, p.gdp_percap, p.life_exp, p.pop
                ),
                None => String::new(),
            }
        });
    if chart.log_x {
        plot = plot
            .x_grid_spacer(decade_marks)
            .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
                gdp_tick_label(mark.value)
            });
    }

    plot
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for p in &chart.points {
                let marker = Points::new(PlotPoints::new(vec![[p.plot_x(), p.life_exp]]))
                    .name(&p.continent)
                    .color(p.color)
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius((p.size / 2.0) as f32);
                plot_ui.points(marker);
            }
        });
}
