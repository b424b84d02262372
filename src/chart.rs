use std::collections::BTreeSet;

use eframe::egui::Color32;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::filter::FilteredView;

pub const X_LABEL: &str = "GDP per Capita (log scale)";
pub const Y_LABEL: &str = "Life Expectancy";
pub const LEGEND_TITLE: &str = "Continent";

// ---------------------------------------------------------------------------
// Chart description
// ---------------------------------------------------------------------------

/// One marker of the scatter plot.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub gdp_percap: f64,
    pub life_exp: f64,
    pub pop: i64,
    /// Marker diameter in screen points.
    pub size: f64,
    pub color: Color32,
    /// Hover label.
    pub country: String,
    /// Legend group.
    pub continent: String,
}

impl ScatterPoint {
    /// Position on the logarithmic x axis.
    pub fn plot_x(&self) -> f64 {
        self.gdp_percap.log10()
    }
}

/// Everything the plot widget needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub legend_title: &'static str,
    pub log_x: bool,
    pub points: Vec<ScatterPoint>,
    /// Continents present in the view, in colour-map order.
    pub legend: Vec<(String, Color32)>,
}

/// Largest normalised cursor distance at which a marker still gets a
/// hover label.
pub const HOVER_RADIUS: f64 = 0.05;

impl ChartSpec {
    /// Point closest to a cursor position given in plot coordinates
    /// (`plot_x` already log-scaled), with its distance. Distances are
    /// normalised by the extent of the data so both axes weigh the same;
    /// the extent is floored at half a decade and five years so a lone
    /// marker does not make every offset look huge.
    pub fn nearest(&self, plot_x: f64, y: f64) -> Option<(&ScatterPoint, f64)> {
        let (x_min, x_max) = min_max(self.points.iter().map(ScatterPoint::plot_x))?;
        let (y_min, y_max) = min_max(self.points.iter().map(|p| p.life_exp))?;
        let x_span = (x_max - x_min).max(0.5);
        let y_span = (y_max - y_min).max(5.0);

        self.points
            .iter()
            .map(|p| {
                let dx = (p.plot_x() - plot_x) / x_span;
                let dy = (p.life_exp - y) / y_span;
                (p, (dx * dx + dy * dy).sqrt())
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// The marker under the cursor, if any is within [`HOVER_RADIUS`].
    pub fn hover_target(&self, plot_x: f64, y: f64) -> Option<&ScatterPoint> {
        self.nearest(plot_x, y)
            .filter(|(_, distance)| *distance <= HOVER_RADIUS)
            .map(|(p, _)| p)
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Title shown above the plot. An unparseable year renders as `?`.
pub fn chart_title(year: Option<i64>) -> String {
    match year {
        Some(y) => format!("Life Expectancy vs GDP per Capita ({y})"),
        None => "Life Expectancy vs GDP per Capita (?)".to_string(),
    }
}

/// Tick label for a position on the log x axis: `500`, `2k`, `50k`, `1M`.
pub fn gdp_tick_label(plot_x: f64) -> String {
    // Snap away powf noise so 10^3 lands on 1000, not 999.999...
    let value = (10f64.powf(plot_x) * 1e6).round() / 1e6;
    if value >= 1e6 {
        format!("{}M", trim_number(value / 1e6))
    } else if value >= 1e3 {
        format!("{}k", trim_number(value / 1e3))
    } else {
        trim_number(value)
    }
}

fn trim_number(v: f64) -> String {
    let rounded = (v * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}

/// Marker diameter with area proportional to population, relative to the
/// most populous row and capped at `size_max`.
pub fn marker_size(pop: i64, max_pop: i64, size_max: f64, size_min: f64) -> f64 {
    if max_pop <= 0 || pop <= 0 {
        return size_min;
    }
    let ratio = (pop as f64 / max_pop as f64).min(1.0);
    (size_max * ratio.sqrt()).max(size_min)
}

/// Map the filtered rows to chart markers, one per row in view order.
///
/// Rows whose GDP cannot sit on a log axis (zero, negative, NaN) are left
/// out of the chart; the table still shows them.
pub fn project_chart(
    view: &FilteredView<'_>,
    year: Option<i64>,
    colors: &ColorMap,
    config: &DashboardConfig,
) -> ChartSpec {
    let plottable: Vec<_> = view
        .records()
        .filter(|r| r.gdp_percap.is_finite() && r.gdp_percap > 0.0)
        .collect();
    let max_pop = plottable.iter().map(|r| r.pop).max().unwrap_or(0);

    let points: Vec<ScatterPoint> = plottable
        .iter()
        .map(|r| ScatterPoint {
            gdp_percap: r.gdp_percap,
            life_exp: r.life_exp,
            pop: r.pop,
            size: marker_size(r.pop, max_pop, config.size_max, config.size_min),
            color: colors.color_for(&r.continent),
            country: r.country.clone(),
            continent: r.continent.clone(),
        })
        .collect();

    let present: BTreeSet<&str> = points.iter().map(|p| p.continent.as_str()).collect();
    let legend = colors
        .legend_entries()
        .into_iter()
        .filter(|(name, _)| present.contains(name.as_str()))
        .collect();

    ChartSpec {
        title: chart_title(year),
        x_label: X_LABEL,
        y_label: Y_LABEL,
        legend_title: LEGEND_TITLE,
        log_x: true,
        points,
        legend,
    }
}
