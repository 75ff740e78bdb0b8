use std::f64::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

use eframe::egui::{Align2, Color32, RichText, Stroke, Ui};
use egui_plot::{
    uniform_grid_spacer, Bar, BarChart, GridMark, Legend, Plot, PlotPoint, PlotPoints, Polygon, Text,
};

use crate::color::generate_palette;
use crate::format::{decimal2, thousands};
use crate::report::{ChartKind, ChartSpec, Coloring};
use crate::state::AppState;

use super::NO_DATA;

const DONUT_OUTER: f64 = 1.0;
const DONUT_INNER: f64 = 0.6;

// ---------------------------------------------------------------------------
// Chart dispatch
// ---------------------------------------------------------------------------

/// Render one chart with its title, or a "no data" note when empty.
pub fn chart(ui: &mut Ui, spec: &ChartSpec, state: &AppState, height: f32) {
    ui.strong(&spec.title);
    if spec.is_empty() {
        ui.label(RichText::new(NO_DATA).weak());
        return;
    }
    match spec.kind {
        ChartKind::Bars => bars(ui, spec, state, height, false),
        ChartKind::HorizontalBars => bars(ui, spec, state, height, true),
        ChartKind::GroupedBars => grouped_bars(ui, spec, state, height),
        ChartKind::Donut => donut(ui, spec, state, height),
    }
}

/// Colour of one mark according to the chart's colouring rule.
struct Painter<'a> {
    spec: &'a ChartSpec,
    state: &'a AppState,
    series_palette: Vec<Color32>,
    max: f64,
}

impl<'a> Painter<'a> {
    fn new(spec: &'a ChartSpec, state: &'a AppState) -> Self {
        Painter {
            spec,
            state,
            series_palette: generate_palette(spec.series.len()),
            max: spec.max_value(),
        }
    }

    fn color(&self, series: usize, category: usize) -> Color32 {
        let value = self.spec.series[series].values[category];
        match self.spec.coloring {
            Coloring::Categories(dim) => self.state.color_for(dim, &self.spec.categories[category]),
            Coloring::Series(Some(dim)) => self.state.color_for(dim, &self.spec.series[series].name),
            Coloring::Series(None) => self.series_palette[series],
            Coloring::Sequential(ramp) => ramp.at(if self.max > 0.0 { value / self.max } else { 0.0 }),
        }
    }
}

fn value_text(value: f64) -> String {
    if value.fract() == 0.0 && value >= 0.0 {
        thousands(value as u64)
    } else {
        decimal2(value)
    }
}

/// Axis labels for integer positions; `reversed` counts from the top.
fn category_axis(
    categories: Vec<String>,
    reversed: bool,
) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String + 'static {
    move |mark, _range| {
        let pos = mark.value.round();
        if (mark.value - pos).abs() > 1e-6 || pos < 0.0 {
            return String::new();
        }
        let pos = pos as usize;
        let idx = if reversed {
            match categories.len().checked_sub(pos + 1) {
                Some(i) => i,
                None => return String::new(),
            }
        } else {
            pos
        };
        categories.get(idx).cloned().unwrap_or_default()
    }
}

fn base_plot(spec: &ChartSpec, height: f32) -> Plot<'_> {
    Plot::new(spec.id)
        .height(height)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// One bar per category. Horizontal charts list the first category on top.
fn bars(ui: &mut Ui, spec: &ChartSpec, state: &AppState, height: f32, horizontal: bool) {
    let painter = Painter::new(spec, state);
    let n = spec.categories.len();
    let position = |i: usize| if horizontal { (n - 1 - i) as f64 } else { i as f64 };

    let Some(series) = spec.series.first() else {
        return;
    };
    let bars: Vec<Bar> = series
        .values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            Bar::new(position(i), v)
                .name(&spec.categories[i])
                .fill(painter.color(0, i))
                .width(0.7)
        })
        .collect();

    let mut chart = BarChart::new(bars).name(&series.name);
    if horizontal {
        chart = chart.horizontal();
    }

    let axis = category_axis(spec.categories.clone(), horizontal);
    let mut plot = base_plot(spec, height);
    if horizontal {
        plot = plot
            .y_axis_formatter(axis)
            .y_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 25.0]))
            .include_x(0.0)
            .x_axis_label(spec.value_label);
    } else {
        plot = plot
            .x_axis_formatter(axis)
            .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 25.0]))
            .include_y(0.0)
            .include_y(painter.max * 1.15)
            .x_axis_label(spec.category_label)
            .y_axis_label(spec.value_label);
    }

    plot.show(ui, |plot_ui| {
        plot_ui.bar_chart(chart);
        if !horizontal {
            for (i, &v) in series.values.iter().enumerate() {
                plot_ui.text(
                    Text::new(PlotPoint::new(position(i), v), value_text(v)).anchor(Align2::CENTER_BOTTOM),
                );
            }
        }
    });
}

/// Side-by-side bars, one chart per series, sharing the category axis.
fn grouped_bars(ui: &mut Ui, spec: &ChartSpec, state: &AppState, height: f32) {
    let painter = Painter::new(spec, state);
    let m = spec.series.len().max(1) as f64;
    let width = 0.8 / m;

    let charts: Vec<BarChart> = spec
        .series
        .iter()
        .enumerate()
        .map(|(s, series)| {
            let offset = -0.4 + width * (s as f64 + 0.5);
            let bars = series
                .values
                .iter()
                .enumerate()
                .map(|(i, &v)| {
                    Bar::new(i as f64 + offset, v)
                        .name(format!("{} – {}", series.name, spec.categories[i]))
                        .fill(painter.color(s, i))
                        .width(width * 0.95)
                })
                .collect();
            BarChart::new(bars)
                .name(&series.name)
                .color(painter.color(s, 0))
        })
        .collect();

    base_plot(spec, height)
        .legend(Legend::default())
        .x_axis_formatter(category_axis(spec.categories.clone(), false))
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 25.0]))
        .include_y(0.0)
        .x_axis_label(spec.category_label)
        .y_axis_label(spec.value_label)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Donut
// ---------------------------------------------------------------------------

/// Ring of slices, clockwise from twelve o'clock. Each slice is drawn as
/// small convex quads because egui only fills convex polygons.
fn donut(ui: &mut Ui, spec: &ChartSpec, state: &AppState, height: f32) {
    let painter = Painter::new(spec, state);
    let Some(series) = spec.series.first() else {
        return;
    };
    let total: f64 = series.values.iter().sum();
    if total <= 0.0 {
        ui.label(RichText::new(NO_DATA).weak());
        return;
    }

    let point = |r: f64, a: f64| [r * a.cos(), r * a.sin()];

    base_plot(spec, height)
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .show(ui, |plot_ui| {
            let mut start = FRAC_PI_2;
            for (i, &v) in series.values.iter().enumerate() {
                if v <= 0.0 {
                    continue;
                }
                let sweep = v / total * TAU;
                let steps = ((sweep / TAU) * 120.0).ceil().max(1.0) as usize;
                let color = painter.color(0, i);
                let name = format!("{} ({:.1}%)", spec.categories[i], v / total * 100.0);

                for k in 0..steps {
                    let a0 = start - sweep * k as f64 / steps as f64;
                    let a1 = start - sweep * (k + 1) as f64 / steps as f64;
                    let quad = vec![
                        point(DONUT_OUTER, a0),
                        point(DONUT_OUTER, a1),
                        point(DONUT_INNER, a1),
                        point(DONUT_INNER, a0),
                    ];
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(quad))
                            .fill_color(color)
                            .stroke(Stroke::new(1.0, color))
                            .name(&name),
                    );
                }
                start -= sweep;
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mark(value: f64) -> GridMark {
        GridMark { value, step_size: 1.0 }
    }

    #[test]
    fn axis_labels_only_integer_positions() {
        let axis = category_axis(vec!["A".into(), "B".into(), "C".into()], false);
        assert_eq!(axis(mark(1.0), &(0.0..=2.0)), "B");
        assert_eq!(axis(mark(0.5), &(0.0..=2.0)), "");
        assert_eq!(axis(mark(3.0), &(0.0..=2.0)), "");
        assert_eq!(axis(mark(-1.0), &(0.0..=2.0)), "");
    }

    #[test]
    fn reversed_axis_counts_from_top() {
        let axis = category_axis(vec!["A".into(), "B".into(), "C".into()], true);
        assert_eq!(axis(mark(2.0), &(0.0..=2.0)), "A");
        assert_eq!(axis(mark(0.0), &(0.0..=2.0)), "C");
        assert_eq!(axis(mark(5.0), &(0.0..=2.0)), "");
    }

    #[test]
    fn value_labels_group_integers() {
        assert_eq!(value_text(14204.0), "14,204");
        assert_eq!(value_text(2.5), "2.50");
    }
}
