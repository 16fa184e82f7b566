//! Chart Plotter Module
//! Draws the dashboard charts with egui_plot.

use crate::stats::{
    CorrelationMatrix, DayKindMean, HourMean, SeasonTotal, WeatherDistribution, YearTotal,
};
use egui::{Align2, Color32, FontId, RichText, Sense, Stroke};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, PlotUi, Points,
};
use std::collections::HashMap;

pub const CHART_HEIGHT: f32 = 240.0;

/// Sequential blues for the yearly bars.
pub const BLUES: [Color32; 4] = [
    Color32::from_rgb(158, 202, 225),
    Color32::from_rgb(66, 146, 198),
    Color32::from_rgb(33, 113, 181),
    Color32::from_rgb(8, 69, 148),
];

pub const PURPLE: Color32 = Color32::from_rgb(128, 0, 128);

pub const PALETTE: [Color32; 4] = [
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(155, 89, 182),  // Purple
];

const COOL: Color32 = Color32::from_rgb(59, 76, 192);
const NEUTRAL: Color32 = Color32::from_rgb(221, 221, 221);
const WARM: Color32 = Color32::from_rgb(180, 4, 38);

/// Creates the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Diverging blue-white-red color for a correlation in [-1, 1].
    pub fn coolwarm(value: f64) -> Color32 {
        if !value.is_finite() {
            return Color32::GRAY;
        }
        let v = value.clamp(-1.0, 1.0) as f32;
        if v < 0.0 {
            Self::lerp(NEUTRAL, COOL, -v)
        } else {
            Self::lerp(NEUTRAL, WARM, v)
        }
    }

    fn lerp(from: Color32, to: Color32, t: f32) -> Color32 {
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color32::from_rgb(
            mix(from.r(), to.r()),
            mix(from.g(), to.g()),
            mix(from.b(), to.b()),
        )
    }

    /// Calculate beeswarm positions for points with duplicate values.
    pub fn beeswarm_positions(y_values: &[f64], center: f64, width: f64) -> Vec<f64> {
        let n = y_values.len();
        if n == 0 {
            return Vec::new();
        }

        let mut positions = vec![center; n];

        // Round values and find duplicates
        let precision = 1e6;
        let mut value_indices: HashMap<i64, Vec<usize>> = HashMap::new();

        for (i, &y) in y_values.iter().enumerate() {
            let key = (y * precision).round() as i64;
            value_indices.entry(key).or_default().push(i);
        }

        // Spread duplicates symmetrically
        for indices in value_indices.values() {
            if indices.len() > 1 {
                let count = indices.len();
                let step = width / (count.max(2) - 1) as f64;
                let start = center - width / 2.0;

                for (i, &idx) in indices.iter().enumerate() {
                    positions[idx] = start + i as f64 * step;
                }
            }
        }

        positions
    }

    /// Categorical x-axis: integer positions map to `labels`.
    fn show_category_plot<F>(ui: &mut egui::Ui, id: &str, labels: Vec<String>, y_label: &str, add: F)
    where
        F: FnOnce(&mut PlotUi),
    {
        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .y_axis_label(y_label.to_string())
            .x_axis_formatter(move |mark, _range| {
                let v = mark.value;
                if (v - v.round()).abs() > 1e-6 || v < 0.0 {
                    return String::new();
                }
                labels.get(v.round() as usize).cloned().unwrap_or_default()
            })
            .show(ui, add);
    }

    /// Total rentals per year.
    pub fn draw_year_bars(ui: &mut egui::Ui, yearly: &[YearTotal]) {
        let labels: Vec<String> = yearly.iter().map(|y| y.year.to_string()).collect();
        let bars: Vec<Bar> = yearly
            .iter()
            .enumerate()
            .map(|(i, y)| {
                Bar::new(i as f64, y.total as f64)
                    .width(0.6)
                    .name(y.year)
                    .fill(BLUES[(i + 1).min(BLUES.len() - 1)])
            })
            .collect();

        Self::show_category_plot(ui, "yearly_trend", labels, "Total Rentals", |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Total Rentals"));
        });
    }

    /// Mean rentals per hour of day with the peak hour highlighted.
    pub fn draw_hourly_line(ui: &mut egui::Ui, hourly: &[HourMean], peak_hour: Option<u8>) {
        let points: Vec<[f64; 2]> = hourly
            .iter()
            .map(|h| [f64::from(h.hour), h.mean])
            .collect();
        let peak: Vec<[f64; 2]> = hourly
            .iter()
            .filter(|h| Some(h.hour) == peak_hour)
            .map(|h| [f64::from(h.hour), h.mean])
            .collect();

        Plot::new("hourly_trend")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .include_x(0.0)
            .include_x(23.0)
            .include_y(0.0)
            .x_axis_label("Hour of Day")
            .y_axis_label("Average Rentals")
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .color(PURPLE)
                        .width(2.0)
                        .name("Average Rentals"),
                );
                plot_ui.points(Points::new(PlotPoints::from(points)).radius(3.5).color(PURPLE));
                plot_ui.points(
                    Points::new(PlotPoints::from(peak))
                        .radius(6.0)
                        .color(Color32::from_rgb(231, 76, 60))
                        .name("Peak Hour"),
                );
            });
    }

    /// Annotated heatmap of the correlation matrix.
    pub fn draw_correlation_heatmap(ui: &mut egui::Ui, matrix: &CorrelationMatrix) {
        let cell = egui::vec2(72.0, 30.0);

        egui::Grid::new("correlation_heatmap")
            .spacing([2.0, 2.0])
            .show(ui, |ui| {
                ui.label("");
                for label in &matrix.labels {
                    ui.add_sized(cell, egui::Label::new(RichText::new(*label).strong()));
                }
                ui.end_row();

                for (i, row_label) in matrix.labels.iter().enumerate() {
                    ui.add_sized(cell, egui::Label::new(RichText::new(*row_label).strong()));
                    for j in 0..matrix.size() {
                        let value = matrix.get(i, j);
                        let (rect, response) = ui.allocate_exact_size(cell, Sense::hover());
                        let fill = Self::coolwarm(value);
                        ui.painter().rect_filled(rect, 3.0, fill);

                        let text = if value.is_finite() {
                            format!("{value:.2}")
                        } else {
                            "n/a".to_string()
                        };
                        let text_color = if value.abs() > 0.6 {
                            Color32::WHITE
                        } else {
                            Color32::BLACK
                        };
                        ui.painter().text(
                            rect.center(),
                            Align2::CENTER_CENTER,
                            text,
                            FontId::proportional(13.0),
                            text_color,
                        );
                        response.on_hover_text(format!(
                            "{} vs {}",
                            matrix.labels[i], matrix.labels[j]
                        ));
                    }
                    ui.end_row();
                }
            });
    }

    /// Weather variable against rentals.
    pub fn draw_scatter(
        ui: &mut egui::Ui,
        id: &str,
        x_label: &str,
        points: &[[f64; 2]],
        color: Color32,
    ) {
        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .include_x(0.0)
            .include_x(1.0)
            .include_y(0.0)
            .x_axis_label(x_label.to_string())
            .y_axis_label("Rentals")
            .show(ui, |plot_ui| {
                plot_ui.points(
                    Points::new(PlotPoints::from(points.to_vec()))
                        .radius(2.0)
                        .color(color.gamma_multiply(0.5)),
                );
            });
    }

    /// Mean rentals on weekdays vs weekends.
    pub fn draw_day_kind_bars(ui: &mut egui::Ui, day_kinds: &[DayKindMean]) {
        let labels: Vec<String> = day_kinds.iter().map(|d| d.kind.label().to_string()).collect();
        let bars: Vec<Bar> = day_kinds
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let color = if i == 0 { COOL } else { WARM };
                Bar::new(i as f64, d.mean)
                    .width(0.6)
                    .name(d.kind.label())
                    .fill(color)
            })
            .collect();

        Self::show_category_plot(ui, "weekday_weekend", labels, "Average Rentals", |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Average Rentals"));
        });
    }

    /// Total rentals per season.
    pub fn draw_season_bars(ui: &mut egui::Ui, seasons: &[SeasonTotal]) {
        let labels: Vec<String> = seasons.iter().map(|s| s.label.to_string()).collect();
        let bars: Vec<Bar> = seasons
            .iter()
            .enumerate()
            .map(|(i, s)| {
                Bar::new(i as f64, s.total as f64)
                    .width(0.6)
                    .name(s.label)
                    .fill(PALETTE[usize::from(s.season.saturating_sub(1)) % PALETTE.len()])
            })
            .collect();

        Self::show_category_plot(ui, "season_totals", labels, "Total Rentals", |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Total Rentals"));
        });
    }

    /// Box plot with scatter overlay of daily rentals per weather situation.
    pub fn draw_weather_boxplot(ui: &mut egui::Ui, weather: &[WeatherDistribution]) {
        let labels: Vec<String> = weather.iter().map(|w| w.label.to_string()).collect();

        Self::show_category_plot(ui, "weather_boxplot", labels, "Daily Rentals", |plot_ui| {
            for (i, dist) in weather.iter().enumerate() {
                if dist.counts.is_empty() {
                    continue;
                }
                let color = PALETTE[usize::from(dist.weather.saturating_sub(1)) % PALETTE.len()];
                let s = &dist.stats;

                let iqr = s.q3 - s.q1;
                let mut sorted = dist.counts.clone();
                sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                let whisker_low = sorted
                    .iter()
                    .copied()
                    .find(|&v| v >= s.q1 - 1.5 * iqr)
                    .unwrap_or(s.q1);
                let whisker_high = sorted
                    .iter()
                    .rev()
                    .copied()
                    .find(|&v| v <= s.q3 + 1.5 * iqr)
                    .unwrap_or(s.q3);

                let box_elem = BoxElem::new(
                    i as f64,
                    BoxSpread::new(whisker_low, s.q1, s.median, s.q3, whisker_high),
                )
                .box_width(0.5)
                .fill(color.gamma_multiply(0.3))
                .stroke(Stroke::new(1.5, color));

                plot_ui.box_plot(BoxPlot::new(vec![box_elem]).name(dist.label));

                let x_positions = Self::beeswarm_positions(&dist.counts, i as f64, 0.35);
                let points: PlotPoints = x_positions
                    .iter()
                    .zip(dist.counts.iter())
                    .map(|(&x, &y)| [x, y])
                    .collect();
                plot_ui.points(Points::new(points).radius(2.5).color(color.gamma_multiply(0.7)));
            }
        });
    }

    /// Descriptive statistics per weather situation.
    pub fn draw_weather_stats_table(ui: &mut egui::Ui, weather: &[WeatherDistribution]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("weather_stats_table")
                    .striped(true)
                    .min_col_width(55.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        for header in ["Weather", "Days", "Mean", "Median", "Std", "P05", "P95"] {
                            ui.label(RichText::new(header).strong().size(11.0));
                        }
                        ui.end_row();

                        for dist in weather {
                            let s = &dist.stats;
                            ui.label(RichText::new(dist.label).size(11.0));
                            ui.label(RichText::new(s.count.to_string()).size(11.0));
                            for v in [s.mean, s.median, s.std, s.p05, s.p95] {
                                ui.label(RichText::new(format!("{v:.1}")).size(11.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}
