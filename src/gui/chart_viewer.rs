//! Chart Viewer Widget
//! Central scrollable panel with the metric cards and every dashboard chart.

use crate::charts::ChartPlotter;
use crate::stats::{ViewError, ViewModel};
use egui::{Color32, RichText, ScrollArea};

const CARD_WIDTH: f32 = 170.0;
const SECTION_SPACING: f32 = 18.0;

/// Years with a dedicated metric card.
const HEADLINE_YEARS: [i32; 2] = [2011, 2012];

/// Format an integer with thousands separators, e.g. `1,234,567`.
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        format!("-{out}")
    } else {
        out
    }
}

/// Renders the latest view result.
#[derive(Default)]
pub struct ChartViewer {
    pub view: Option<Result<ViewModel, ViewError>>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_view(&mut self, view: Result<ViewModel, ViewError>) {
        self.view = Some(view);
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        let view = match &self.view {
            None => {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No Data").size(20.0));
                });
                return;
            }
            Some(Err(err)) => {
                ui.add_space(20.0);
                ui.label(
                    RichText::new(format!("⚠ {err}"))
                        .size(16.0)
                        .color(Color32::from_rgb(220, 53, 69)),
                );
                return;
            }
            Some(Ok(view)) => view,
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(RichText::new("🚲 Bike Rental Dashboard").size(24.0));
                ui.add_space(8.0);

                Self::draw_metrics(ui, view);
                ui.add_space(SECTION_SPACING);

                ui.columns(2, |cols| {
                    Self::section(&mut cols[0], "📈 Rental Trend", |ui| {
                        ChartPlotter::draw_year_bars(ui, &view.yearly);
                    });
                    Self::section(&mut cols[1], "⏰ Busy Hours", |ui| {
                        let peak = view
                            .peak_hour
                            .map(|h| format!("Peak hour: {h}:00"))
                            .unwrap_or_else(|| "Peak hour: -".to_string());
                        ui.label(RichText::new(peak).strong());
                        ChartPlotter::draw_hourly_line(ui, &view.hourly, view.peak_hour);
                    });
                });

                ui.add_space(SECTION_SPACING);
                Self::section(ui, "📊 Weather vs Rentals Correlation", |ui| {
                    ChartPlotter::draw_correlation_heatmap(ui, &view.correlation);
                });

                ui.add_space(SECTION_SPACING);
                Self::section(
                    ui,
                    &format!("🌤️ Weather Influence ({})", view.request.granularity.label()),
                    |ui| {
                        ui.columns(3, |cols| {
                            ChartPlotter::draw_scatter(
                                &mut cols[0],
                                "scatter_temp",
                                "Temperature",
                                &view.scatter.temp,
                                Color32::RED,
                            );
                            ChartPlotter::draw_scatter(
                                &mut cols[1],
                                "scatter_hum",
                                "Humidity",
                                &view.scatter.humidity,
                                Color32::GREEN,
                            );
                            ChartPlotter::draw_scatter(
                                &mut cols[2],
                                "scatter_wind",
                                "Wind Speed",
                                &view.scatter.windspeed,
                                Color32::BLUE,
                            );
                        });
                    },
                );

                ui.add_space(SECTION_SPACING);
                ui.columns(2, |cols| {
                    Self::section(&mut cols[0], "📅 Weekday vs Weekend", |ui| {
                        ChartPlotter::draw_day_kind_bars(ui, &view.day_kinds);
                    });
                    Self::section(&mut cols[1], "🍂 Rentals by Season", |ui| {
                        ChartPlotter::draw_season_bars(ui, &view.seasons);
                    });
                });

                ui.add_space(SECTION_SPACING);
                Self::section(ui, "🌧️ Rentals by Weather Situation", |ui| {
                    ChartPlotter::draw_weather_boxplot(ui, &view.weather);
                    ui.add_space(8.0);
                    ChartPlotter::draw_weather_stats_table(ui, &view.weather);
                });

                ui.add_space(SECTION_SPACING);
                ui.label(
                    RichText::new("📌 Data source: Bike Sharing Dataset")
                        .size(11.0)
                        .color(Color32::GRAY),
                );
            });
    }

    fn section(ui: &mut egui::Ui, title: &str, add: impl FnOnce(&mut egui::Ui)) {
        ui.label(RichText::new(title).size(16.0).strong());
        ui.add_space(6.0);
        add(ui);
    }

    fn draw_metrics(ui: &mut egui::Ui, view: &ViewModel) {
        let s = &view.summary;
        let mut cards: Vec<(String, String)> = vec![(
            "Total Rentals".to_string(),
            format_thousands(s.total as i64),
        )];
        for year in HEADLINE_YEARS {
            cards.push((
                format!("Rentals {year}"),
                format_thousands(view.total_for_year(year) as i64),
            ));
        }
        if let Some(delta) = view.year_delta {
            let sign = if delta >= 0 { "+" } else { "" };
            cards.push((
                "Year-over-Year".to_string(),
                format!("{sign}{}", format_thousands(delta)),
            ));
        }
        cards.push(("Daily Mean".to_string(), format!("{:.0}", s.mean)));
        cards.push((
            "Busiest Day".to_string(),
            format!("{} ({})", format_thousands(i64::from(s.max)), s.max_date),
        ));
        cards.push((
            "Casual / Registered".to_string(),
            format!(
                "{} / {}",
                format_thousands(s.casual_total as i64),
                format_thousands(s.registered_total as i64)
            ),
        ));

        ui.horizontal_wrapped(|ui| {
            for (label, value) in &cards {
                Self::metric_card(ui, label, value);
            }
        });
    }

    fn metric_card(ui: &mut egui::Ui, label: &str, value: &str) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, Color32::from_rgb(100, 149, 237)))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.set_width(CARD_WIDTH);
                ui.vertical(|ui| {
                    ui.label(RichText::new(label).size(11.0).color(Color32::GRAY));
                    ui.label(RichText::new(value).size(18.0).strong());
                });
            });
    }
}
