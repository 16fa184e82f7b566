//! Control Panel Widget
//! Left side panel with the date range, granularity and data source controls.

use crate::data::{Dataset, Granularity};
use crate::stats::ViewRequest;
use chrono::NaiveDate;
use egui::{Color32, RichText};
use egui_extras::DatePickerButton;
use std::path::PathBuf;

/// User-chosen filter for the current view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserSettings {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub granularity: Granularity,
}

impl UserSettings {
    pub fn request(&self) -> ViewRequest {
        ViewRequest::new(self.start, self.end).with_granularity(self.granularity)
    }
}

/// Left side control panel.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub bounds: (NaiveDate, NaiveDate),
    pub day_path: PathBuf,
    pub daily_rows: usize,
    pub hourly_rows: usize,
    pub status: String,
    pub status_is_error: bool,
}

impl ControlPanel {
    /// Panel for a freshly loaded dataset, with the range set to its full extent.
    pub fn new(dataset: &Dataset, day_path: PathBuf) -> Self {
        let bounds = dataset
            .date_bounds()
            .unwrap_or((NaiveDate::MIN, NaiveDate::MAX));
        Self {
            settings: UserSettings {
                start: bounds.0,
                end: bounds.1,
                granularity: Granularity::Daily,
            },
            bounds,
            day_path,
            daily_rows: dataset.daily.len(),
            hourly_rows: dataset.hourly.len(),
            status: "Ready".to_string(),
            status_is_error: false,
        }
    }

    /// Reset the date range to the full dataset extent.
    pub fn reset_range(&mut self) {
        self.settings.start = self.bounds.0;
        self.settings.end = self.bounds.1;
    }

    pub fn set_status(&mut self, status: impl Into<String>, is_error: bool) {
        self.status = status.into();
        self.status_is_error = is_error;
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;
        let before = self.settings;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🚲 Bike Rentals")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Dataset Explorer")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Date Filter Section =====
        ui.label(RichText::new("📅 Filter Data").size(14.0).strong());
        ui.add_space(5.0);

        let label_width = 90.0;

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Start Date:"));
            ui.add(DatePickerButton::new(&mut self.settings.start).id_salt("start_date"));
        });
        ui.add_space(5.0);
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("End Date:"));
            ui.add(DatePickerButton::new(&mut self.settings.end).id_salt("end_date"));
        });

        ui.add_space(8.0);
        if ui.small_button("↺ Full Range").clicked() {
            action = ControlPanelAction::ResetRange;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Granularity Section =====
        ui.label(RichText::new("⚙️ Scatter Data").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            for granularity in [Granularity::Daily, Granularity::Hourly] {
                ui.radio_value(&mut self.settings.granularity, granularity, granularity.label());
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                let dir = self
                    .day_path
                    .parent()
                    .map(|p| p.display().to_string())
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| ".".to_string());
                ui.label(RichText::new(dir).size(12.0));
                ui.label(
                    RichText::new(format!(
                        "{} days, {} hours",
                        self.daily_rows, self.hourly_rows
                    ))
                    .size(11.0)
                    .color(Color32::GRAY),
                );
                ui.label(
                    RichText::new(format!("{} to {}", self.bounds.0, self.bounds.1))
                        .size(11.0)
                        .color(Color32::GRAY),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("📂 Browse").clicked() {
                        action = ControlPanelAction::BrowseData;
                    }
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        let status_color = if self.status_is_error {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        if action == ControlPanelAction::None && self.settings != before {
            action = ControlPanelAction::SettingsChanged;
        }
        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    SettingsChanged,
    ResetRange,
    BrowseData,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RentalRecord;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_panel_spans_full_dataset_and_resets_to_it() {
        let dataset = Dataset::new(
            vec![
                RentalRecord::sample(date(2011, 3, 1), 10),
                RentalRecord::sample(date(2012, 6, 30), 20),
            ],
            Vec::new(),
        );
        let mut panel = ControlPanel::new(&dataset, PathBuf::from("Data/day.csv"));
        assert_eq!(panel.settings.start, date(2011, 3, 1));
        assert_eq!(panel.settings.end, date(2012, 6, 30));

        panel.settings.start = date(2012, 1, 1);
        panel.reset_range();
        assert_eq!(panel.settings.start, date(2011, 3, 1));

        let request = panel.settings.request();
        assert_eq!(request.granularity, Granularity::Daily);
        assert_eq!(request.end, date(2012, 6, 30));
    }
}
