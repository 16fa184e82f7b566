//! Bike Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::config::DashboardConfig;
use crate::data::{DataLoader, Dataset};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::stats::compute_view;
use egui::SidePanel;

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    dataset: Dataset,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig, dataset: Dataset) -> Self {
        let control_panel = ControlPanel::new(&dataset, config.day_path.clone());
        let mut app = Self {
            config,
            dataset,
            control_panel,
            chart_viewer: ChartViewer::new(),
        };
        app.recompute();
        app
    }

    /// Recompute every aggregate for the current settings.
    fn recompute(&mut self) {
        let request = self.control_panel.settings.request();
        let view = compute_view(&self.dataset, request);

        match &view {
            Ok(view) => self.control_panel.set_status(
                format!("{} days, {} hours selected", view.daily_rows, view.hourly_rows),
                false,
            ),
            Err(err) => self.control_panel.set_status(err.to_string(), true),
        }
        self.chart_viewer.set_view(view);
    }

    /// Pick a folder holding `day.csv` and `hour.csv` and reload from it.
    fn handle_browse_data(&mut self) {
        let Some(dir) = rfd::FileDialog::new()
            .set_title("Select folder with day.csv and hour.csv")
            .pick_folder()
        else {
            return;
        };

        let config = self.config.with_data_dir(&dir);
        match DataLoader::new(config.clone()).load() {
            Ok(dataset) => {
                log::info!(
                    "Reloaded {} daily and {} hourly rows from {}",
                    dataset.daily.len(),
                    dataset.hourly.len(),
                    dir.display()
                );
                self.control_panel = ControlPanel::new(&dataset, config.day_path.clone());
                self.config = config;
                self.dataset = dataset;
                self.recompute();
            }
            Err(e) => {
                // The previous dataset stays active.
                log::error!("Failed to load data from {}: {e}", dir.display());
                self.control_panel.set_status(format!("Error: {e}"), true);
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::SettingsChanged => self.recompute(),
                        ControlPanelAction::ResetRange => {
                            self.control_panel.reset_range();
                            self.recompute();
                        }
                        ControlPanelAction::BrowseData => self.handle_browse_data(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}
