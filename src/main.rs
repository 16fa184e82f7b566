//! Bike Dashboard - Bike Rental Dataset Explorer
//!
//! Loads the daily and hourly bike rental datasets once at startup and
//! renders date-filtered statistics and interactive charts.

mod charts;
mod config;
mod data;
mod gui;
mod stats;

use anyhow::{Context, Result};
use config::DashboardConfig;
use data::DataLoader;
use eframe::egui;
use gui::DashboardApp;

fn main() -> Result<()> {
    env_logger::init();

    let config = DashboardConfig::from_args(std::env::args().skip(1))
        .map_err(|e| {
            log::error!("{e}");
            e
        })
        .context("Invalid configuration")?;
    log::info!(
        "Using day data {} and hour data {} (delimiter {:?}, date format {})",
        config.day_path.display(),
        config.hour_path.display(),
        config.delimiter,
        config.date_format
    );

    let dataset = DataLoader::new(config.clone()).load().map_err(|e| {
        log::error!("{e}");
        e
    })
    .context("Failed to load rental data")?;

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Bike Rental Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Bike Rental Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config, dataset)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start dashboard window: {e}"))
}
