mod app;
mod chart;
mod color;
mod config;
mod data;
mod state;
mod table;
mod ui;

use app::GapminderApp;
use clap::Parser;
use config::{Cli, DashboardConfig};
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::from(Cli::parse());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size),
        ..Default::default()
    };

    let title = config.window_title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(GapminderApp::new(config)))),
    )
}
