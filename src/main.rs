#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

mod app;
mod config;
mod display;
mod error;
mod export;
mod geometry;
mod history;
mod selection;
mod session;

use eframe::egui;

use crate::app::TrimmerApp;
use crate::config::TrimmerConfig;

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = TrimmerConfig::default();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Image Trimmer")
            .with_inner_size(config.window_size)
            .with_drag_and_drop(true),
        ..Default::default()
    };
    log::info!("starting image trimmer");
    eframe::run_native(
        "Image Trimmer",
        options,
        Box::new(|cc| Ok(Box::new(TrimmerApp::new(cc, config)))),
    )
}
