// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! PDF Box Annotator
//!
//! A desktop application for drawing boxes on the pages of PDF files,
//! submitting them to an analysis backend, and reviewing the extracted
//! transactions on a financial dashboard.

mod app;
mod config;
mod controller;
mod io;
mod models;
mod ui;
mod util;

use anyhow::Result;
use app::PdfBoxApp;
use config::AppConfig;

fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::init();

    let config = AppConfig::from_env()?;
    log::info!("Using backend at {}", config.backend_url);

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("PDF Box Annotator"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "PDF Box Annotator",
        options,
        Box::new(move |_cc| Ok(Box::new(PdfBoxApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
