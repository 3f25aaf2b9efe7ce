// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! VLOOP - Virtual Loop Editor
//!
//! A cross-platform desktop application for annotating video frames with
//! lanes and triggers in the video's native pixel space, with a live lidar
//! point-cloud preview.

mod app;
mod editor;
mod io;
mod models;
mod render;
mod stream;
mod ui;
mod util;

use app::VloopApp;
use anyhow::Result;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("VLOOP - Virtual Loop Editor"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "VLOOP",
        options,
        Box::new(|_cc| Ok(Box::new(VloopApp::new()))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
