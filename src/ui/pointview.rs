// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Live point-cloud preview.
//!
//! A top-down scatter of the newest decoded frame, auto-fitted to the panel.
//! Implements [`RenderAdapter`] by overwriting its buffer, so the display
//! always shows the latest frame and nothing queues up behind a slow paint.

use crate::render::{DecodedFrame, RenderAdapter};

const MARGIN: f32 = 8.0;

/// Panel state: just the latest frame.
#[derive(Default)]
pub struct PointView {
    frame: Option<DecodedFrame>,
}

impl RenderAdapter for PointView {
    fn submit(&mut self, frame: DecodedFrame) {
        self.frame = Some(frame);
    }
}

impl PointView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paint the scatter into the available panel space.
    pub fn show(&self, ui: &mut egui::Ui) {
        let (rect, _response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 2.0, egui::Color32::from_gray(20));

        let Some(frame) = &self.frame else {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "No point cloud",
                egui::FontId::proportional(13.0),
                egui::Color32::from_gray(110),
            );
            return;
        };
        if frame.is_empty() {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Empty frame",
                egui::FontId::proportional(13.0),
                egui::Color32::from_gray(110),
            );
            return;
        }

        // Bird's-eye projection in the sensor frame: y runs lateral
        // (mirrored so positive y is left), z runs forward, x is height.
        // The bounding box auto-fits the panel, preserving aspect.
        let b = bounds(frame);
        let span_y = (b.max_y - b.min_y).max(f32::EPSILON);
        let span_z = (b.max_z - b.min_z).max(f32::EPSILON);
        let scale = ((rect.width() - 2.0 * MARGIN) / span_y)
            .min((rect.height() - 2.0 * MARGIN) / span_z)
            .max(0.0);

        for (position, color) in frame.positions.iter().zip(&frame.colors) {
            let col = rect.max.x - MARGIN - (position.y - b.min_y) * scale;
            let row = rect.max.y - MARGIN - (position.z - b.min_z) * scale;
            painter.circle_filled(
                egui::pos2(col, row),
                1.0,
                egui::Color32::from_rgb(color[0], color[1], color[2]),
            );
        }

        painter.text(
            rect.min + egui::vec2(6.0, 4.0),
            egui::Align2::LEFT_TOP,
            format!(
                "{} points, h {:.1}..{:.1} m",
                frame.len(),
                b.min_x,
                b.max_x
            ),
            egui::FontId::proportional(12.0),
            egui::Color32::from_gray(160),
        );
    }
}

struct Bounds {
    min_x: f32,
    max_x: f32,
    min_y: f32,
    max_y: f32,
    min_z: f32,
    max_z: f32,
}

fn bounds(frame: &DecodedFrame) -> Bounds {
    let mut b = Bounds {
        min_x: f32::INFINITY,
        max_x: f32::NEG_INFINITY,
        min_y: f32::INFINITY,
        max_y: f32::NEG_INFINITY,
        min_z: f32::INFINITY,
        max_z: f32::NEG_INFINITY,
    };
    for p in &frame.positions {
        b.min_x = b.min_x.min(p.x);
        b.max_x = b.max_x.max(p.x);
        b.min_y = b.min_y.min(p.y);
        b.max_y = b.max_y.max(p.y);
        b.min_z = b.min_z.min(p.z);
        b.max_z = b.max_z.max(p.z);
    }
    b
}
