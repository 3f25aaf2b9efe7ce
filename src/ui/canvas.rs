// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas.
//!
//! Displays the frame backdrop letterboxed inside the available rect, paints
//! every annotation on top of it, and translates pointer events into editor
//! entry points. All coordinates handed to the editor are canvas-local
//! display positions; the editor converts to natural space itself.

use crate::editor::{AnnotationEditor, Tool};
use crate::models::annotation::{parse_color, AnnotationKind, AnnotationRef, Point};
use crate::util::mapper::DisplayMapper;

const VERTEX_RADIUS: f32 = 4.0;

pub fn show(
    ui: &mut egui::Ui,
    editor: &mut AnnotationEditor,
    frame_texture: &Option<egui::TextureHandle>,
) {
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);
    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        let Some(texture) = frame_texture else {
            show_welcome(ui);
            return;
        };

        let rect = ui.min_rect();
        let size = editor.state().video_size;
        let mapper = DisplayMapper::fit(
            f64::from(rect.width()),
            f64::from(rect.height()),
            f64::from(size.width),
            f64::from(size.height),
        );

        // Letterboxed frame backdrop.
        let (offset_x, offset_y) = mapper.display_offset();
        let (display_w, display_h) = mapper.display_size();
        let image_rect = egui::Rect::from_min_size(
            rect.min + egui::vec2(offset_x as f32, offset_y as f32),
            egui::vec2(display_w as f32, display_h as f32),
        );
        ui.painter().image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        handle_pointer(ui, rect, editor, &mapper);
        paint_annotations(ui.painter(), rect, editor, &mapper);
    });

    show_status_strip(ui, editor);
}

/// Translate the egui response into editor state-machine calls.
fn handle_pointer(
    ui: &mut egui::Ui,
    rect: egui::Rect,
    editor: &mut AnnotationEditor,
    mapper: &DisplayMapper,
) {
    let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
    let local = |pos: egui::Pos2| Point::new(f64::from(pos.x - rect.min.x), f64::from(pos.y - rect.min.y));

    if response.drag_started() {
        if let Some(pos) = response.interact_pointer_pos() {
            editor.pointer_press(mapper, local(pos));
        }
    }
    if response.dragged() {
        if let Some(pos) = response.interact_pointer_pos() {
            editor.pointer_drag(mapper, local(pos));
        }
    }
    if response.drag_stopped() {
        editor.pointer_release();
    }

    if response.double_clicked() || response.secondary_clicked() {
        editor.complete_drawing();
    } else if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            editor.primary_click(mapper, local(pos));
        }
    }

    // The preview point shadows the cursor between clicks.
    if let Some(pos) = response.hover_pos() {
        editor.pointer_move(mapper, local(pos));
    }
}

fn paint_annotations(
    painter: &egui::Painter,
    rect: egui::Rect,
    editor: &AnnotationEditor,
    mapper: &DisplayMapper,
) {
    let state = editor.state();
    let annotations = state
        .lanes
        .iter()
        .map(AnnotationRef::Lane)
        .chain(state.triggers.iter().map(AnnotationRef::Trigger));

    for ann in annotations {
        let id = ann.id();
        let selected = state.selected == Some(id);
        let in_progress = editor.preview_of(id);

        let mut display: Vec<egui::Pos2> = ann
            .points()
            .iter()
            .map(|p| {
                let d = mapper.to_display(*p);
                egui::pos2(rect.min.x + d.x as f32, rect.min.y + d.y as f32)
            })
            .collect();
        // The rubber band from the last committed vertex to the cursor.
        if let Some(preview) = in_progress {
            let d = mapper.to_display(preview);
            display.push(egui::pos2(rect.min.x + d.x as f32, rect.min.y + d.y as f32));
        }
        if display.is_empty() {
            continue;
        }

        let rgb = parse_color(ann.color()).unwrap_or([255, 255, 255]);
        let color = egui::Color32::from_rgb(rgb[0], rgb[1], rgb[2]);
        let width = ann.stroke_width() as f32 + if selected { 1.5 } else { 0.0 };
        let stroke = egui::Stroke::new(width, color);

        for pair in display.windows(2) {
            painter.line_segment([pair[0], pair[1]], stroke);
        }
        // Committed lanes close back to the first vertex; in-progress
        // outlines stay open until completed.
        if ann.is_closed() && in_progress.is_none() {
            painter.line_segment([display[display.len() - 1], display[0]], stroke);
        }

        let vertex_fill = if selected {
            egui::Color32::WHITE
        } else {
            color
        };
        for pos in &display {
            painter.circle_filled(*pos, VERTEX_RADIUS, vertex_fill);
            painter.circle_stroke(*pos, VERTEX_RADIUS, egui::Stroke::new(1.0, egui::Color32::BLACK));
        }

        // Lane number badge at the polygon centroid.
        if let AnnotationRef::Lane(lane) = ann {
            if lane.is_closed() && in_progress.is_none() {
                let centroid = centroid(&display);
                painter.text(
                    centroid,
                    egui::Align2::CENTER_CENTER,
                    lane.number.to_string(),
                    egui::FontId::proportional(18.0),
                    egui::Color32::WHITE,
                );
            }
        }
    }
}

fn centroid(points: &[egui::Pos2]) -> egui::Pos2 {
    let n = points.len() as f32;
    let sum = points
        .iter()
        .fold(egui::vec2(0.0, 0.0), |acc, p| acc + p.to_vec2());
    egui::pos2(sum.x / n, sum.y / n)
}

fn show_welcome(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.heading(
                egui::RichText::new("VLOOP")
                    .size(32.0)
                    .color(egui::Color32::from_gray(200)),
            );
            ui.label(
                egui::RichText::new("Virtual Loop Editor")
                    .size(14.0)
                    .color(egui::Color32::from_gray(150)),
            );
            ui.add_space(20.0);
            ui.label(
                egui::RichText::new("Open a video frame to begin annotating")
                    .color(egui::Color32::from_gray(180)),
            );
            ui.add_space(10.0);
            ui.label(
                egui::RichText::new("File → Open Frame...")
                    .weak()
                    .color(egui::Color32::from_gray(130)),
            );
        });
    });
}

fn show_status_strip(ui: &mut egui::Ui, editor: &AnnotationEditor) {
    ui.separator();
    ui.horizontal(|ui| {
        let tool = match editor.tool() {
            Tool::Lane => "Lane",
            Tool::Trigger => "Trigger",
        };
        ui.label(format!("Tool: {tool}"));
        ui.separator();
        let state = editor.state();
        ui.label(format!(
            "{} lanes, {} triggers",
            state.lanes.len(),
            state.triggers.len()
        ));
        if let Some(ann) = state.selected.and_then(|id| editor.annotation(id)) {
            ui.separator();
            let kind = match ann.kind() {
                AnnotationKind::Lane => "lane",
                AnnotationKind::Trigger => "trigger",
            };
            ui.label(format!("Selected {kind}: {}", ann.name()));
        }
        ui.separator();
        if editor.is_drawing() {
            ui.label("Drawing: right-click or double-click to finish, Esc to cancel");
        } else if state.video_size.is_known() {
            ui.label(format!(
                "Frame {}x{}",
                state.video_size.width, state.video_size.height
            ));
        } else {
            ui.label("No frame loaded");
        }
    });
}
