// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation list and properties panel.
//!
//! Lists every lane and trigger, and edits the selected annotation's
//! name, color, stroke width, and (for lanes) number. Edits apply directly
//! through the editor's selected-annotation view; deletes are only
//! requested here and confirmed by the caller.

use crate::editor::AnnotationEditor;
use crate::models::annotation::{format_color, parse_color, AnnotationId, AnnotationMut};

/// What the panel asks the application to do.
pub enum PropertiesAction {
    None,
    Select(AnnotationId),
    RequestDelete(AnnotationId),
}

/// Display the annotation list and the selected annotation's properties.
pub fn show(ui: &mut egui::Ui, editor: &mut AnnotationEditor) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Annotations");
    ui.separator();

    egui::ScrollArea::vertical().show(ui, |ui| {
        let selected = editor.state().selected;

        ui.label(egui::RichText::new("Lanes").strong());
        if editor.state().lanes.is_empty() {
            ui.label(egui::RichText::new("none").weak());
        }
        for lane in &editor.state().lanes {
            let id = AnnotationId(lane.id);
            ui.horizontal(|ui| {
                let label = format!("{} ({} pts)", lane.name, lane.points.len());
                if ui.selectable_label(selected == Some(id), label).clicked() {
                    action = PropertiesAction::Select(id);
                }
                if ui.small_button("🗑").clicked() {
                    action = PropertiesAction::RequestDelete(id);
                }
            });
        }

        ui.add_space(6.0);
        ui.label(egui::RichText::new("Triggers").strong());
        if editor.state().triggers.is_empty() {
            ui.label(egui::RichText::new("none").weak());
        }
        for trigger in &editor.state().triggers {
            let id = AnnotationId(trigger.id);
            ui.horizontal(|ui| {
                let label = format!("{} ({} pts)", trigger.name, trigger.points.len());
                if ui.selectable_label(selected == Some(id), label).clicked() {
                    action = PropertiesAction::Select(id);
                }
                if ui.small_button("🗑").clicked() {
                    action = PropertiesAction::RequestDelete(id);
                }
            });
        }

        ui.add_space(10.0);
        ui.separator();

        if let Some(ann) = editor.selected_mut() {
            show_properties(ui, ann);
        } else {
            ui.label(egui::RichText::new("Nothing selected").weak());
        }
    });

    action
}

fn show_properties(ui: &mut egui::Ui, mut ann: AnnotationMut<'_>) {
    ui.label(egui::RichText::new("Properties").strong());

    egui::Grid::new("annotation_properties")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            ui.label("Name:");
            ui.text_edit_singleline(ann.name_mut());
            ui.end_row();

            ui.label("Color:");
            let mut rgb = parse_color(ann.color_mut()).unwrap_or([255, 255, 255]);
            if ui.color_edit_button_srgb(&mut rgb).changed() {
                *ann.color_mut() = format_color(rgb);
            }
            ui.end_row();

            ui.label("Stroke:");
            ui.add(egui::Slider::new(ann.stroke_width_mut(), 1..=12).suffix(" px"));
            ui.end_row();

            // Lane number only exists on lanes; the field group is simply
            // absent for triggers.
            if let AnnotationMut::Lane(lane) = &mut ann {
                ui.label("Number:");
                ui.add(egui::DragValue::new(&mut lane.number).range(1..=99));
                ui.end_row();
            }
        });
}
