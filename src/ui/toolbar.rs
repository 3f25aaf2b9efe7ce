// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar and tool selection UI.
//!
//! Tool switches go through the editor so an in-progress drawing is
//! abandoned rather than silently carried across tools.

use crate::editor::{AnnotationEditor, Tool};

/// Display the toolbar with tool selection buttons.
pub fn show(ui: &mut egui::Ui, editor: &mut AnnotationEditor) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Tools:");

        ui.separator();

        let current = editor.tool();

        if ui.selectable_label(current == Tool::Lane, "▱ Lane").clicked() {
            editor.set_tool(Tool::Lane);
        }

        if ui.selectable_label(current == Tool::Trigger, "⟋ Trigger").clicked() {
            editor.set_tool(Tool::Trigger);
        }

        ui.separator();

        let tool_text = match editor.tool() {
            Tool::Lane => "Click to add vertices, right-click or double-click to close the lane",
            Tool::Trigger => "Click to add points, right-click or double-click to finish the trigger",
        };

        ui.label(egui::RichText::new(tool_text).italics().weak());
    });
}
