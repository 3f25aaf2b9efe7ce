// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! Wires the editor, the config store, the frame loader, and the point
//! stream into the panel layout. Everything here runs on the single UI
//! thread; the frame loader and the stream reader are the only background
//! threads and both report back over channels polled in `update`.

use crate::editor::AnnotationEditor;
use crate::io::media::LoadedImage;
use crate::io::serialization;
use crate::models::annotation::AnnotationId;
use crate::render::RenderAdapter;
use crate::stream::PointCloudStream;
use crate::ui::pointview::PointView;
use crate::ui::properties::PropertiesAction;
use crate::ui::{canvas, properties, toolbar};
use std::io::Write;
use std::net::TcpStream;
use std::sync::mpsc::{channel, Receiver};

/// Destructive action awaiting user confirmation.
enum PendingConfirm {
    DeleteAnnotation(AnnotationId),
    ClearAll,
}

/// Main application state.
pub struct VloopApp {
    editor: AnnotationEditor,

    /// Frame backdrop texture, once a frame image is loaded.
    frame_texture: Option<egui::TextureHandle>,

    /// Receiver for background frame loading.
    frame_loader: Option<Receiver<Result<LoadedImage, String>>>,

    /// Loading state message shown over the canvas.
    loading_message: Option<String>,

    /// Status line text (last action result or validation message).
    status: String,

    /// The one point-cloud stream and its preview panel.
    stream: PointCloudStream,
    point_view: PointView,

    /// `host:port` text field for the stream connect.
    stream_address: String,

    /// Open confirmation dialog, if any.
    confirm: Option<PendingConfirm>,
}

impl Default for VloopApp {
    fn default() -> Self {
        Self::new()
    }
}

impl VloopApp {
    pub fn new() -> Self {
        Self {
            editor: AnnotationEditor::new(),
            frame_texture: None,
            frame_loader: None,
            loading_message: None,
            status: "Ready".to_string(),
            stream: PointCloudStream::new(),
            point_view: PointView::new(),
            stream_address: String::new(),
            confirm: None,
        }
    }

    /// Load a frame image on a background thread. When it completes the
    /// video's natural size becomes known and the mapper picks it up on the
    /// next paint.
    fn load_frame(&mut self, path: std::path::PathBuf) {
        let (sender, receiver) = channel();
        self.frame_loader = Some(receiver);
        self.loading_message = Some("Loading frame...".to_string());

        std::thread::spawn(move || {
            let result = crate::io::media::load_image(&path)
                .map_err(|e| format!("Failed to load frame: {e}"));
            if let Ok(image) = &result {
                log::info!(
                    "loaded frame {} ({}x{})",
                    path.display(),
                    image.width,
                    image.height
                );
            }
            let _ = sender.send(result);
        });
    }

    fn save_config(&mut self, path: std::path::PathBuf) {
        let payload = serialization::snapshot(self.editor.state());
        match serialization::save_config(&payload, &path) {
            Ok(()) => {
                self.status = format!("Saved config to {}", path.display());
                log::info!("saved config to {}", path.display());
            }
            Err(e) => {
                self.status = format!("Save failed: {e}");
                log::error!("failed to save config: {e}");
            }
        }
    }

    fn load_config(&mut self, path: std::path::PathBuf) {
        match serialization::load_config(&path) {
            Ok(payload) => {
                serialization::apply(&mut self.editor, payload);
                let state = self.editor.state();
                self.status = format!(
                    "Loaded {} lanes, {} triggers",
                    state.lanes.len(),
                    state.triggers.len()
                );
            }
            Err(e) => {
                // Editor state untouched on a failed load.
                self.status = format!("Load failed: {e}");
                log::error!("failed to load config: {e}");
            }
        }
    }

    fn export_config(&mut self, path: std::path::PathBuf) {
        let payload = serialization::snapshot(self.editor.state());
        let exported_at = chrono::Utc::now().to_rfc3339();
        match serialization::export_config(&payload, &path, exported_at) {
            Ok(()) => {
                self.status = format!("Exported to {}", path.display());
                log::info!("exported config to {}", path.display());
            }
            Err(e) => {
                self.status = format!("Export failed: {e}");
                log::error!("failed to export config: {e}");
            }
        }
    }

    /// Connect to a live point stream over TCP. The request is a bare HTTP
    /// GET; the splitter's resync step absorbs the response preamble.
    fn connect_stream(&mut self) {
        let address = self.stream_address.trim().to_string();
        if address.is_empty() {
            self.status = "Enter a stream address first".to_string();
            return;
        }
        if self.stream.is_running() {
            self.status = "Stream already running".to_string();
            return;
        }
        match TcpStream::connect(&address) {
            Ok(mut socket) => {
                let request = format!("GET /points HTTP/1.0\r\nHost: {address}\r\n\r\n");
                if let Err(e) = socket.write_all(request.as_bytes()) {
                    self.status = format!("Connect failed: {e}");
                    log::error!("stream handshake failed: {e}");
                    return;
                }
                self.stream.start(socket);
                self.status = format!("Streaming from {address}");
            }
            Err(e) => {
                self.status = format!("Connect failed: {e}");
                log::error!("stream connect failed: {e}");
            }
        }
    }

    /// Replay a recorded stream dump from disk through the same decoder.
    fn open_stream_dump(&mut self, path: std::path::PathBuf) {
        if self.stream.is_running() {
            self.status = "Stream already running".to_string();
            return;
        }
        match std::fs::File::open(&path) {
            Ok(file) => {
                self.stream.start(file);
                self.status = format!("Replaying {}", path.display());
            }
            Err(e) => {
                self.status = format!("Open failed: {e}");
                log::error!("failed to open stream dump: {e}");
            }
        }
    }

    fn request_delete_selected(&mut self) {
        if let Some(id) = self.editor.state().selected {
            self.confirm = Some(PendingConfirm::DeleteAnnotation(id));
        }
    }

    fn poll_frame_loader(&mut self, ctx: &egui::Context) {
        let Some(receiver) = &self.frame_loader else {
            return;
        };
        let Ok(result) = receiver.try_recv() else {
            return;
        };
        self.frame_loader = None;
        self.loading_message = None;

        match result {
            Ok(image) => {
                let size = [image.width as usize, image.height as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &image.pixels);
                self.frame_texture =
                    Some(ctx.load_texture("frame", color_image, egui::TextureOptions::LINEAR));
                // The media's own metadata always wins over a loaded config.
                self.editor.set_video_size(image.width, image.height);
                self.status = format!("Frame {}x{}", image.width, image.height);
            }
            Err(e) => {
                log::error!("{e}");
                self.status = e;
            }
        }
    }

    fn show_confirm_dialog(&mut self, ctx: &egui::Context) {
        let Some(pending) = &self.confirm else { return };
        let text = match pending {
            PendingConfirm::DeleteAnnotation(id) => {
                let name = self
                    .editor
                    .annotation(*id)
                    .map(|a| a.name().to_string())
                    .unwrap_or_else(|| "annotation".to_string());
                format!("Delete {name}?")
            }
            PendingConfirm::ClearAll => "Delete all annotations?".to_string(),
        };

        let mut decided = None;
        egui::Window::new("Confirm")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(text);
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        decided = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        decided = Some(false);
                    }
                });
            });

        match decided {
            Some(true) => {
                match self.confirm.take() {
                    Some(PendingConfirm::DeleteAnnotation(id)) => {
                        self.editor.delete(id);
                        self.status = "Annotation deleted".to_string();
                    }
                    Some(PendingConfirm::ClearAll) => {
                        self.editor.clear_all();
                        self.status = "All annotations cleared".to_string();
                    }
                    None => {}
                }
            }
            Some(false) => {
                self.confirm = None;
            }
            None => {}
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            if self.editor.is_drawing() {
                self.editor.cancel_drawing();
            } else if self.confirm.is_some() {
                self.confirm = None;
            } else {
                self.editor.deselect();
            }
        }

        // Skip edit shortcuts while a text field has focus.
        if ctx.wants_keyboard_input() {
            return;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)) {
            self.request_delete_selected();
        }

        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Z) && !i.modifiers.shift) {
            self.editor.undo();
        }

        if ctx.input(|i| {
            (i.modifiers.command && i.modifiers.shift && i.key_pressed(egui::Key::Z))
                || (i.modifiers.command && i.key_pressed(egui::Key::Y))
        }) {
            self.editor.redo();
        }
    }

    fn show_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Frame...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Images", &["jpg", "jpeg", "png", "bmp"])
                            .pick_file()
                        {
                            self.load_frame(path);
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Load Config...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Config", &["json"])
                            .pick_file()
                        {
                            self.load_config(path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Save Config...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Config", &["json"])
                            .set_file_name("loops.json")
                            .save_file()
                        {
                            self.save_config(path);
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    ui.menu_button("Export", |ui| {
                        if ui.button("Export as JSON...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("JSON", &["json"])
                                .set_file_name("loops-export.json")
                                .save_file()
                            {
                                self.export_config(path);
                            }
                            ui.close_menu();
                        }
                        if ui.button("Export as YAML...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("YAML", &["yaml", "yml"])
                                .set_file_name("loops-export.yaml")
                                .save_file()
                            {
                                self.export_config(path);
                            }
                            ui.close_menu();
                        }
                    });
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    if ui
                        .add_enabled(self.editor.can_undo(), egui::Button::new("Undo (Ctrl+Z)"))
                        .clicked()
                    {
                        self.editor.undo();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(
                            self.editor.can_redo(),
                            egui::Button::new("Redo (Ctrl+Shift+Z)"),
                        )
                        .clicked()
                    {
                        self.editor.redo();
                        ui.close_menu();
                    }
                    ui.separator();
                    let has_selection = self.editor.state().selected.is_some();
                    if ui
                        .add_enabled(has_selection, egui::Button::new("Delete Selected"))
                        .clicked()
                    {
                        self.request_delete_selected();
                        ui.close_menu();
                    }
                    let has_annotations = !self.editor.state().lanes.is_empty()
                        || !self.editor.state().triggers.is_empty();
                    if ui
                        .add_enabled(has_annotations, egui::Button::new("Clear All..."))
                        .clicked()
                    {
                        self.confirm = Some(PendingConfirm::ClearAll);
                        ui.close_menu();
                    }
                });
            });
        });
    }

    fn show_stream_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("stream_panel")
            .default_height(180.0)
            .resizable(true)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Point stream:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.stream_address)
                            .hint_text("host:port")
                            .desired_width(160.0),
                    );
                    let connect_enabled = !self.stream.is_running();
                    if ui
                        .add_enabled(connect_enabled, egui::Button::new("Connect"))
                        .clicked()
                    {
                        self.connect_stream();
                    }
                    if ui
                        .add_enabled(connect_enabled, egui::Button::new("Open Dump..."))
                        .clicked()
                    {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Stream dumps", &["bin", "dump", "raw"])
                            .pick_file()
                        {
                            self.open_stream_dump(path);
                        }
                    }
                    if self.stream.is_running() {
                        ui.label(egui::RichText::new("● live").color(egui::Color32::GREEN));
                    }
                    ui.separator();
                    ui.label(egui::RichText::new(&self.status).weak());
                });
                ui.separator();
                self.point_view.show(ui);
            });
    }
}

impl eframe::App for VloopApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_frame_loader(ctx);

        // Latest decoded frame wins; anything older is already stale.
        if let Some(frame) = self.stream.poll_latest() {
            self.point_view.submit(frame);
        }
        if self.stream.is_running() || self.loading_message.is_some() {
            ctx.request_repaint();
        }

        self.handle_keyboard(ctx);
        self.show_menu_bar(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            toolbar::show(ui, &mut self.editor);
        });

        let properties_action = egui::SidePanel::right("properties")
            .default_width(250.0)
            .show(ctx, |ui| properties::show(ui, &mut self.editor))
            .inner;
        match properties_action {
            PropertiesAction::Select(id) => self.editor.select(id),
            PropertiesAction::RequestDelete(id) => {
                self.confirm = Some(PendingConfirm::DeleteAnnotation(id));
            }
            PropertiesAction::None => {}
        }

        self.show_stream_panel(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(message) = &self.loading_message {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);
                        ui.spinner();
                        ui.add_space(10.0);
                        ui.label(
                            egui::RichText::new(message)
                                .size(16.0)
                                .color(egui::Color32::from_gray(200)),
                        );
                    });
                });
            } else {
                canvas::show(ui, &mut self.editor, &self.frame_texture);
            }
        });

        self.show_confirm_dialog(ctx);
    }
}
