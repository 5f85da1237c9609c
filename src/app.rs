// ============================================================================
// APP: eframe host, egui input in and the composed canvas out
// ============================================================================

use std::sync::Arc;

use eframe::egui;
use egui::{Color32, ColorImage, ImageData, Pos2, Rect, Sense, TextureHandle, TextureOptions, Vec2};

use crate::editor::Editor;
use crate::geom::Point;
use crate::input::{ButtonState, InputFrame};

pub struct FrameApp {
    editor: Editor,
    texture: Option<TextureHandle>,
    /// Last pointer position in canvas space; kept while the pointer is
    /// outside the window so drags end where they left.
    pointer: Point,
}

impl FrameApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, editor: Editor) -> Self {
        Self {
            editor,
            texture: None,
            pointer: Point::ZERO,
        }
    }

    /// Sample one frame of egui input relative to the canvas origin.
    fn sample_input(&mut self, ctx: &egui::Context, origin: Pos2) -> InputFrame {
        ctx.input(|i| {
            if let Some(p) = i.pointer.hover_pos() {
                self.pointer = Point::new((p.x - origin.x).floor() as i32, (p.y - origin.y).floor() as i32);
            }
            let button = |b: egui::PointerButton| ButtonState {
                down: i.pointer.button_down(b),
                just_pressed: i.pointer.button_pressed(b),
                just_released: i.pointer.button_released(b),
            };
            let paste_event = i.events.iter().any(|e| matches!(e, egui::Event::Paste(_)));
            InputFrame {
                pointer: self.pointer,
                primary: button(egui::PointerButton::Primary),
                secondary: button(egui::PointerButton::Secondary),
                escape: i.key_pressed(egui::Key::Escape),
                repeat: i.key_pressed(egui::Key::Space),
                paste: paste_event || (i.modifiers.command && i.key_pressed(egui::Key::V)),
            }
        })
    }

    /// Dropped paths go through the directory walker; browser-style drops
    /// carry bytes instead.
    fn take_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<egui::DroppedFile> = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }
        let mut paths = Vec::new();
        for file in dropped {
            if let Some(path) = file.path {
                paths.push(path);
            } else if let Some(bytes) = file.bytes {
                self.editor.submit_bytes(file.name, bytes.to_vec());
            }
        }
        if !paths.is_empty() {
            log_info!("Dropped {} path(s)", paths.len());
            self.editor.submit_paths(paths);
        }
    }

    fn upload(&mut self, ctx: &egui::Context) -> egui::TextureId {
        let frame = self.editor.compose_frame(self.pointer);
        let size = [frame.width() as usize, frame.height() as usize];
        let color_image = ColorImage::from_rgba_unmultiplied(size, frame.as_raw());
        let image_data = ImageData::Color(Arc::new(color_image));
        let options = TextureOptions::NEAREST;
        match &mut self.texture {
            Some(tex) => {
                tex.set(image_data, options);
                tex.id()
            }
            None => {
                let tex = ctx.load_texture("frame_canvas", image_data, options);
                let id = tex.id();
                self.texture = Some(tex);
                id
            }
        }
    }
}

impl eframe::App for FrameApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.take_dropped_files(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::from_gray(40)))
            .show(ctx, |ui| {
                let size = Vec2::new(self.editor.canvas.width as f32, self.editor.canvas.height as f32);
                let (rect, _response) = ui.allocate_exact_size(size, Sense::click_and_drag());

                let input = self.sample_input(ctx, rect.min);
                self.editor.update(&input);

                let tex_id = self.upload(ctx);
                let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
                ui.painter().image(tex_id, rect, uv, Color32::WHITE);
            });

        // Background jobs report through channels; keep polling until they land.
        if !self.editor.is_idle() || self.editor.pending_files() > 0 {
            ctx.request_repaint();
        }
    }
}
